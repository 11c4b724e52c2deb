// Copyright (c) 2017-2020 Fabian Schuiki

//! Re-exports of commonly used IR items.

pub use crate::ir::{
    Arg, Block, ControlFlowGraph, DataFlowGraph, ExtUnit, ExtUnitData, FuncId, Function,
    FunctionBuilder, FunctionLayout, Inst, InstBuilder, InstData, Module, Opcode, Signature,
    Value, ValueData,
};
