// Copyright (c) 2017-2020 Fabian Schuiki

//! Representation of SSA functions.
//!
//! This module implements the intermediate representation around which the
//! rest of the crate is built: functions made up of basic blocks, which in
//! turn are made up of instructions that define and use values.

use crate::{impl_table_key, table::TableKey, ty::Type};
use serde::{Deserialize, Serialize};

mod cfg;
mod dfg;
mod function;
mod inst;
mod layout;
mod module;
pub mod prelude;
mod sig;

pub use self::cfg::*;
pub use self::dfg::*;
pub use self::function::*;
pub use self::inst::*;
pub use self::layout::*;
pub use self::module::*;
pub use self::sig::*;

impl_table_key! {
    /// An instruction.
    struct Inst(u32) as "i";

    /// A value.
    struct Value(u32) as "v";

    /// A basic block.
    struct Block(u32) as "bb";

    /// An argument of a `Function`.
    struct Arg(u32) as "arg";

    /// An external `Function` referenced from within another.
    struct ExtUnit(u32) as "ext";

    /// A `Function` in a `Module`.
    struct FuncId(u32) as "func";
}

/// Internal table storage for values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueData {
    /// The value is the result of an instruction.
    Inst {
        /// The type of the value.
        ty: Type,
        /// The instruction defining the value.
        inst: Inst,
    },
    /// The value is an argument of the `Function`.
    Arg {
        /// The type of the value.
        ty: Type,
        /// The corresponding argument position.
        arg: Arg,
    },
    /// The value is a placeholder for a forward reference. Used during
    /// construction of phi nodes in loops; must be replaced before the
    /// function is considered complete.
    Placeholder {
        /// The type the eventual value will have.
        ty: Type,
    },
}

impl ValueData {
    /// Check if the value is a placeholder.
    pub fn is_placeholder(&self) -> bool {
        match self {
            ValueData::Placeholder { .. } => true,
            _ => false,
        }
    }
}

/// An external function referenced within a `Function`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtUnitData {
    /// The name of the referenced function.
    pub name: String,
    /// The signature of the referenced function.
    pub sig: Signature,
}

impl Value {
    /// Dump the value in human-readable form.
    pub fn dump(self, dfg: &DataFlowGraph) -> ValueDumper {
        ValueDumper(self, dfg)
    }
}

/// Temporary object to dump a `Value` in human-readable form.
pub struct ValueDumper<'a>(Value, &'a DataFlowGraph);

impl std::fmt::Display for ValueDumper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(name) = self.1.get_name(self.0) {
            write!(f, "%{}", name)
        } else {
            write!(f, "%{}", self.0.index())
        }
    }
}
