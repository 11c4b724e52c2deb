// Copyright (c) 2017-2020 Fabian Schuiki

//! Representation of SSA instructions.
//!
//! This module implements the various instructions of the intermediate
//! representation.

use crate::{
    ir::{Block, ControlFlowGraph, DataFlowGraph, ExtUnit, FunctionBuilder, Inst, Value},
    ty::{int_ty, pointer_ty, void_ty, Type},
    value::IntValue,
};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A temporary object used to construct a single instruction.
pub struct InstBuilder<'a, 'b> {
    builder: &'b mut FunctionBuilder<'a>,
    name: Option<String>,
}

impl<'a, 'b> InstBuilder<'a, 'b> {
    /// Create a new instruction builder that inserts into `builder`.
    pub fn new(builder: &'b mut FunctionBuilder<'a>) -> Self {
        Self {
            builder,
            name: None,
        }
    }

    /// Assign a name to the instruction being built.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<'a, 'b> InstBuilder<'a, 'b> {
    /// Creates a const instruction materializing the given integer value.
    pub fn const_int(&mut self, value: impl Into<IntValue>) -> Value {
        let value = value.into();
        let ty = value.ty();
        let data = InstData::ConstInt {
            opcode: Opcode::ConstInt,
            imm: value,
        };
        let inst = self.build(data, ty);
        self.inst_result(inst)
    }

    /// Creates an alias instruction to assign a new name to a value.
    pub fn alias(&mut self, x: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_unary(Opcode::Alias, ty, x);
        self.inst_result(inst)
    }

    /// Creates a not instruction to compute the bitwise inverse of a value.
    pub fn not(&mut self, x: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_unary(Opcode::Not, ty, x);
        self.inst_result(inst)
    }

    /// Creates a neg instruction to compute the two's complement of a value.
    pub fn neg(&mut self, x: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_unary(Opcode::Neg, ty, x);
        self.inst_result(inst)
    }

    /// Creates an add instruction to sum two values.
    pub fn add(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Add, ty, x, y);
        self.inst_result(inst)
    }

    /// Creates a sub instruction to subtract one value from another.
    pub fn sub(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Sub, ty, x, y);
        self.inst_result(inst)
    }

    /// Creates an and instruction to compute the bitwise AND of two values.
    pub fn and(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::And, ty, x, y);
        self.inst_result(inst)
    }

    /// Creates an or instruction to compute the bitwise OR of two values.
    pub fn or(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Or, ty, x, y);
        self.inst_result(inst)
    }

    /// Creates a xor instruction to compute the bitwise XOR of two values.
    pub fn xor(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Xor, ty, x, y);
        self.inst_result(inst)
    }

    /// Creates an smul instruction to compute a signed multiplication.
    pub fn smul(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Smul, ty, x, y);
        self.inst_result(inst)
    }

    /// Creates an sdiv instruction to compute a signed division.
    pub fn sdiv(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Sdiv, ty, x, y);
        self.inst_result(inst)
    }

    /// Creates a umul instruction to compute an unsigned multiplication.
    pub fn umul(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Umul, ty, x, y);
        self.inst_result(inst)
    }

    /// Creates a udiv instruction to compute an unsigned division.
    pub fn udiv(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Udiv, ty, x, y);
        self.inst_result(inst)
    }

    /// Creates an eq instruction to check two values for equality.
    pub fn eq(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Eq, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Creates a neq instruction to check two values for inequality.
    pub fn neq(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Neq, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Creates an slt instruction for a signed less-than comparison.
    pub fn slt(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Slt, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Creates an sgt instruction for a signed greater-than comparison.
    pub fn sgt(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Sgt, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Creates an ult instruction for an unsigned less-than comparison.
    pub fn ult(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Ult, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Creates an ugt instruction for an unsigned greater-than comparison.
    pub fn ugt(&mut self, x: Value, y: Value) -> Value {
        let inst = self.build_binary(Opcode::Ugt, int_ty(1), x, y);
        self.inst_result(inst)
    }

    /// Creates an shl instruction to shift a value to the left.
    pub fn shl(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Shl, ty, x, y);
        self.inst_result(inst)
    }

    /// Creates an shr instruction to shift a value to the right.
    pub fn shr(&mut self, x: Value, y: Value) -> Value {
        let ty = self.value_type(x);
        let inst = self.build_binary(Opcode::Shr, ty, x, y);
        self.inst_result(inst)
    }

    /// Creates a var instruction to allocate a mutable slot holding the given
    /// initial value. Returns a pointer to the slot.
    pub fn var(&mut self, x: Value) -> Value {
        let ty = pointer_ty(self.value_type(x));
        let inst = self.build_unary(Opcode::Var, ty, x);
        self.inst_result(inst)
    }

    /// Creates an ld instruction to load the value a pointer points at.
    pub fn ld(&mut self, x: Value) -> Value {
        let ty = self.value_type(x).unwrap_pointer().clone();
        let inst = self.build_unary(Opcode::Ld, ty, x);
        self.inst_result(inst)
    }

    /// Creates an st instruction to store a value through a pointer.
    pub fn st(&mut self, x: Value, y: Value) -> Inst {
        let data = InstData::Binary {
            opcode: Opcode::St,
            args: [x, y],
        };
        self.build(data, void_ty())
    }

    /// Creates a call instruction to invoke an external function. The
    /// instruction produces a result unless the callee returns void.
    pub fn call(&mut self, unit: ExtUnit, args: Vec<Value>) -> Inst {
        let ty = self.builder.func.dfg[unit].sig.return_type();
        let data = InstData::Call {
            opcode: Opcode::Call,
            unit,
            args,
        };
        self.build(data, ty)
    }

    /// Creates a ret instruction to return from a void function.
    pub fn ret(&mut self) -> Inst {
        let data = InstData::Nullary { opcode: Opcode::Ret };
        self.build(data, void_ty())
    }

    /// Creates a ret instruction to return a value from a function.
    pub fn ret_value(&mut self, x: Value) -> Inst {
        self.build_unary(Opcode::RetValue, void_ty(), x)
    }

    /// Creates a br instruction to transfer control to another basic block.
    pub fn br(&mut self, bb: Block) -> Inst {
        let data = InstData::Jump {
            opcode: Opcode::Br,
            bbs: [bb],
        };
        self.build(data, void_ty())
    }

    /// Creates a br instruction to transfer control to one of two basic
    /// blocks, depending on the given condition.
    pub fn br_cond(&mut self, x: Value, bb0: Block, bb1: Block) -> Inst {
        let data = InstData::Branch {
            opcode: Opcode::BrCond,
            args: [x],
            bbs: [bb0, bb1],
        };
        self.build(data, void_ty())
    }

    /// Creates a phi instruction selecting among incoming values, one per
    /// predecessor of the containing block.
    pub fn phi(&mut self, args: Vec<Value>, bbs: Vec<Block>) -> Value {
        assert!(args.len() > 0);
        assert_eq!(args.len(), bbs.len());
        let ty = self.value_type(args[0]);
        let data = InstData::Phi {
            opcode: Opcode::Phi,
            args,
            bbs,
        };
        let inst = self.build(data, ty);
        self.inst_result(inst)
    }
}

/// Convenience functions to construct the different instruction formats.
impl<'a, 'b> InstBuilder<'a, 'b> {
    /// `a = opcode type x`
    fn build_unary(&mut self, opcode: Opcode, ty: Type, x: Value) -> Inst {
        let data = InstData::Unary { opcode, args: [x] };
        self.build(data, ty)
    }

    /// `a = opcode type x, y`
    fn build_binary(&mut self, opcode: Opcode, ty: Type, x: Value, y: Value) -> Inst {
        let data = InstData::Binary {
            opcode,
            args: [x, y],
        };
        self.build(data, ty)
    }
}

/// Fundamental convenience forwards to the wrapped builder.
impl<'a, 'b> InstBuilder<'a, 'b> {
    /// Convenience forward to `FunctionBuilder`.
    pub(crate) fn build(&mut self, data: InstData, ty: Type) -> Inst {
        let inst = self.builder.build_inst(data, ty);
        if let Some(name) = self.name.take() {
            if let Some(value) = self.builder.func.dfg.get_inst_result(inst) {
                self.builder.func.dfg.set_name(value, name);
            }
        }
        inst
    }

    /// Convenience forward to `DataFlowGraph`.
    fn value_type(&self, value: Value) -> Type {
        self.builder.func.dfg.value_type(value)
    }

    /// Convenience forward to `DataFlowGraph`.
    fn inst_result(&self, inst: Inst) -> Value {
        self.builder.func.dfg.inst_result(inst)
    }
}

/// An instruction format.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstData {
    /// `a = const imm`
    ConstInt { opcode: Opcode, imm: IntValue },
    /// `opcode`
    Nullary { opcode: Opcode },
    /// `opcode type x`
    Unary { opcode: Opcode, args: [Value; 1] },
    /// `opcode type x, y`
    Binary { opcode: Opcode, args: [Value; 2] },
    /// `opcode bb`
    Jump { opcode: Opcode, bbs: [Block; 1] },
    /// `opcode x, bb0, bb1`
    Branch {
        opcode: Opcode,
        args: [Value; 1],
        bbs: [Block; 2],
    },
    /// `opcode type [x, bb],*`
    Phi {
        opcode: Opcode,
        args: Vec<Value>,
        bbs: Vec<Block>,
    },
    /// `a = opcode type unit (args)`
    Call {
        opcode: Opcode,
        unit: ExtUnit,
        args: Vec<Value>,
    },
}

impl InstData {
    /// Get the opcode of the instruction.
    pub fn opcode(&self) -> Opcode {
        match *self {
            InstData::ConstInt { opcode, .. } => opcode,
            InstData::Nullary { opcode, .. } => opcode,
            InstData::Unary { opcode, .. } => opcode,
            InstData::Binary { opcode, .. } => opcode,
            InstData::Jump { opcode, .. } => opcode,
            InstData::Branch { opcode, .. } => opcode,
            InstData::Phi { opcode, .. } => opcode,
            InstData::Call { opcode, .. } => opcode,
        }
    }

    /// Get the arguments of an instruction.
    pub fn args(&self) -> &[Value] {
        match self {
            InstData::ConstInt { .. } => &[],
            InstData::Nullary { .. } => &[],
            InstData::Unary { args, .. } => args,
            InstData::Binary { args, .. } => args,
            InstData::Jump { .. } => &[],
            InstData::Branch { args, .. } => args,
            InstData::Phi { args, .. } => args,
            InstData::Call { args, .. } => args,
        }
    }

    /// Mutable access to the arguments of an instruction.
    pub(crate) fn args_mut(&mut self) -> &mut [Value] {
        match self {
            InstData::ConstInt { .. } => &mut [],
            InstData::Nullary { .. } => &mut [],
            InstData::Unary { args, .. } => args,
            InstData::Binary { args, .. } => args,
            InstData::Jump { .. } => &mut [],
            InstData::Branch { args, .. } => args,
            InstData::Phi { args, .. } => args,
            InstData::Call { args, .. } => args,
        }
    }

    /// Get the BBs of an instruction.
    ///
    /// For a phi node these are the predecessor blocks its incoming values
    /// are associated with; for a terminator these are the successor blocks.
    pub fn blocks(&self) -> &[Block] {
        match self {
            InstData::ConstInt { .. } => &[],
            InstData::Nullary { .. } => &[],
            InstData::Unary { .. } => &[],
            InstData::Binary { .. } => &[],
            InstData::Jump { bbs, .. } => bbs,
            InstData::Branch { bbs, .. } => bbs,
            InstData::Phi { bbs, .. } => bbs,
            InstData::Call { .. } => &[],
        }
    }

    /// Replace all uses of a value with another.
    pub(crate) fn replace_value(&mut self, from: Value, to: Value) -> usize {
        let mut count = 0;
        for arg in self.args_mut() {
            if *arg == from {
                *arg = to;
                count += 1;
            }
        }
        count
    }

    /// Return the const int constructed by this instruction.
    pub fn get_const_int(&self) -> Option<&IntValue> {
        match self {
            InstData::ConstInt { imm, .. } => Some(imm),
            _ => None,
        }
    }

    /// Return the external unit being called by this instruction.
    pub fn get_ext_unit(&self) -> Option<ExtUnit> {
        match self {
            InstData::Call { unit, .. } => Some(*unit),
            _ => None,
        }
    }
}

impl Default for InstData {
    fn default() -> InstData {
        InstData::Nullary {
            opcode: Opcode::Ret,
        }
    }
}

bitflags! {
    /// A set of properties of an instruction.
    #[derive(Default, Serialize, Deserialize)]
    pub struct InstFlags: u8 {
        /// The instruction materializes a constant.
        const CONST = 0b0001;
        /// The instruction is a phi node.
        const PHI = 0b0010;
        /// The instruction terminates a basic block.
        const TERMINATOR = 0b0100;
        /// The instruction has an effect beyond producing its result.
        const SIDE_EFFECT = 0b1000;
    }
}

/// An instruction opcode.
///
/// This enum represents the actual instruction, whereas `InstData` covers the
/// format and arguments of the instruction.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Opcode {
    ConstInt,
    Alias,

    Not,
    Neg,
    Add,
    Sub,
    And,
    Or,
    Xor,
    Smul,
    Sdiv,
    Umul,
    Udiv,

    Eq,
    Neq,
    Slt,
    Sgt,
    Ult,
    Ugt,

    Shl,
    Shr,

    Var,
    Ld,
    St,

    Call,

    Ret,
    RetValue,
    Phi,
    Br,
    BrCond,
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match *self {
                Opcode::ConstInt => "const",
                Opcode::Alias => "alias",
                Opcode::Not => "not",
                Opcode::Neg => "neg",
                Opcode::Add => "add",
                Opcode::Sub => "sub",
                Opcode::And => "and",
                Opcode::Or => "or",
                Opcode::Xor => "xor",
                Opcode::Smul => "smul",
                Opcode::Sdiv => "sdiv",
                Opcode::Umul => "umul",
                Opcode::Udiv => "udiv",
                Opcode::Eq => "eq",
                Opcode::Neq => "neq",
                Opcode::Slt => "slt",
                Opcode::Sgt => "sgt",
                Opcode::Ult => "ult",
                Opcode::Ugt => "ugt",
                Opcode::Shl => "shl",
                Opcode::Shr => "shr",
                Opcode::Var => "var",
                Opcode::Ld => "ld",
                Opcode::St => "st",
                Opcode::Call => "call",
                Opcode::Ret => "ret",
                Opcode::RetValue => "ret",
                Opcode::Phi => "phi",
                Opcode::Br => "br",
                Opcode::BrCond => "br",
            }
        )
    }
}

impl Opcode {
    /// Return the set of properties of this instruction.
    pub fn flags(self) -> InstFlags {
        match self {
            Opcode::ConstInt => InstFlags::CONST,
            Opcode::Phi => InstFlags::PHI,
            Opcode::Ret | Opcode::RetValue | Opcode::Br | Opcode::BrCond => InstFlags::TERMINATOR,
            Opcode::St | Opcode::Call => InstFlags::SIDE_EFFECT,
            _ => InstFlags::empty(),
        }
    }

    /// Check if this instruction is a constant.
    pub fn is_const(self) -> bool {
        self.flags().contains(InstFlags::CONST)
    }

    /// Check if this instruction is a phi node.
    pub fn is_phi(self) -> bool {
        self.flags().contains(InstFlags::PHI)
    }

    /// Check if this instruction is a terminator.
    pub fn is_terminator(self) -> bool {
        self.flags().contains(InstFlags::TERMINATOR)
    }

    /// Check if this is a return instruction.
    pub fn is_return(self) -> bool {
        match self {
            Opcode::Ret | Opcode::RetValue => true,
            _ => false,
        }
    }

    /// Check if this instruction has an observable effect beyond producing
    /// its result value.
    pub fn has_side_effects(self) -> bool {
        self.flags().contains(InstFlags::SIDE_EFFECT)
    }

    /// Check if this instruction may be removed without changing observable
    /// behavior, provided its result is unused.
    ///
    /// Terminators are required for control flow, phi nodes for block
    /// well-formedness, and side-effecting instructions for their effect;
    /// none of them qualify.
    pub fn is_safe_to_remove(self) -> bool {
        !self
            .flags()
            .intersects(InstFlags::TERMINATOR | InstFlags::PHI | InstFlags::SIDE_EFFECT)
    }
}

impl Inst {
    /// Dump the instruction in human readable form.
    pub fn dump<'a>(
        self,
        dfg: &'a DataFlowGraph,
        cfg: &'a ControlFlowGraph,
    ) -> InstDumper<'a> {
        InstDumper(self, dfg, cfg)
    }
}

/// Temporary object to dump an `Inst` in human-readable form for debugging.
pub struct InstDumper<'a>(Inst, &'a DataFlowGraph, &'a ControlFlowGraph);

impl std::fmt::Display for InstDumper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let inst = self.0;
        let dfg = self.1;
        let cfg = self.2;
        let data = &dfg[inst];
        if dfg.has_result(inst) {
            let result = dfg.inst_result(inst);
            write!(
                f,
                "{} = {} {}",
                result.dump(dfg),
                data.opcode(),
                dfg.value_type(result)
            )?;
        } else {
            write!(f, "{}", data.opcode())?;
        }
        if let InstData::Call { unit, .. } = *data {
            write!(f, " @{} (", dfg[unit].name)?;
            let mut comma = false;
            for &arg in data.args() {
                if comma {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg.dump(dfg))?;
                comma = true;
            }
            write!(f, ")")?;
        } else if let InstData::Phi { .. } = *data {
            let mut comma = false;
            write!(f, " ")?;
            for (&arg, &block) in data.args().iter().zip(data.blocks().iter()) {
                if comma {
                    write!(f, ", ")?;
                }
                write!(f, "[{}, {}]", arg.dump(dfg), block.dump(cfg))?;
                comma = true;
            }
        } else {
            let mut comma = false;
            for &arg in data.args() {
                if comma {
                    write!(f, ",")?;
                }
                write!(f, " {}", arg.dump(dfg))?;
                comma = true;
            }
            for &block in data.blocks() {
                if comma {
                    write!(f, ",")?;
                }
                write!(f, " {}", block.dump(cfg))?;
                comma = true;
            }
            if let InstData::ConstInt { imm, .. } = data {
                write!(f, " {}", imm.value)?;
            }
        }
        Ok(())
    }
}
