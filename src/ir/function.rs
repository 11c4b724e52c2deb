// Copyright (c) 2017-2020 Fabian Schuiki

//! Representation of SSA functions.

use crate::{
    ir::{
        Block, ControlFlowGraph, DataFlowGraph, ExtUnit, ExtUnitData, Inst, InstBuilder, InstData,
        FunctionLayout, Signature, Value,
    },
    table::TableKey,
    ty::Type,
    verifier::Verifier,
};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

/// A function.
#[derive(Serialize, Deserialize)]
pub struct Function {
    /// The name of the function.
    pub name: String,
    /// The signature of the function.
    pub sig: Signature,
    /// The data flow graph of the function.
    pub dfg: DataFlowGraph,
    /// The control flow graph of the function.
    pub cfg: ControlFlowGraph,
    /// The layout of the function.
    pub layout: FunctionLayout,
}

impl Function {
    /// Create a new function.
    pub fn new(name: impl Into<String>, sig: Signature) -> Self {
        let mut func = Self {
            name: name.into(),
            sig,
            dfg: DataFlowGraph::new(),
            cfg: ControlFlowGraph::new(),
            layout: FunctionLayout::new(),
        };
        func.dfg.make_args_for_signature(&func.sig);
        func
    }

    /// Get the value of the argument at position `pos`.
    pub fn input_arg(&self, pos: usize) -> Value {
        assert!(pos < self.sig.num_args(), "argument position out of bounds");
        self.dfg.arg_value(crate::ir::Arg::new(pos))
    }

    /// Panic if the function is not well-formed.
    pub fn verify(&self) {
        let mut verifier = Verifier::new();
        verifier.verify_function(self);
        match verifier.finish() {
            Ok(()) => (),
            Err(errs) => {
                eprintln!("");
                eprintln!("Verified function:");
                eprintln!("{}", self);
                eprintln!("");
                eprintln!("Verification errors:");
                eprintln!("{}", errs);
                panic!("verification failed");
            }
        }
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let args = self
            .sig
            .args()
            .map(|arg| {
                format!(
                    "{} {}",
                    self.sig.arg_type(arg),
                    self.dfg.arg_value(arg).dump(&self.dfg)
                )
            })
            .format(", ");
        write!(
            f,
            "func @{} ({}) {} {{\n",
            self.name,
            args,
            self.sig.return_type()
        )?;
        for bb in self.layout.blocks() {
            write!(f, "{}:\n", bb.dump(&self.cfg))?;
            for inst in self.layout.insts(bb) {
                write!(f, "    {}\n", inst.dump(&self.dfg, &self.cfg))?;
            }
        }
        write!(f, "}}")?;
        Ok(())
    }
}

/// The position where new instructions are inserted.
#[derive(Clone, Copy)]
enum InsertPos {
    None,
    Append(Block),
    Prepend(Block),
    After(Inst),
    Before(Inst),
}

/// Temporary object used to populate or mutate a single `Function`.
pub struct FunctionBuilder<'a> {
    /// The function currently being built.
    pub func: &'a mut Function,
    /// The position where we are currently inserting instructions.
    pos: InsertPos,
}

impl<'a> FunctionBuilder<'a> {
    /// Create a new function builder.
    pub fn new(func: &'a mut Function) -> Self {
        Self {
            func,
            pos: InsertPos::None,
        }
    }

    /// Add a new instruction using an `InstBuilder`.
    pub fn ins(&mut self) -> InstBuilder<'a, '_> {
        InstBuilder::new(self)
    }

    /// Add a new instruction.
    pub fn build_inst(&mut self, data: InstData, ty: Type) -> Inst {
        let inst = self.func.dfg.add_inst(data, ty);
        match self.pos {
            InsertPos::None => panic!("no block selected to insert instruction"),
            InsertPos::Append(bb) => self.func.layout.append_inst(inst, bb),
            InsertPos::Prepend(bb) => self.func.layout.prepend_inst(inst, bb),
            InsertPos::After(other) => {
                self.func.layout.insert_inst_after(inst, other);
                self.pos = InsertPos::After(inst);
            }
            InsertPos::Before(other) => self.func.layout.insert_inst_before(inst, other),
        }
        inst
    }

    /// Remove an instruction.
    ///
    /// Panics if the instruction's result still has uses.
    pub fn remove_inst(&mut self, inst: Inst) {
        if let InsertPos::After(i) = self.pos {
            if i == inst {
                self.pos = match self.func.layout.prev_inst(inst) {
                    Some(prev) => InsertPos::After(prev),
                    None => InsertPos::Prepend(self.func.layout.inst_block(inst)),
                };
            }
        }
        if let InsertPos::Before(i) = self.pos {
            if i == inst {
                self.pos = match self.func.layout.next_inst(inst) {
                    Some(next) => InsertPos::Before(next),
                    None => InsertPos::Append(self.func.layout.inst_block(inst)),
                };
            }
        }
        self.func.layout.remove_inst(inst);
        self.func.dfg.remove_inst(inst);
    }

    /// Create a new BB.
    pub fn block(&mut self) -> Block {
        let bb = self.func.cfg.add_block();
        self.func.layout.append_block(bb);
        bb
    }

    /// Create a new named BB.
    pub fn named_block(&mut self, name: impl Into<String>) -> Block {
        let bb = self.block();
        self.func.cfg.set_name(bb, name.into());
        bb
    }

    /// Append all following instructions to the end of `bb`.
    pub fn append_to(&mut self, bb: Block) {
        self.pos = InsertPos::Append(bb);
    }

    /// Prepend all following instructions to the beginning of `bb`.
    pub fn prepend_to(&mut self, bb: Block) {
        self.pos = InsertPos::Prepend(bb);
    }

    /// Insert all following instructions after `inst`.
    pub fn insert_after(&mut self, inst: Inst) {
        self.pos = InsertPos::After(inst);
    }

    /// Insert all following instructions before `inst`.
    pub fn insert_before(&mut self, inst: Inst) {
        self.pos = InsertPos::Before(inst);
    }

    /// Import an external function for calls within this function.
    pub fn add_extern(&mut self, name: impl Into<String>, sig: Signature) -> ExtUnit {
        self.func.dfg.ext_units.add(ExtUnitData {
            name: name.into(),
            sig,
        })
    }

    /// Add a placeholder value.
    ///
    /// This function is intended to be used when constructing phi nodes.
    pub fn add_placeholder(&mut self, ty: Type) -> Value {
        self.func.dfg.add_placeholder(ty)
    }

    /// Remove a placeholder value.
    pub fn remove_placeholder(&mut self, value: Value) {
        self.func.dfg.remove_placeholder(value)
    }

    /// Replace all uses of a value with another.
    ///
    /// Returns how many uses were replaced.
    pub fn replace_use(&mut self, from: Value, to: Value) -> usize {
        self.func.dfg.replace_use(from, to)
    }

    /// Remove an instruction if it is safe to remove and its value is not
    /// being read, cascading into operands that become unused.
    ///
    /// Returns true if the instruction was removed.
    pub fn prune_if_unused(&mut self, inst: Inst) -> bool {
        if !self.func.layout.is_inst_inserted(inst) {
            return false;
        }
        if !self.func.dfg[inst].opcode().is_safe_to_remove() {
            return false;
        }
        let unused = match self.func.dfg.get_inst_result(inst) {
            Some(value) => !self.func.dfg.has_uses(value),
            None => true,
        };
        if !unused {
            return false;
        }
        let inst_args: Vec<_> = self.func.dfg[inst]
            .args()
            .iter()
            .cloned()
            .flat_map(|arg| self.func.dfg.get_value_inst(arg))
            .collect();
        debug!(
            "Pruning {}",
            inst.dump(&self.func.dfg, &self.func.cfg)
        );
        self.remove_inst(inst);
        for inst in inst_args {
            self.prune_if_unused(inst);
        }
        true
    }
}
