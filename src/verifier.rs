// Copyright (c) 2017-2021 Fabian Schuiki

//! Verification of IR integrity.
//!
//! This module implements verification of the intermediate representation. It
//! checks that functions are well-formed, basic blocks have terminators, phi
//! nodes line up with their block's predecessors, and types line up.

use crate::{
    analysis::PredecessorTable,
    ir::prelude::*,
    ty::{int_ty, pointer_ty, Type},
};
use std::{
    fmt::Display,
    ops::{Deref, DerefMut},
};

/// An IR verifier.
///
/// The `Verifier` acts as a context to call the various IR checking functions
/// on. It keeps track of errors.
#[derive(Default)]
pub struct Verifier {
    errors: VerifierErrors,
    unit_name: Option<String>,
    return_type: Option<Type>,
}

impl Verifier {
    /// Create a new verifier.
    pub fn new() -> Self {
        Default::default()
    }

    /// Verify the integrity of a `Module`.
    pub fn verify_module(&mut self, module: &Module) {
        for func in module.functions() {
            self.verify_function(func);
        }
    }

    /// Verify the integrity of a `Function`.
    pub fn verify_function(&mut self, func: &Function) {
        self.unit_name = Some(format!("func @{}", func.name));
        self.return_type = Some(func.sig.return_type());

        if func.layout.first_block().is_none() {
            self.errors.push(VerifierError {
                unit: self.unit_name.clone(),
                object: None,
                message: format!("layout has no entry block"),
            });
        }
        let pt = PredecessorTable::new(func);
        for bb in func.layout.blocks() {
            // Check that the block has at least one instruction.
            if func.layout.first_inst(bb).is_none() {
                self.errors.push(VerifierError {
                    unit: self.unit_name.clone(),
                    object: Some(bb.dump(&func.cfg).to_string()),
                    message: format!("block is empty"),
                })
            }

            let mut phis_done = false;
            for inst in func.layout.insts(bb) {
                // Check that there are no terminator instructions in the
                // middle of the block.
                if func.dfg[inst].opcode().is_terminator()
                    && Some(inst) != func.layout.last_inst(bb)
                {
                    self.errors.push(VerifierError {
                        unit: self.unit_name.clone(),
                        object: Some(inst.dump(&func.dfg, &func.cfg).to_string()),
                        message: format!(
                            "terminator must be at the end of block {}",
                            bb.dump(&func.cfg)
                        ),
                    });
                }

                // Check that the last instruction in the block is a
                // terminator.
                if Some(inst) == func.layout.last_inst(bb)
                    && !func.dfg[inst].opcode().is_terminator()
                {
                    self.errors.push(VerifierError {
                        unit: self.unit_name.clone(),
                        object: Some(bb.dump(&func.cfg).to_string()),
                        message: format!(
                            "last instruction `{}` must be a terminator",
                            inst.dump(&func.dfg, &func.cfg)
                        ),
                    })
                }

                // Check that phi nodes form a prefix of the block.
                if func.dfg[inst].opcode().is_phi() {
                    if phis_done {
                        self.errors.push(VerifierError {
                            unit: self.unit_name.clone(),
                            object: Some(inst.dump(&func.dfg, &func.cfg).to_string()),
                            message: format!(
                                "phi must be at the beginning of block {}",
                                bb.dump(&func.cfg)
                            ),
                        });
                    }
                } else {
                    phis_done = true;
                }

                // Check the instruction itself.
                self.verify_inst(inst, func, &pt);
            }
        }

        self.unit_name = None;
        self.return_type = None;
    }

    /// Finish verification and return the result.
    ///
    /// Consumes the verifier.
    pub fn finish(self) -> Result<(), VerifierErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    /// Finish verification and panic if errors occurred.
    ///
    /// Consumes the verifier.
    pub fn finish_panic(self) {
        match self.finish() {
            Ok(()) => (),
            Err(errs) => panic!("Verification failed:\n{}", errs),
        }
    }

    /// Verify the integrity of a single instruction.
    pub fn verify_inst(&mut self, inst: Inst, func: &Function, pt: &PredecessorTable) {
        InstVerifier {
            verifier: self,
            func,
            pt,
        }
        .verify_inst(inst);
    }
}

/// An instruction verifier.
struct InstVerifier<'a> {
    verifier: &'a mut Verifier,
    func: &'a Function,
    pt: &'a PredecessorTable,
}

impl<'a> Deref for InstVerifier<'a> {
    type Target = Verifier;
    fn deref(&self) -> &Verifier {
        self.verifier
    }
}

impl<'a> DerefMut for InstVerifier<'a> {
    fn deref_mut(&mut self) -> &mut Verifier {
        self.verifier
    }
}

impl<'a> InstVerifier<'a> {
    /// Report an error for an instruction.
    fn error(&mut self, inst: Inst, message: String) {
        let object = Some(inst.dump(&self.func.dfg, &self.func.cfg).to_string());
        let unit = self.verifier.unit_name.clone();
        self.verifier.errors.push(VerifierError {
            unit,
            object,
            message,
        });
    }

    /// Verify the integrity of a single instruction.
    pub fn verify_inst(&mut self, inst: Inst) {
        let dfg = &self.func.dfg;
        let data = &dfg[inst];

        // Check that none of the arguments is a placeholder left behind by
        // an unfinished phi construction.
        let mut args_invalid = false;
        for &value in data.args() {
            if dfg[value].is_placeholder() {
                args_invalid = true;
                self.error(inst, format!("{} uses placeholder value", data.opcode()));
            }
        }
        if args_invalid {
            return;
        }

        match data.opcode() {
            Opcode::ConstInt => (),
            Opcode::Alias | Opcode::Not | Opcode::Neg => {
                let result_ty = dfg.value_type(dfg.inst_result(inst));
                let arg_ty = dfg.value_type(data.args()[0]);
                if result_ty != arg_ty {
                    self.error(
                        inst,
                        format!("argument should be of type {}", result_ty),
                    );
                }
            }
            Opcode::Add
            | Opcode::Sub
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Smul
            | Opcode::Sdiv
            | Opcode::Umul
            | Opcode::Udiv
            | Opcode::Shl
            | Opcode::Shr => {
                let result_ty = dfg.value_type(dfg.inst_result(inst));
                if !result_ty.is_int() {
                    self.error(inst, format!("result must be an integer"));
                }
                for &arg in data.args() {
                    if dfg.value_type(arg) != result_ty {
                        self.error(
                            inst,
                            format!("arguments should be of type {}", result_ty),
                        );
                    }
                }
            }
            Opcode::Eq
            | Opcode::Neq
            | Opcode::Slt
            | Opcode::Sgt
            | Opcode::Ult
            | Opcode::Ugt => {
                let result_ty = dfg.value_type(dfg.inst_result(inst));
                if result_ty != int_ty(1) {
                    self.error(inst, format!("result must be of type i1"));
                }
                let lhs_ty = dfg.value_type(data.args()[0]);
                let rhs_ty = dfg.value_type(data.args()[1]);
                if lhs_ty != rhs_ty {
                    self.error(inst, format!("arguments must be of the same type"));
                }
            }
            Opcode::Var => {
                let result_ty = dfg.value_type(dfg.inst_result(inst));
                let arg_ty = dfg.value_type(data.args()[0]);
                if result_ty != pointer_ty(arg_ty.clone()) {
                    self.error(
                        inst,
                        format!("result must be a pointer to {}", arg_ty),
                    );
                }
            }
            Opcode::Ld => {
                let result_ty = dfg.value_type(dfg.inst_result(inst));
                let arg_ty = dfg.value_type(data.args()[0]);
                if arg_ty != pointer_ty(result_ty.clone()) {
                    self.error(
                        inst,
                        format!("argument must be a pointer to {}", result_ty),
                    );
                }
            }
            Opcode::St => {
                let ptr_ty = dfg.value_type(data.args()[0]);
                let value_ty = dfg.value_type(data.args()[1]);
                if !ptr_ty.is_pointer() {
                    self.error(inst, format!("first argument must be a pointer"));
                } else if *ptr_ty.unwrap_pointer() != value_ty {
                    self.error(
                        inst,
                        format!("cannot store {} through {}", value_ty, ptr_ty),
                    );
                }
            }
            Opcode::Call => {
                let ext = data.get_ext_unit().unwrap();
                let sig = &dfg[ext].sig;
                if data.args().len() != sig.num_args() {
                    self.error(
                        inst,
                        format!(
                            "call to @{} expects {} arguments",
                            dfg[ext].name,
                            sig.num_args()
                        ),
                    );
                } else {
                    for (&value, arg) in data.args().iter().zip(sig.args()) {
                        if dfg.value_type(value) != sig.arg_type(arg) {
                            self.error(
                                inst,
                                format!(
                                    "argument {} must be of type {}",
                                    value.dump(dfg),
                                    sig.arg_type(arg)
                                ),
                            );
                        }
                    }
                }
            }
            Opcode::Ret => {
                let expected = self.verifier.return_type.clone().unwrap();
                if !expected.is_void() {
                    self.error(inst, format!("must return a value of type {}", expected));
                }
            }
            Opcode::RetValue => {
                let expected = self.verifier.return_type.clone().unwrap();
                let arg_ty = dfg.value_type(data.args()[0]);
                if arg_ty != expected {
                    self.error(
                        inst,
                        format!("returned value must be of type {}", expected),
                    );
                }
            }
            Opcode::Br => (),
            Opcode::BrCond => {
                let arg_ty = dfg.value_type(data.args()[0]);
                if arg_ty != int_ty(1) {
                    self.error(inst, format!("branch condition must be of type i1"));
                }
            }
            Opcode::Phi => self.verify_phi(inst),
        }

        // Check that terminators and phi nodes reference BBs which are part
        // of the layout.
        for &bb in data.blocks() {
            if !self.func.layout.is_block_inserted(bb) {
                self.error(inst, format!("references unknown block"));
            }
        }
    }

    /// Verify the integrity of a phi node.
    ///
    /// A phi node must carry exactly one incoming value per predecessor edge
    /// of its block, and all incoming values must agree with its type.
    fn verify_phi(&mut self, inst: Inst) {
        let dfg = &self.func.dfg;
        let data = &dfg[inst];
        let bb = self.func.layout.inst_block(inst);
        let preds = self.pt.pred_set(bb);

        if data.blocks().len() != preds.len() {
            self.error(
                inst,
                format!(
                    "phi has {} incoming values for {} predecessors",
                    data.blocks().len(),
                    preds.len()
                ),
            );
        }
        let mut seen = std::collections::HashSet::new();
        for &pred in data.blocks() {
            if !seen.insert(pred) {
                self.error(
                    inst,
                    format!(
                        "phi has multiple incoming values for {}",
                        pred.dump(&self.func.cfg)
                    ),
                );
            }
            if !preds.contains(&pred) {
                self.error(
                    inst,
                    format!(
                        "{} is not a predecessor of {}",
                        pred.dump(&self.func.cfg),
                        bb.dump(&self.func.cfg)
                    ),
                );
            }
        }
        let result_ty = dfg.value_type(dfg.inst_result(inst));
        for &value in data.args() {
            if dfg.value_type(value) != result_ty {
                self.error(
                    inst,
                    format!("incoming values must be of type {}", result_ty),
                );
            }
        }
    }
}

/// A verification error.
#[derive(Debug)]
pub struct VerifierError {
    /// The unit within which the error occurred.
    pub unit: Option<String>,
    /// The object which caused the error.
    pub object: Option<String>,
    /// The error message.
    pub message: String,
}

impl Display for VerifierError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(ref unit) = self.unit {
            write!(f, "{}: ", unit)?;
        }
        if let Some(ref object) = self.object {
            write!(f, "{}: ", object)?;
        }
        write!(f, "{}", self.message)?;
        Ok(())
    }
}

/// A list of verification errors.
#[derive(Debug, Default)]
pub struct VerifierErrors(pub Vec<VerifierError>);

impl Deref for VerifierErrors {
    type Target = Vec<VerifierError>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for VerifierErrors {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Display for VerifierErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for err in self.iter() {
            writeln!(f, "- {}", err)?;
        }
        Ok(())
    }
}
