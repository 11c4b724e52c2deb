// Copyright (c) 2017-2021 Fabian Schuiki

//! Dead Code Elimination
//!
//! This module implements liveness-driven dead code elimination. It removes
//! instructions whose value is not live at any point after their definition,
//! repeating until no more instructions can be removed.

use crate::analysis::{Liveness, PredecessorTable};
use crate::ir::prelude::*;
use crate::pass::{Pass, PassContext};
use log::{debug, info};

/// Dead Code Elimination
///
/// This pass computes the liveness of all values in a function and removes
/// the instructions whose result is not live immediately after them. Removing
/// an instruction can only shrink the live sets of the instructions before
/// it, so the pass recomputes liveness from scratch after every batch of
/// removals and stops once a batch comes up empty.
///
/// Only instructions that are safe to remove are candidates: terminators,
/// phi nodes, and side-effecting instructions stay untouched regardless of
/// their liveness.
pub struct DeadCodeElim;

impl Pass for DeadCodeElim {
    fn run_on_function(_ctx: &PassContext, func: &mut Function) -> bool {
        info!("DCE [@{}]", func.name);
        let mut modified = false;
        loop {
            let pt = PredecessorTable::new(func);
            let liveness = Liveness::new(func, &pt);

            // Gather the instructions that are dead at their own definition
            // point. The liveness table stays valid for all of them since
            // none of the batch is live anywhere in the function.
            let mut dead = vec![];
            for bb in func.layout.blocks() {
                for inst in func.layout.insts(bb) {
                    if !func.dfg[inst].opcode().is_safe_to_remove() {
                        continue;
                    }
                    let unused = match func.dfg.get_inst_result(inst) {
                        Some(value) => !liveness.live_out(inst).contains(&value),
                        None => true,
                    };
                    if unused {
                        dead.push(inst);
                    }
                }
            }
            if dead.is_empty() {
                break;
            }

            let mut builder = FunctionBuilder::new(func);
            for inst in dead.into_iter().rev() {
                debug!(
                    "Removing {}",
                    inst.dump(&builder.func.dfg, &builder.func.cfg)
                );
                builder.remove_inst(inst);
            }
            modified = true;
        }
        modified
    }
}
