// Copyright (c) 2017-2021 Fabian Schuiki

//! Trivial Dead Code Elimination
//!
//! This module implements a simpler, purely local variant of dead code
//! elimination. It removes instructions whose value has no uses at all,
//! without computing liveness.

use crate::ir::prelude::*;
use crate::pass::{Pass, PassContext};
use log::info;

/// Trivial Dead Code Elimination
///
/// This pass removes instructions that are safe to remove and whose result
/// is never read. Removing an instruction may render its operands unused in
/// turn, so the removal cascades into them.
pub struct TrivialDeadCodeElim;

impl Pass for TrivialDeadCodeElim {
    fn run_on_function(_ctx: &PassContext, func: &mut Function) -> bool {
        info!("TDCE [@{}]", func.name);
        let insts: Vec<_> = func.layout.all_insts().collect();
        let mut builder = FunctionBuilder::new(func);
        let mut modified = false;
        for inst in insts {
            modified |= builder.prune_if_unused(inst);
        }
        modified
    }
}
