// Copyright (c) 2017-2021 Fabian Schuiki

//! Optimization and analysis passes on the IR.
//!
//! This module implements various passes that analyze or mutate the
//! intermediate representation.

pub mod dce;
pub mod tdce;

pub use dce::DeadCodeElim;
pub use tdce::TrivialDeadCodeElim;

use crate::ir::prelude::*;
use rayon::prelude::*;

/// An optimization pass.
///
/// The optimization infrastructure will always call `run_on_module()`.
/// However, implementors of the trait should override the function at their
/// desired level of granularity. The `Pass` trait provides a sane default for
/// all `run_*()` functions.
pub trait Pass {
    /// Run this pass on an entire module.
    fn run_on_module(ctx: &PassContext, module: &mut Module) -> bool {
        module
            .par_functions_mut()
            .map(|func| Self::run_on_function(ctx, func))
            .reduce(|| false, |a, b| a || b)
    }

    /// Run this pass on an entire function.
    fn run_on_function(ctx: &PassContext, func: &mut Function) -> bool {
        let insts: Vec<_> = func.layout.all_insts().collect();
        let mut modified = false;
        for inst in insts {
            modified |= Self::run_on_inst(ctx, inst, func);
        }
        modified
    }

    /// Run this pass on an instruction.
    #[allow(unused_variables)]
    fn run_on_inst(ctx: &PassContext, inst: Inst, func: &mut Function) -> bool {
        false
    }
}

/// Additional context and configuration for optimizations.
pub struct PassContext;
