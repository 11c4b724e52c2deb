// Copyright (c) 2017-2020 Fabian Schuiki

//! Representation of SSA modules.

use crate::{
    impl_table_indexing,
    ir::{FuncId, Function},
    table::PrimaryTable,
    verifier::{Verifier, VerifierErrors},
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A module.
///
/// This is the root node of the intermediate representation and owns the
/// functions a compilation unit consists of.
#[derive(Default, Serialize, Deserialize)]
pub struct Module {
    /// The functions in the module.
    pub(crate) functions: PrimaryTable<FuncId, Function>,
}

impl_table_indexing!(Module, functions, FuncId, Function);

impl Module {
    /// Create a new empty module.
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a function to the module.
    pub fn add_function(&mut self, func: Function) -> FuncId {
        self.functions.add(func)
    }

    /// Return an iterator over the function ids in the module.
    pub fn function_ids<'a>(&'a self) -> impl Iterator<Item = FuncId> + 'a {
        self.functions.keys()
    }

    /// Return an iterator over the functions in the module.
    pub fn functions<'a>(&'a self) -> impl Iterator<Item = &'a Function> + 'a {
        self.functions.values()
    }

    /// Return an iterator over mutable functions in the module.
    pub fn functions_mut<'a>(&'a mut self) -> impl Iterator<Item = &'a mut Function> + 'a {
        self.functions.values_mut()
    }

    /// Return a parallel iterator over mutable functions in the module.
    pub fn par_functions_mut<'a>(
        &'a mut self,
    ) -> impl ParallelIterator<Item = &'a mut Function> + 'a {
        self.functions.slots.par_iter_mut().filter_map(Option::as_mut)
    }

    /// Check whether the module is well-formed.
    pub fn verify(&self) -> Result<(), VerifierErrors> {
        let mut verifier = Verifier::new();
        verifier.verify_module(self);
        verifier.finish()
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut newline = false;
        for func in self.functions() {
            if newline {
                write!(f, "\n\n")?;
            }
            write!(f, "{}", func)?;
            newline = true;
        }
        Ok(())
    }
}
