// Copyright (c) 2017-2020 Fabian Schuiki

//! Function signatures.

use crate::{
    ir::Arg,
    table::TableKey,
    ty::{void_ty, Type},
};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// A description of the arguments and return type of a `Function`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    args: Vec<Type>,
    retty: Type,
}

impl Signature {
    /// Create a new signature with no arguments and a void return type.
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            retty: void_ty(),
        }
    }

    /// Add an argument of the given type and return its position.
    pub fn add_input(&mut self, ty: Type) -> Arg {
        self.args.push(ty);
        Arg::new(self.args.len() - 1)
    }

    /// Set the return type of the signature.
    pub fn set_return_type(&mut self, ty: Type) {
        self.retty = ty;
    }

    /// Get the return type of the signature.
    pub fn return_type(&self) -> Type {
        self.retty.clone()
    }

    /// Check whether the signature has a non-void return type.
    pub fn has_return_type(&self) -> bool {
        !self.retty.is_void()
    }

    /// Return an iterator over the arguments of the signature.
    pub fn args<'a>(&'a self) -> impl Iterator<Item = Arg> + 'a {
        (0..self.args.len()).map(Arg::new)
    }

    /// Return the type of the given argument.
    pub fn arg_type(&self, arg: Arg) -> Type {
        self.args[arg.index()].clone()
    }

    /// Return the number of arguments.
    pub fn num_args(&self) -> usize {
        self.args.len()
    }
}

impl Default for Signature {
    fn default() -> Signature {
        Signature::new()
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "(")?;
        let mut comma = false;
        for ty in &self.args {
            if comma {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
            comma = true;
        }
        write!(f, ") {}", self.retty)?;
        Ok(())
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
