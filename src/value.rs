// Copyright (c) 2017-2020 Fabian Schuiki

//! Constant integer values.

use crate::ty::{int_ty, Type};
use num::{traits::*, BigUint};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// An integer value.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IntValue {
    /// The width of the value in bits.
    pub width: usize,
    /// The value itself.
    pub value: BigUint,
}

impl IntValue {
    /// Create a new integer value from a `usize`.
    pub fn from_usize(width: usize, value: usize) -> Self {
        Self::from_unsigned(width, value.into())
    }

    /// Create a new integer value from an unsigned `BigUint` value.
    ///
    /// The value is truncated to the requested width.
    pub fn from_unsigned(width: usize, value: BigUint) -> Self {
        let value = value % (BigUint::one() << width);
        Self { width, value }
    }

    /// Create the zero value for a width.
    pub fn zero(width: usize) -> Self {
        Self {
            width,
            value: BigUint::zero(),
        }
    }

    /// Check if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Check if the value is one.
    pub fn is_one(&self) -> bool {
        self.value.is_one()
    }

    /// Get the type of the value.
    pub fn ty(&self) -> Type {
        int_ty(self.width)
    }
}

impl Display for IntValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "i{} {}", self.width, self.value)
    }
}

impl Debug for IntValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl From<(usize, usize)> for IntValue {
    fn from((width, value): (usize, usize)) -> IntValue {
        IntValue::from_usize(width, value)
    }
}
