// Copyright (c) 2017-2020 Fabian Schuiki

//! Sift is a compact static single assignment (SSA) intermediate
//! representation together with the analyses and passes to strip it of dead
//! code. The crate provides tools to create, inspect, and transform SSA
//! graphs.

pub mod analysis;
pub mod ir;
pub mod pass;
pub mod table;
mod ty;
mod value;
pub mod verifier;

pub use crate::{ty::*, value::*};
