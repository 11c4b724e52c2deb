// Copyright (c) 2017-2020 Fabian Schuiki

//! Types of values.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use self::TypeKind::*;

/// A type.
pub type Type = Arc<TypeKind>;

/// The different kinds of types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// The `void` type.
    VoidType,
    /// Integer types like `i32`.
    IntType(usize),
    /// Pointer types like `i32*`.
    PointerType(Type),
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            VoidType => write!(f, "void"),
            IntType(w) => write!(f, "i{}", w),
            PointerType(ref ty) => write!(f, "{}*", ty),
        }
    }
}

impl TypeKind {
    /// Check if this is the void type.
    pub fn is_void(&self) -> bool {
        *self == VoidType
    }

    /// Check if this is an integer type.
    pub fn is_int(&self) -> bool {
        match *self {
            IntType(..) => true,
            _ => false,
        }
    }

    /// Check if this is a pointer type.
    pub fn is_pointer(&self) -> bool {
        match *self {
            PointerType(..) => true,
            _ => false,
        }
    }

    /// Unwrap the width of an integer type, or panic.
    pub fn unwrap_int(&self) -> usize {
        match *self {
            IntType(w) => w,
            _ => panic!("unwrap_int called on {}", self),
        }
    }

    /// Unwrap the pointee of a pointer type, or panic.
    pub fn unwrap_pointer(&self) -> &Type {
        match *self {
            PointerType(ref ty) => ty,
            _ => panic!("unwrap_pointer called on {}", self),
        }
    }
}

/// Create a void type.
pub fn void_ty() -> Type {
    Arc::new(VoidType)
}

/// Create an integer type of the requested width.
pub fn int_ty(width: usize) -> Type {
    Arc::new(IntType(width))
}

/// Create a pointer type to the requested pointee.
pub fn pointer_ty(ty: Type) -> Type {
    Arc::new(PointerType(ty))
}
