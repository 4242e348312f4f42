//! Tagged signal values: a concrete integer or undefined.
//!
//! Circuit evaluators may hold signals whose bits are not all resolved (the
//! `X` of a 4-state simulator). The kernel does not model per-bit state; a
//! value is either fully [`Concrete`](Value::Concrete) or
//! [`Undefined`](Value::Undefined), and every conversion to a boolean or
//! integer is fallible.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when an undefined value is converted to a concrete type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("value is undefined")]
pub struct UndefinedValue;

/// The value of one signal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Value {
    /// A fully resolved bit pattern.
    Concrete(u128),
    /// At least one bit is unknown.
    #[default]
    Undefined,
}

impl Value {
    /// Logic low.
    pub const ZERO: Value = Value::Concrete(0);
    /// Logic high.
    pub const ONE: Value = Value::Concrete(1);

    /// Creates a value from a boolean level.
    pub fn from_bool(level: bool) -> Self {
        Value::Concrete(u128::from(level))
    }

    /// Returns `true` if the value is concrete.
    pub fn is_valid(self) -> bool {
        matches!(self, Value::Concrete(_))
    }

    /// Resolves the value as a boolean: any nonzero pattern is `true`.
    pub fn to_bool(self) -> Result<bool, UndefinedValue> {
        match self {
            Value::Concrete(bits) => Ok(bits != 0),
            Value::Undefined => Err(UndefinedValue),
        }
    }

    /// Resolves the value as an unsigned integer.
    pub fn to_u128(self) -> Result<u128, UndefinedValue> {
        match self {
            Value::Concrete(bits) => Ok(bits),
            Value::Undefined => Err(UndefinedValue),
        }
    }

    /// Masks a concrete value to its low `width` bits.
    ///
    /// Undefined values are returned unchanged.
    pub fn truncate(self, width: u32) -> Self {
        match self {
            Value::Concrete(bits) if width < u128::BITS => {
                Value::Concrete(bits & ((1u128 << width) - 1))
            }
            other => other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Concrete(bits) => write!(f, "{bits}"),
            Value::Undefined => write!(f, "X"),
        }
    }
}

impl From<bool> for Value {
    fn from(level: bool) -> Self {
        Value::from_bool(level)
    }
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(bits: $ty) -> Self {
                    Value::Concrete(u128::from(bits))
                }
            }
        )*
    };
}

impl_from_unsigned!(u8, u16, u32, u64, u128);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Undefined, Into::into)
    }
}
