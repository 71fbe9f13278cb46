
use crate::model::field::FieldKind;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

///
/// Value
///
/// Dynamic field value used for key tuples and record reflection.
/// Only scalar kinds are representable; every variant maps to one
/// `FieldKind` so the key codec can check values against declared fields.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Value {
    Blob(Vec<u8>),
    Bool(bool),
    Int(i64),
    Text(String),
    Uint(u64),
}

impl Value {
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Blob(_) => FieldKind::Blob,
            Self::Bool(_) => FieldKind::Bool,
            Self::Int(_) => FieldKind::Int,
            Self::Text(_) => FieldKind::Text,
            Self::Uint(_) => FieldKind::Uint,
        }
    }

    /// Compare two values of the same kind by their natural order.
    ///
    /// Returns `None` when the kinds differ; values of different kinds have
    /// no semantic order.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Blob(a), Self::Blob(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Uint(a), Self::Uint(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob(v) => {
                f.write_str("0x")?;
                for byte in v {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Uint(v) => write!(f, "{v}u"),
        }
    }
}

/// Render a key tuple for error messages and trace output.
#[must_use]
pub fn format_key(values: &[Value]) -> String {
    let parts = values.iter().map(ToString::to_string).collect::<Vec<_>>();

    format!("({})", parts.join(", "))
}

macro_rules! impl_from_for_value {
    ($( $ty:ty => $variant:ident ),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    String => Text,
    &str => Text,
    Vec<u8> => Blob,
    &[u8] => Blob,
}
