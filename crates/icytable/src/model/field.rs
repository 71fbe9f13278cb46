use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// FieldKind
///
/// Declared storage kind of a record field. The key codec picks its
/// per-field encoding from this.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum FieldKind {
    Blob,
    Bool,
    Int,
    Text,
    Uint,
}

impl FieldKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Text => "text",
            Self::Uint => "uint",
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// FieldModel
/// Runtime field metadata surfaced by codegen or hand-written models.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldModel {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}
