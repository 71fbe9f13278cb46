use std::fmt::{self, Display};

///
/// IndexModel
/// Runtime-only descriptor for a secondary index.
/// The id is local to its table; id 0 is reserved for the primary key.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IndexModel {
    pub id: u32,
    pub fields: &'static [&'static str],
    pub unique: bool,
}

impl IndexModel {
    #[must_use]
    pub const fn new(id: u32, fields: &'static [&'static str], unique: bool) -> Self {
        Self { id, fields, unique }
    }
}

impl Display for IndexModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.join(", ");

        if self.unique {
            write!(f, "UNIQUE #{}({})", self.id, fields)
        } else {
            write!(f, "#{}({})", self.id, fields)
        }
    }
}
