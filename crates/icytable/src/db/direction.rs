use serde::{Deserialize, Serialize};

///
/// Direction
///
/// Traversal direction shared by list options, iterators and the raw
/// store seek.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}
