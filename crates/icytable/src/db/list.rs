//! Iteration options.
//!
//! Options are a typed builder, so an unrecognized option cannot be
//! expressed. Combinations that are representable but meaningless are
//! rejected by `ListOptions::validate` before any store access.

pub use crate::db::direction::Direction;

use crate::{config::EngineConfig, error::InternalError};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Cursor
///
/// Opaque resume token: the raw store key of the last entry an iterator
/// returned. Resuming continues strictly after it in the iteration
/// direction.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Cursor(Vec<u8>);

impl Cursor {
    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }

        Ok(())
    }
}

///
/// ListOptions
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ListOptions {
    direction: Direction,
    offset: u64,
    limit: Option<u64>,
    cursor: Option<Cursor>,
    exclusive_start: bool,
    exclusive_end: bool,
}

impl ListOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for the first page of a paginated listing.
    #[must_use]
    pub fn first_page(config: &EngineConfig) -> Self {
        Self::new().limit(u64::from(config.default_page_limit))
    }

    #[must_use]
    pub const fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub const fn reverse(self) -> Self {
        self.direction(Direction::Desc)
    }

    /// Skip this many entries before yielding.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Yield at most this many entries.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume after a cursor returned by an earlier iterator.
    #[must_use]
    pub fn cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Exclude the start bound of a range.
    #[must_use]
    pub const fn exclusive_start(mut self) -> Self {
        self.exclusive_start = true;
        self
    }

    /// Exclude the end bound of a range.
    #[must_use]
    pub const fn exclusive_end(mut self) -> Self {
        self.exclusive_end = true;
        self
    }

    #[must_use]
    pub const fn get_direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub const fn get_offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub const fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    #[must_use]
    pub const fn get_cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    #[must_use]
    pub const fn is_exclusive_start(&self) -> bool {
        self.exclusive_start
    }

    #[must_use]
    pub const fn is_exclusive_end(&self) -> bool {
        self.exclusive_end
    }

    pub fn validate(&self) -> Result<(), InternalError> {
        if self.offset > 0 && self.cursor.is_some() {
            return Err(InternalError::list_validation(
                "offset cannot be combined with a cursor",
            ));
        }

        Ok(())
    }
}

///
/// TESTS
///
