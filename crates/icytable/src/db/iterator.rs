//! Module: iterator
//! Responsibility: lazy, ordered traversal of one index.
//!
//! The iterator holds raw byte bounds and narrows them past each key it
//! returns; every step is a fresh seek, so no store borrow is held between
//! steps.

use crate::{
    db::{
        backend::ReadBackend,
        codec::{DecodedEntry, IndexKeyCodec, KeyCodec, PrimaryKeyCodec, UniqueKeyCodec},
        list::{Cursor, Direction, ListOptions},
        store::{KvReader, KvStore},
    },
    error::InternalError,
    obs::sink::{self, MetricsEvent, OpKind},
    traits::Record,
    value::{Value, format_key},
};
use std::ops::Bound;

///
/// EntrySource
/// How entries under the iterated prefix are laid out.
///

#[derive(Clone, Copy)]
pub(crate) enum EntrySource<'a> {
    Primary,
    Unique(&'a UniqueKeyCodec),
    NonUnique(&'a IndexKeyCodec),
}

///
/// KeyBounds
///

pub(crate) type KeyBounds = (Bound<Vec<u8>>, Bound<Vec<u8>>);

/// Bounds for a prefix iterator: the block of keys starting with `prefix`.
pub(crate) fn prefix_key_bounds(
    codec: &KeyCodec,
    prefix: &[Value],
) -> Result<Option<KeyBounds>, InternalError> {
    Ok(Some(codec.block_bounds(prefix)?))
}

/// Bounds for a range iterator.
///
/// Each bound covers its whole key block: a partial end includes every key
/// it prefixes, a full end is inclusive. Exclusive flags drop the whole
/// block on that side. `None` means the range is empty.
pub(crate) fn range_key_bounds(
    codec: &KeyCodec,
    start: &[Value],
    end: &[Value],
    options: &ListOptions,
) -> Result<Option<KeyBounds>, InternalError> {
    codec.check_valid_range_iteration_keys(start, end)?;

    let (start_lower, start_upper) = codec.block_bounds(start)?;
    let (end_lower, end_upper) = codec.block_bounds(end)?;

    let lower = if options.is_exclusive_start() {
        match start_upper {
            Bound::Included(key) => Bound::Excluded(key),
            Bound::Excluded(key) => Bound::Included(key),
            Bound::Unbounded => return Ok(None),
        }
    } else {
        start_lower
    };

    let upper = if options.is_exclusive_end() {
        match end_lower {
            Bound::Included(key) => Bound::Excluded(key),
            Bound::Excluded(key) => Bound::Included(key),
            Bound::Unbounded => Bound::Unbounded,
        }
    } else {
        end_upper
    };

    Ok(Some((lower, upper)))
}

///
/// Current
///

struct Current {
    key: Vec<u8>,
    value: Vec<u8>,
    entry: DecodedEntry,
}

///
/// IndexIterator
///
/// Positioned before the first entry until `advance` is called. Accessors
/// return `None` while unpositioned or after the end.
///

pub struct IndexIterator<'a, R: Record> {
    backend: &'a dyn ReadBackend,
    primary: &'a PrimaryKeyCodec<R>,
    source: EntrySource<'a>,
    lower: Bound<Vec<u8>>,
    upper: Bound<Vec<u8>>,
    direction: Direction,
    skip: u64,
    remaining: Option<u64>,
    current: Option<Current>,
    scanned: u64,
    closed: bool,
}

impl<'a, R: Record> IndexIterator<'a, R> {
    pub(crate) fn new(
        backend: &'a dyn ReadBackend,
        primary: &'a PrimaryKeyCodec<R>,
        source: EntrySource<'a>,
        prefix: &[u8],
        bounds: Option<KeyBounds>,
        options: &ListOptions,
    ) -> Result<Self, InternalError> {
        options.validate()?;

        let mut iter = Self {
            backend,
            primary,
            source,
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
            direction: options.get_direction(),
            skip: options.get_offset(),
            remaining: options.get_limit(),
            current: None,
            scanned: 0,
            closed: false,
        };
        sink::record_if(
            iter.metrics_enabled(),
            MetricsEvent::OpStart {
                kind: OpKind::Scan,
                table: R::MODEL.name,
            },
        );

        let Some((lower, upper)) = bounds else {
            iter.close();
            return Ok(iter);
        };
        iter.lower = lower;
        iter.upper = upper;

        if let Some(cursor) = options.get_cursor() {
            iter.resume_after(prefix, cursor)?;
        }

        Ok(iter)
    }

    /// Step to the next entry. Returns `Ok(false)` once exhausted.
    pub fn advance(&mut self) -> Result<bool, InternalError> {
        self.current = None;
        if self.closed || self.remaining == Some(0) {
            return Ok(false);
        }

        loop {
            let Some((key, value)) = self.store().seek(&self.lower, &self.upper, self.direction)
            else {
                return Ok(false);
            };
            match self.direction {
                Direction::Asc => self.lower = Bound::Excluded(key.clone()),
                Direction::Desc => self.upper = Bound::Excluded(key.clone()),
            }
            self.scanned += 1;

            if self.skip > 0 {
                self.skip -= 1;
                continue;
            }

            let entry = self.decode(&key, &value)?;
            self.current = Some(Current { key, value, entry });
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }

            return Ok(true);
        }
    }

    /// Index key values of the current entry.
    #[must_use]
    pub fn keys(&self) -> Option<&[Value]> {
        self.current.as_ref().map(|c| c.entry.keys.as_slice())
    }

    /// Primary key values of the current entry.
    #[must_use]
    pub fn primary_key(&self) -> Option<&[Value]> {
        self.current.as_ref().map(|c| c.entry.primary_key.as_slice())
    }

    /// Resume token for the current entry.
    #[must_use]
    pub fn cursor(&self) -> Option<Cursor> {
        self.current
            .as_ref()
            .map(|c| Cursor::from_bytes(c.key.clone()))
    }

    /// Load the record the current entry refers to.
    pub fn record(&self) -> Result<R, InternalError> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| InternalError::store_invariant("iterator is not positioned"))?;
        let max = self.backend.config().max_value_bytes as usize;

        match self.source {
            EntrySource::Primary => self.primary.unmarshal(&current.key, &current.value, max),
            EntrySource::Unique(_) | EntrySource::NonUnique(_) => {
                let pk_bytes = &current.entry.primary_key_bytes;
                let value = self
                    .backend
                    .commitment_store_reader()
                    .get(pk_bytes)?
                    .ok_or_else(|| {
                        InternalError::index_corruption(format!(
                            "{}: index entry refers to missing record {}",
                            R::MODEL.name,
                            format_key(&current.entry.primary_key),
                        ))
                    })?;

                self.primary.unmarshal(pk_bytes, &value, max)
            }
        }
    }

    /// Stop iterating. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.current = None;

        let enabled = self.metrics_enabled();
        let table = R::MODEL.name;
        sink::record_if(
            enabled,
            MetricsEvent::RowsScanned {
                table,
                rows_scanned: self.scanned,
            },
        );
    }

    fn store(&self) -> &'a KvStore {
        match self.source {
            EntrySource::Primary => self.backend.commitment_store_reader(),
            EntrySource::Unique(_) | EntrySource::NonUnique(_) => {
                self.backend.index_store_reader()
            }
        }
    }

    fn decode(&self, key: &[u8], value: &[u8]) -> Result<DecodedEntry, InternalError> {
        let entry = match self.source {
            EntrySource::Primary => {
                let values = self.primary.key_codec().decode_key(key)?;
                DecodedEntry {
                    keys: values.clone(),
                    primary_key: values,
                    primary_key_bytes: key.to_vec(),
                }
            }
            EntrySource::Unique(codec) => codec.decode_entry(key, value)?,
            EntrySource::NonUnique(codec) => codec.decode_entry_key(key)?,
        };

        Ok(entry)
    }

    // Narrow the leading bound to start strictly after the cursor.
    fn resume_after(&mut self, prefix: &[u8], cursor: &Cursor) -> Result<(), InternalError> {
        let key = cursor.as_bytes();
        if !key.starts_with(prefix) {
            return Err(InternalError::list_validation(format!(
                "cursor {cursor} does not belong to this index"
            )));
        }

        let bound = match self.direction {
            Direction::Asc => &mut self.lower,
            Direction::Desc => &mut self.upper,
        };
        let tighter = match &*bound {
            Bound::Unbounded => true,
            Bound::Included(b) | Bound::Excluded(b) => match self.direction {
                Direction::Asc => key >= b.as_slice(),
                Direction::Desc => key <= b.as_slice(),
            },
        };
        if tighter {
            *bound = Bound::Excluded(key.to_vec());
        }

        Ok(())
    }

    fn metrics_enabled(&self) -> bool {
        self.backend.config().metrics_enabled
    }
}

impl<R: Record> Iterator for IndexIterator<'_, R> {
    type Item = Result<R, InternalError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(true) => Some(self.record()),
            Ok(false) => {
                self.close();
                None
            }
            Err(err) => {
                self.close();
                Some(Err(err))
            }
        }
    }
}

impl<R: Record> Drop for IndexIterator<'_, R> {
    fn drop(&mut self) {
        self.close();
    }
}
