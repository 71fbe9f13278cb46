use crate::{
    db::{
        codec::{
            KeyDecodeError, KeyEncodeError,
            field::{FieldEncodeError, decode_field, encode_field, is_ordered},
        },
        store::range::prefix_bounds,
    },
    error::InternalError,
    model::{
        field::FieldModel,
        table::{ModelError, TableModel},
    },
    traits::RecordView,
    value::{Value, format_key},
};
use std::{cmp::Ordering, ops::Bound};

///
/// KeyCodec
///
/// Encodes key tuples for one index: a fixed prefix followed by one
/// segment per field. Tuples may be partial (a prefix of the fields), which
/// is how prefix and range bounds are expressed.
///
/// `terminal_open` marks whether the last field ends the stored key. When
/// something follows (a non-unique index appends the primary key) every
/// field must be self-delimiting.
///

#[derive(Clone, Debug)]
pub struct KeyCodec {
    prefix: Vec<u8>,
    fields: Vec<FieldModel>,
    terminal_open: bool,
}

impl KeyCodec {
    pub(crate) fn new(
        table: &'static TableModel,
        index_id: u32,
        field_names: &[&'static str],
        terminal_open: bool,
    ) -> Result<Self, ModelError> {
        let fields = field_names
            .iter()
            .map(|name| {
                table
                    .field(name)
                    .copied()
                    .ok_or(ModelError::UnknownField {
                        table: table.name,
                        field: *name,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            prefix: index_prefix(table.id, index_id),
            fields,
            terminal_open,
        })
    }

    #[must_use]
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Encode a (possibly partial) key tuple, prefix included.
    pub fn encode_key(&self, values: &[Value]) -> Result<Vec<u8>, KeyEncodeError> {
        let mut out = self.prefix.clone();
        self.encode_body(values, &mut out)?;

        Ok(out)
    }

    /// Encode a full key tuple, prefix included.
    pub fn encode_full_key(&self, values: &[Value]) -> Result<Vec<u8>, KeyEncodeError> {
        self.check_full(values)?;

        self.encode_key(values)
    }

    /// Byte bounds of every stored key whose leading fields equal `values`.
    ///
    /// A full key on a terminal-open codec is a single stored key, so its
    /// block is exactly that key. Anything else is a byte-prefix block.
    pub(crate) fn block_bounds(
        &self,
        values: &[Value],
    ) -> Result<(Bound<Vec<u8>>, Bound<Vec<u8>>), KeyEncodeError> {
        let key = self.encode_key(values)?;

        if self.terminal_open && values.len() == self.fields.len() {
            Ok((Bound::Included(key.clone()), Bound::Included(key)))
        } else {
            Ok(prefix_bounds(&key))
        }
    }

    /// Decode a full stored key. Trailing bytes are corruption.
    pub fn decode_key(&self, bytes: &[u8]) -> Result<Vec<Value>, KeyDecodeError> {
        let mut input = self.strip_prefix(bytes)?;
        let values = self.decode_body(&mut input)?;
        if !input.is_empty() {
            return Err(KeyDecodeError::TrailingBytes(input.len()));
        }

        Ok(values)
    }

    /// Order two key tuples field by field; when one is a prefix of the
    /// other the shorter sorts first.
    #[must_use]
    pub fn compare_keys(&self, a: &[Value], b: &[Value]) -> Ordering {
        for (x, y) in a.iter().zip(b) {
            let ord = x
                .canonical_cmp(y)
                .unwrap_or_else(|| x.kind().cmp(&y.kind()));
            if ord != Ordering::Equal {
                return ord;
            }
        }

        a.len().cmp(&b.len())
    }

    /// Whether byte order of encoded keys matches `compare_keys` for every
    /// field position.
    #[must_use]
    pub fn is_fully_ordered(&self) -> bool {
        (0..self.fields.len()).all(|i| self.is_ordered_at(i))
    }

    /// Reject range bounds that cannot describe a contiguous key range.
    ///
    /// Fields are compared pairwise over the common length. Up to the first
    /// strict difference `start` may not exceed `end`. At every position,
    /// before or after that difference, the bounds may only differ on an
    /// ordered field.
    pub fn check_valid_range_iteration_keys(
        &self,
        start: &[Value],
        end: &[Value],
    ) -> Result<(), InternalError> {
        self.check_values(start)?;
        self.check_values(end)?;

        let mut diverged = false;
        for (i, (x, y)) in start.iter().zip(end).enumerate() {
            let ord = x.canonical_cmp(y);
            if ord != Some(Ordering::Equal) && !self.is_ordered_at(i) {
                let field = self.fields[i].name;
                return Err(InternalError::codec_validation(format!(
                    "field '{field}' cannot be used in range iteration because it isn't ordered"
                )));
            }
            if diverged {
                continue;
            }

            match ord {
                Some(Ordering::Equal) => {}
                Some(Ordering::Less) => diverged = true,
                Some(Ordering::Greater) | None => {
                    return Err(InternalError::codec_validation(format!(
                        "start key {} must not be after end key {}",
                        format_key(start),
                        format_key(end),
                    )));
                }
            }
        }

        Ok(())
    }

    /// Project this index's fields out of a record, in field order.
    pub(crate) fn project(&self, record: &dyn RecordView) -> Result<Vec<Value>, KeyEncodeError> {
        self.fields
            .iter()
            .map(|f| {
                record
                    .value(f.name)
                    .ok_or(KeyEncodeError::MissingField { field: f.name })
            })
            .collect()
    }

    pub(crate) fn check_full(&self, values: &[Value]) -> Result<(), KeyEncodeError> {
        if values.len() != self.fields.len() {
            return Err(KeyEncodeError::IncompleteKey {
                fields: self.fields_label(),
                len: values.len(),
                expected: self.fields.len(),
            });
        }

        Ok(())
    }

    /// Append field segments without the prefix.
    pub(crate) fn encode_body(
        &self,
        values: &[Value],
        out: &mut Vec<u8>,
    ) -> Result<(), KeyEncodeError> {
        self.check_len(values)?;

        for (i, value) in values.iter().enumerate() {
            let field = &self.fields[i];
            encode_field(field.kind, self.is_terminal(i), value, out)
                .map_err(|err| Self::field_error(field, err))?;
        }

        Ok(())
    }

    /// Consume one full set of field segments from the front of `input`.
    pub(crate) fn decode_body(&self, input: &mut &[u8]) -> Result<Vec<Value>, KeyDecodeError> {
        self.fields
            .iter()
            .enumerate()
            .map(|(i, f)| decode_field(f.name, f.kind, self.is_terminal(i), input))
            .collect()
    }

    pub(crate) fn strip_prefix<'b>(&self, bytes: &'b [u8]) -> Result<&'b [u8], KeyDecodeError> {
        bytes
            .strip_prefix(self.prefix.as_slice())
            .ok_or(KeyDecodeError::PrefixMismatch)
    }

    fn check_values(&self, values: &[Value]) -> Result<(), KeyEncodeError> {
        self.check_len(values)?;

        for (field, value) in self.fields.iter().zip(values) {
            if field.kind != value.kind() {
                return Err(KeyEncodeError::KindMismatch {
                    field: field.name,
                    expected: field.kind,
                    actual: value.kind(),
                });
            }
        }

        Ok(())
    }

    fn check_len(&self, values: &[Value]) -> Result<(), KeyEncodeError> {
        if values.len() > self.fields.len() {
            return Err(KeyEncodeError::TooManyValues {
                fields: self.fields_label(),
                len: values.len(),
                max: self.fields.len(),
            });
        }

        Ok(())
    }

    const fn is_terminal(&self, position: usize) -> bool {
        self.terminal_open && position + 1 == self.fields.len()
    }

    fn is_ordered_at(&self, position: usize) -> bool {
        is_ordered(self.fields[position].kind, self.is_terminal(position))
    }

    fn fields_label(&self) -> String {
        self.field_names().join(", ")
    }

    fn field_error(field: &FieldModel, err: FieldEncodeError) -> KeyEncodeError {
        match err {
            FieldEncodeError::KindMismatch { expected, actual } => KeyEncodeError::KindMismatch {
                field: field.name,
                expected,
                actual,
            },
            FieldEncodeError::SegmentTooLarge { len } => KeyEncodeError::SegmentTooLarge {
                field: field.name,
                len,
            },
        }
    }
}

/// Key prefix shared by every entry of one index.
#[must_use]
pub(crate) fn index_prefix(table_id: u32, index_id: u32) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(8);
    prefix.extend_from_slice(&table_id.to_be_bytes());
    prefix.extend_from_slice(&index_id.to_be_bytes());

    prefix
}

///
/// TESTS
///
