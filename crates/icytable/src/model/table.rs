use crate::{
    MAX_INDEX_FIELDS,
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{field::FieldModel, index::IndexModel},
};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

///
/// ModelError
/// Static model contract violations detected when a table is built.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum ModelError {
    #[error("table '{table}' declares no primary key fields")]
    EmptyPrimaryKey { table: &'static str },

    #[error("table '{table}' index {index} declares no fields")]
    EmptyIndex { table: &'static str, index: u32 },

    #[error("table '{table}' references unknown field '{field}'")]
    UnknownField {
        table: &'static str,
        field: &'static str,
    },

    #[error("table '{table}' repeats field '{field}' in {context}")]
    DuplicateField {
        table: &'static str,
        field: &'static str,
        context: String,
    },

    #[error("table '{table}' {context} has {len} fields (max {MAX_INDEX_FIELDS})")]
    TooManyFields {
        table: &'static str,
        context: String,
        len: usize,
    },

    #[error("table '{table}' index id {index} is reserved or duplicated")]
    InvalidIndexId { table: &'static str, index: u32 },
}

impl From<ModelError> for InternalError {
    fn from(err: ModelError) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Model,
            err.to_string(),
        )
    }
}

///
/// TableModel
///
/// Static description of one record type: its table id (the key prefix
/// namespace), its fields, its primary key and its secondary indexes.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TableModel {
    pub id: u32,
    pub name: &'static str,
    pub fields: &'static [FieldModel],
    pub primary_key: &'static [&'static str],
    pub indexes: &'static [IndexModel],
}

impl TableModel {
    /// Index id reserved for the primary key.
    pub const PRIMARY_KEY_INDEX_ID: u32 = 0;

    #[must_use]
    pub const fn new(
        id: u32,
        name: &'static str,
        fields: &'static [FieldModel],
        primary_key: &'static [&'static str],
        indexes: &'static [IndexModel],
    ) -> Self {
        Self {
            id,
            name,
            fields,
            primary_key,
            indexes,
        }
    }

    /// Look up a declared field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a secondary index by its exact field sequence.
    #[must_use]
    pub fn index_by_fields(&self, fields: &[&str]) -> Option<&'static IndexModel> {
        self.indexes.iter().find(|idx| idx.fields == fields)
    }

    /// Check the static model contract.
    ///
    /// Field-name sequences must be non-empty, reference declared fields and
    /// contain no duplicates; index ids must be non-zero and unique.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.primary_key.is_empty() {
            return Err(ModelError::EmptyPrimaryKey { table: self.name });
        }
        self.validate_field_list(self.primary_key, "primary key".to_string())?;

        let mut seen_ids = BTreeSet::new();
        for index in self.indexes {
            if index.id == Self::PRIMARY_KEY_INDEX_ID || !seen_ids.insert(index.id) {
                return Err(ModelError::InvalidIndexId {
                    table: self.name,
                    index: index.id,
                });
            }
            if index.fields.is_empty() {
                return Err(ModelError::EmptyIndex {
                    table: self.name,
                    index: index.id,
                });
            }
            self.validate_field_list(index.fields, format!("index {}", index.id))?;
        }

        Ok(())
    }

    fn validate_field_list(
        &self,
        fields: &'static [&'static str],
        context: String,
    ) -> Result<(), ModelError> {
        if fields.len() > MAX_INDEX_FIELDS {
            return Err(ModelError::TooManyFields {
                table: self.name,
                context,
                len: fields.len(),
            });
        }

        let mut seen = BTreeSet::new();
        for field in fields {
            if self.field(field).is_none() {
                return Err(ModelError::UnknownField {
                    table: self.name,
                    field: *field,
                });
            }
            if !seen.insert(*field) {
                return Err(ModelError::DuplicateField {
                    table: self.name,
                    field: *field,
                    context,
                });
            }
        }

        Ok(())
    }
}

///
/// TESTS
///
