#![forbid(unsafe_code)]

//! Field-to-index metadata for one persistent object type.

use rustc_hash::FxHashMap;

use crate::bounds::KeyOrdering;
use crate::error::{Result, SiftError};

/// Secondary index registered for a field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SecondaryIndex {
    /// Name of the index column family.
    pub name: String,
    /// Declared ordering of the index's row keys.
    pub ordering: KeyOrdering,
}

/// Catalog answer for one field path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldIndex {
    /// The resolved field path.
    pub field_path: String,
    /// The field's secondary index, if it has one.
    pub index: Option<SecondaryIndex>,
}

impl FieldIndex {
    /// Whether the field can be answered from a secondary index.
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }
}

/// Maps field paths of one object type to their secondary indexes.
///
/// Lookups are pure and deterministic. Resolving a field the catalog has
/// never heard of is a configuration error and fails fast; a known field
/// without an index resolves to `index: None`.
pub struct Catalog {
    primary_storage: String,
    fields: FxHashMap<String, Option<SecondaryIndex>>,
}

impl Catalog {
    /// Creates a catalog for an object type whose rows live in the named
    /// primary column family.
    pub fn new(primary_storage: impl Into<String>) -> Self {
        Self {
            primary_storage: primary_storage.into(),
            fields: FxHashMap::default(),
        }
    }

    /// Registers a field backed by a secondary index with the given ordering.
    pub fn with_index(
        mut self,
        field_path: impl Into<String>,
        index_name: impl Into<String>,
        ordering: KeyOrdering,
    ) -> Self {
        self.fields.insert(
            field_path.into(),
            Some(SecondaryIndex {
                name: index_name.into(),
                ordering,
            }),
        );
        self
    }

    /// Registers a field backed by a UTF-8 ordered secondary index.
    pub fn with_utf8_index(
        self,
        field_path: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        self.with_index(field_path, index_name, KeyOrdering::Utf8)
    }

    /// Registers a field that exists on the type but has no secondary index.
    pub fn with_unindexed_field(mut self, field_path: impl Into<String>) -> Self {
        self.fields.insert(field_path.into(), None);
        self
    }

    /// Resolves a field path to its index descriptor.
    pub fn resolve(&self, field_path: &str) -> Result<FieldIndex> {
        let index = self
            .fields
            .get(field_path)
            .ok_or_else(|| SiftError::UnknownField(field_path.to_owned()))?;
        Ok(FieldIndex {
            field_path: field_path.to_owned(),
            index: index.clone(),
        })
    }

    /// Identifier of the object type's primary column family.
    pub fn primary_storage(&self) -> &str {
        &self.primary_storage
    }
}
