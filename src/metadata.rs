//! Metadata records
//!
//! Properties and tags attached to entities, split into a user scope and a
//! system scope. A [`MetadataRecord`] is the unit the metadata assembler
//! returns: one entity, one scope, its properties and tags.

use crate::entity::EntityRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Who owns a piece of metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetadataScope {
    /// Written by users and pipelines.
    User,
    /// Maintained by the platform itself.
    System,
}

/// Properties and tags attached to one entity in one scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// The entity the metadata describes.
    pub entity: EntityRef,
    /// Scope the metadata belongs to.
    pub scope: MetadataScope,
    /// Key/value properties.
    pub properties: BTreeMap<String, String>,
    /// Free-form tags.
    pub tags: BTreeSet<String>,
}

impl MetadataRecord {
    /// Creates a record.
    pub fn new(
        entity: impl Into<EntityRef>,
        scope: MetadataScope,
        properties: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            entity: entity.into(),
            scope,
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::DataId;

    #[test]
    fn test_record_equality_by_content() {
        let a = MetadataRecord::new(
            DataId::dataset("default", "d1"),
            MetadataScope::User,
            [("owner", "etl-team")],
            ["gold"],
        );
        let b = MetadataRecord::new(
            DataId::dataset("default", "d1"),
            MetadataScope::User,
            [("owner", "etl-team")],
            ["gold"],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_scope_distinguishes_records() {
        let user = MetadataRecord::new(
            DataId::dataset("default", "d1"),
            MetadataScope::User,
            [("owner", "etl-team")],
            ["gold"],
        );
        let system = MetadataRecord::new(
            DataId::dataset("default", "d1"),
            MetadataScope::System,
            [("owner", "etl-team")],
            ["gold"],
        );
        assert_ne!(user, system);
    }
}
