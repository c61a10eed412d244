//! Translation data model
//!
//! This module defines the types that flow through the translator:
//! - [`ResourceTypeDescriptor`]: how one bundle file maps onto store paths
//! - [`CapturedObject`]: one normalized object from a resource file
//! - [`StorageKey`]: the `/registry/...` key the store looks objects up by
//! - [`RevisionTriple`] and [`KvRecord`]: one row of the kine table

use serde::{Deserialize, Serialize};

/// Revision numbers in the store are signed 64-bit integers
pub type Revision = i64;

/// Prefix every storage key starts with
pub const REGISTRY_PREFIX: &str = "/registry/";

/// Store-side identity of one resource file type
///
/// Produced by [`crate::ResourceCatalog::resolve`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceTypeDescriptor {
    /// Group token exactly as it appeared in the file name
    pub file_group_token: String,
    /// Group segment used in storage keys (empty for the core path layout)
    pub api_group: String,
    /// Resource segment used in storage keys, after renames
    pub resource_name: String,
    /// Whether objects of this type normally carry a namespace
    ///
    /// Advisory only: the namespace segment of a key always comes from the
    /// object itself.
    pub namespaced: bool,
}

/// One object captured in a bundle, normalized for storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedObject {
    /// Object kind (e.g. `Pod`)
    pub kind: String,
    /// Object apiVersion (e.g. `v1`, `apps/v1`)
    pub api_version: String,
    /// `metadata.name`, never empty
    pub name: String,
    /// `metadata.namespace` when the object carries one
    pub namespace: Option<String>,
    /// Canonical serialized form of the full object
    pub raw_value: Vec<u8>,
}

/// Hierarchical key an object is stored under
///
/// Layout: `/registry/[group/]resource/[namespace/]name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StorageKey(String);

impl StorageKey {
    /// Build the key for an object of the given type
    ///
    /// # Examples
    ///
    /// ```
    /// use kinesnap_core::{ResourceCatalog, StorageKey};
    ///
    /// let catalog = ResourceCatalog::standard();
    /// let descriptor = catalog.resolve("apps", "deployments");
    /// let key = StorageKey::build(&descriptor, Some("default"), "web");
    /// assert_eq!(key.as_str(), "/registry/deployments/default/web");
    /// ```
    pub fn build(descriptor: &ResourceTypeDescriptor, namespace: Option<&str>, name: &str) -> Self {
        let mut key = String::with_capacity(
            REGISTRY_PREFIX.len()
                + descriptor.api_group.len()
                + descriptor.resource_name.len()
                + namespace.map_or(0, str::len)
                + name.len()
                + 3,
        );
        key.push_str(REGISTRY_PREFIX);
        if !descriptor.api_group.is_empty() {
            key.push_str(&descriptor.api_group);
            key.push('/');
        }
        key.push_str(&descriptor.resource_name);
        key.push('/');
        if let Some(ns) = namespace.filter(|ns| !ns.is_empty()) {
            key.push_str(ns);
            key.push('/');
        }
        key.push_str(name);
        StorageKey(key)
    }

    /// Wrap a key read back from an artifact
    pub fn from_raw(key: impl Into<String>) -> Self {
        StorageKey(key.into())
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity assigned to one record: its id and the two revisions after it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionTriple {
    /// Row id
    pub id: Revision,
    /// Revision the key was created at
    pub create_revision: Revision,
    /// Revision of the previous version of the key
    pub prev_revision: Revision,
}

impl RevisionTriple {
    /// Both revisions sit strictly above the id
    pub fn is_well_ordered(&self) -> bool {
        self.create_revision > self.id && self.prev_revision > self.id
    }
}

/// One row of the kine table
///
/// Records are created once per translated object and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvRecord {
    /// Row id
    pub id: Revision,
    /// Storage key (`name` column)
    pub key: StorageKey,
    /// Always true for snapshot records
    pub created: bool,
    /// Always false for snapshot records
    pub deleted: bool,
    /// `create_revision` column
    pub create_revision: Revision,
    /// `prev_revision` column
    pub prev_revision: Revision,
    /// Lease id, always 0 for snapshot records
    pub lease: i64,
    /// Serialized object
    pub value: Vec<u8>,
    /// Previous serialized object, identical to `value` for snapshot records
    pub old_value: Vec<u8>,
}

impl KvRecord {
    /// Build the record for a freshly created key
    pub fn created(key: StorageKey, identity: RevisionTriple, value: Vec<u8>) -> Self {
        KvRecord {
            id: identity.id,
            key,
            created: true,
            deleted: false,
            create_revision: identity.create_revision,
            prev_revision: identity.prev_revision,
            lease: 0,
            old_value: value.clone(),
            value,
        }
    }

    /// Identity triple of this record
    pub fn identity(&self) -> RevisionTriple {
        RevisionTriple {
            id: self.id,
            create_revision: self.create_revision,
            prev_revision: self.prev_revision,
        }
    }
}
