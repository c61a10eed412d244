//! Key and revision allocation
//!
//! Each translated object gets a storage key and an identity triple
//! `(id, create_revision, prev_revision) = (c, c + 1, c + 2)` where `c` is the
//! counter handed in by the caller. The counter then advances by the stride,
//! so ids are unique and strictly increasing as long as the caller threads
//! the returned counter into the next call.
//!
//! The counter is an explicit value rather than shared state: the same start
//! and the same object sequence always produce the same identities. Loading
//! two translations with the same start into one store collides on ids;
//! pick a fresh start per load when that matters.

use kinesnap_core::{
    CapturedObject, Error, ResourceTypeDescriptor, Result, Revision, RevisionTriple, StorageKey,
};

/// Counter value translation starts from unless told otherwise
///
/// Far above anything a freshly created store has used itself.
pub const DEFAULT_START_REVISION: Revision = 100_000_000;

/// Distance between consecutive record ids
pub const DEFAULT_STRIDE: i64 = 4;

/// Smallest stride that keeps both revisions of a record below the next id
pub const MIN_STRIDE: i64 = 3;

/// Result of allocating one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Key the object is stored under
    pub key: StorageKey,
    /// Identity of the record
    pub identity: RevisionTriple,
    /// Counter to hand to the next allocation
    pub next: Revision,
}

/// Pure allocator of keys and identity triples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionAllocator {
    stride: i64,
}

impl Default for RevisionAllocator {
    fn default() -> Self {
        RevisionAllocator {
            stride: DEFAULT_STRIDE,
        }
    }
}

impl RevisionAllocator {
    /// Create an allocator with the given stride
    ///
    /// Fails with `InvalidConfig` when the stride is below [`MIN_STRIDE`].
    pub fn new(stride: i64) -> Result<Self> {
        if stride < MIN_STRIDE {
            return Err(Error::InvalidConfig(format!(
                "stride must be at least {}, got {}",
                MIN_STRIDE, stride
            )));
        }
        Ok(RevisionAllocator { stride })
    }

    /// Distance between consecutive ids
    pub fn stride(&self) -> i64 {
        self.stride
    }

    /// Allocate the key and identity for one object at `counter`
    ///
    /// # Examples
    ///
    /// ```
    /// use kinesnap_core::{CapturedObject, ResourceCatalog};
    /// use kinesnap_translate::RevisionAllocator;
    ///
    /// let descriptor = ResourceCatalog::standard().resolve("yaml", "nodes");
    /// let node = CapturedObject {
    ///     kind: "Node".into(),
    ///     api_version: "v1".into(),
    ///     name: "node-a".into(),
    ///     namespace: None,
    ///     raw_value: b"{}".to_vec(),
    /// };
    ///
    /// let a = RevisionAllocator::default().allocate(&descriptor, &node, 100).unwrap();
    /// assert_eq!(a.key.as_str(), "/registry/minions/node-a");
    /// assert_eq!((a.identity.id, a.identity.create_revision, a.identity.prev_revision), (100, 101, 102));
    /// assert_eq!(a.next, 104);
    /// ```
    pub fn allocate(
        &self,
        descriptor: &ResourceTypeDescriptor,
        object: &CapturedObject,
        counter: Revision,
    ) -> Result<Allocation> {
        let overflow = || Error::RevisionOverflow {
            counter,
            stride: self.stride,
        };
        let next = counter.checked_add(self.stride).ok_or_else(overflow)?;

        let key = StorageKey::build(descriptor, object.namespace.as_deref(), &object.name);
        let identity = RevisionTriple {
            id: counter,
            create_revision: counter + 1,
            prev_revision: counter + 2,
        };

        Ok(Allocation {
            key,
            identity,
            next,
        })
    }
}
