//! Resource catalog
//!
//! Maps the type tokens found in bundle file names onto the path segments the
//! store uses for its keys. A bundle file is named `<kind>.<group>.yaml`, or
//! `<kind>.yaml` for the core group (whose group token is then `yaml`).
//!
//! ## Exceptions
//!
//! The store's key layout predates API groups for several resources, so a
//! handful of tokens do not map through unchanged:
//!
//! | Table | Effect |
//! |-------|--------|
//! | [`GROUP_ALIASES`] | group token collapses to the ungrouped layout |
//! | [`KIND_RENAMES`] | resource segment differs from the file's kind token |
//! | [`EXCLUDED_KINDS`] | kind is never translated |
//! | [`CLUSTER_SCOPED_KINDS`] | kind normally has no namespace (advisory) |
//!
//! Tokens missing from every table pass through unchanged.

use crate::types::ResourceTypeDescriptor;

/// Extension of per-resource files inside a bundle
pub const RESOURCE_FILE_EXTENSION: &str = "yaml";

/// Group tokens stored without a group segment
pub const GROUP_ALIASES: &[&str] = &[
    "yaml",
    "apps",
    "certificates.k8s.io",
    "coordination.k8s.io",
    "extensions",
    "networking.k8s.io",
    "rbac.authorization.k8s.io",
    "scheduling.k8s.io",
    "storage.k8s.io",
    "snapshot.storage.k8s.io",
];

/// Kind tokens whose resource segment is renamed in the store
pub const KIND_RENAMES: &[(&str, &str)] = &[
    ("nodes", "minions"),
    ("endpoints", "services/endpoints"),
    ("services", "services/specs"),
    ("leases", "leases/kube-node-lease"),
    ("ingresses", "ingress"),
    ("podsecuritypolicies", "podsecuritypolicy"),
];

/// Kind tokens that are never translated
///
/// Secret data is redacted in bundles and is not plain structured text.
pub const EXCLUDED_KINDS: &[&str] = &["secrets"];

/// Kind tokens that are cluster-scoped on a stock cluster
pub const CLUSTER_SCOPED_KINDS: &[&str] = &[
    "apiservices",
    "certificatesigningrequests",
    "clusterrolebindings",
    "clusterroles",
    "componentstatuses",
    "csidrivers",
    "csinodes",
    "customresourcedefinitions",
    "ingressclasses",
    "mutatingwebhookconfigurations",
    "namespaces",
    "nodes",
    "persistentvolumes",
    "podsecuritypolicies",
    "priorityclasses",
    "runtimeclasses",
    "storageclasses",
    "validatingwebhookconfigurations",
    "volumeattachments",
];

/// Static lookup from bundle file tokens to store path segments
///
/// # Examples
///
/// ```
/// use kinesnap_core::ResourceCatalog;
///
/// let catalog = ResourceCatalog::standard();
/// let nodes = catalog.resolve("yaml", "nodes");
/// assert_eq!(nodes.api_group, "");
/// assert_eq!(nodes.resource_name, "minions");
/// assert!(!nodes.namespaced);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ResourceCatalog {
    group_aliases: &'static [&'static str],
    kind_renames: &'static [(&'static str, &'static str)],
    excluded_kinds: &'static [&'static str],
    cluster_scoped_kinds: &'static [&'static str],
}

impl Default for ResourceCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ResourceCatalog {
    /// Catalog matching the store's existing key layout
    pub const fn standard() -> Self {
        ResourceCatalog {
            group_aliases: GROUP_ALIASES,
            kind_renames: KIND_RENAMES,
            excluded_kinds: EXCLUDED_KINDS,
            cluster_scoped_kinds: CLUSTER_SCOPED_KINDS,
        }
    }

    /// Resolve a file's group and kind tokens into a descriptor
    ///
    /// Total over every token: unknown groups and kinds pass through.
    pub fn resolve(&self, file_group_token: &str, kind_token: &str) -> ResourceTypeDescriptor {
        let api_group = if self.group_aliases.contains(&file_group_token) {
            String::new()
        } else {
            file_group_token.to_string()
        };

        let resource_name = self
            .kind_renames
            .iter()
            .find(|(from, _)| *from == kind_token)
            .map_or(kind_token, |(_, to)| *to)
            .to_string();

        ResourceTypeDescriptor {
            file_group_token: file_group_token.to_string(),
            api_group,
            resource_name,
            namespaced: !self.cluster_scoped_kinds.contains(&kind_token),
        }
    }

    /// Check whether a kind is deliberately left out of translation
    pub fn is_excluded(&self, kind_token: &str) -> bool {
        self.excluded_kinds.contains(&kind_token)
    }

    /// Split a resource file name into `(kind, group)` tokens
    ///
    /// `pods.yaml` yields `("pods", "yaml")`; `deployments.apps.yaml` yields
    /// `("deployments", "apps")`. Returns `None` for names without the
    /// resource file extension or with an empty kind.
    pub fn parse_file_name(file_name: &str) -> Option<(&str, &str)> {
        let stem = file_name
            .strip_suffix(RESOURCE_FILE_EXTENSION)?
            .strip_suffix('.')?;
        if stem.is_empty() {
            return None;
        }
        match stem.split_once('.') {
            Some((kind, group)) if !kind.is_empty() && !group.is_empty() => Some((kind, group)),
            Some(_) => None,
            None => Some((stem, RESOURCE_FILE_EXTENSION)),
        }
    }
}
