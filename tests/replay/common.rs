//! Bundle fixtures shared by the replay tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A bundle on disk with an `api-resources` directory
pub struct TestBundle {
    pub dir: TempDir,
}

impl TestBundle {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("cluster-data/api-resources")).unwrap();
        TestBundle { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn resources(&self) -> PathBuf {
        self.root().join("cluster-data/api-resources")
    }

    pub fn write(&self, file_name: &str, contents: &str) -> &Self {
        fs::write(self.resources().join(file_name), contents).unwrap();
        self
    }
}

/// One list item as YAML, indented for an `items:` list
pub fn item(api_version: &str, kind: &str, name: &str, namespace: Option<&str>) -> String {
    let mut out = format!(
        "- apiVersion: {}\n  kind: {}\n  metadata:\n    name: \"{}\"\n",
        api_version, kind, name
    );
    if let Some(ns) = namespace {
        out.push_str(&format!("    namespace: \"{}\"\n", ns));
    }
    out
}

/// A resource file document holding `items`
pub fn list(items: &[String]) -> String {
    if items.is_empty() {
        return "apiVersion: v1\nkind: List\nitems: []\n".to_string();
    }
    format!("apiVersion: v1\nkind: List\nitems:\n{}", items.concat())
}

/// The bundle used across tests: one pod, one node, one secret
pub fn standard_bundle() -> TestBundle {
    let bundle = TestBundle::new();
    bundle
        .write(
            "pods.yaml",
            &list(&[item("v1", "Pod", "web-1", Some("default"))]),
        )
        .write("nodes.yaml", &list(&[item("v1", "Node", "node-a", None)]))
        .write(
            "secrets.yaml",
            &list(&[item("v1", "Secret", "token", Some("default"))]),
        );
    bundle
}
