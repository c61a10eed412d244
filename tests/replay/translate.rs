//! Translated records: keys, exclusions, ordering, escaping.

use crate::common::{item, list, standard_bundle, TestBundle};
use kinesnap::prelude::*;
use kinesnap::translate::{decode, emit};

#[test]
fn standard_bundle_yields_pod_and_node() {
    let bundle = standard_bundle();
    let (records, report) = Bundle::open(bundle.root())
        .unwrap()
        .records(TranslateOptions::default())
        .unwrap();

    let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["/registry/minions/node-a", "/registry/pods/default/web-1"]
    );
    assert_eq!(report.files_excluded(), 1);
    assert_eq!(report.records_written, 2);
    assert!(records.iter().all(|r| !r.value.windows(6).any(|w| w == b"Secret")));
}

#[test]
fn identities_follow_the_counter() {
    let bundle = standard_bundle();
    let (records, report) = Bundle::open(bundle.root())
        .unwrap()
        .records(TranslateOptions::default().start_revision(100_000_000))
        .unwrap();

    let ids: Vec<(i64, i64, i64)> = records
        .iter()
        .map(|r| (r.id, r.create_revision, r.prev_revision))
        .collect();
    assert_eq!(
        ids,
        vec![
            (100_000_000, 100_000_001, 100_000_002),
            (100_000_004, 100_000_005, 100_000_006),
        ]
    );
    assert_eq!(report.next_revision, 100_000_008);
}

#[test]
fn grouped_resources_get_their_group_segment() {
    let bundle = TestBundle::new();
    bundle.write(
        "deployments.apps.yaml",
        &list(&[item("apps/v1", "Deployment", "web", Some("prod"))]),
    );
    bundle.write(
        "ingresses.networking.k8s.io.yaml",
        &list(&[item("networking.k8s.io/v1", "Ingress", "edge", Some("prod"))]),
    );

    let (records, _) = Bundle::open(bundle.root())
        .unwrap()
        .records(TranslateOptions::default())
        .unwrap();
    let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["/registry/deployments/prod/web", "/registry/ingress/prod/edge"]
    );
}

#[test]
fn empty_file_is_reported_not_written() {
    let bundle = TestBundle::new();
    bundle.write("configmaps.yaml", &list(&[]));

    let (records, report) = Bundle::open(bundle.root())
        .unwrap()
        .records(TranslateOptions::default())
        .unwrap();
    assert!(records.is_empty());
    assert_eq!(report.files_skipped(), 1);
    assert_eq!(report.first_id, None);
}

#[test]
fn apostrophes_survive_the_statement() {
    let bundle = TestBundle::new();
    bundle.write(
        "configmaps.yaml",
        "items:\n- apiVersion: v1\n  kind: ConfigMap\n  metadata:\n    name: quotes\n    namespace: default\n  data:\n    motd: \"it's <fine> & done\"\n",
    );

    let (records, _) = Bundle::open(bundle.root())
        .unwrap()
        .records(TranslateOptions::default())
        .unwrap();
    let record = &records[0];
    let value = String::from_utf8(record.value.clone()).unwrap();
    assert!(value.contains("it's <fine> & done"));

    let statement = String::from_utf8(emit(record).unwrap()).unwrap();
    assert!(statement.contains("it''s <fine> & done"));
    assert_eq!(&decode(statement.as_bytes()).unwrap(), record);
}

#[test]
fn malformed_item_names_file_and_index() {
    let bundle = TestBundle::new();
    bundle.write(
        "pods.yaml",
        &format!(
            "items:\n{}- apiVersion: v1\n  kind: Pod\n  metadata: {{}}\n",
            item("v1", "Pod", "ok", Some("default"))
        ),
    );

    let err = Bundle::open(bundle.root())
        .unwrap()
        .records(TranslateOptions::default())
        .unwrap_err();
    assert!(err.is_malformed());
    let message = err.to_string();
    assert!(message.contains("pods.yaml"), "{}", message);
    assert!(message.contains("item 1"), "{}", message);
}

#[test]
fn missing_resource_dir_is_not_found() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = Bundle::open(dir.path())
        .unwrap()
        .records(TranslateOptions::default())
        .unwrap_err();
    assert!(err.is_not_found());
}
