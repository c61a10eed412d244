//! Artifacts written from bundles and loaded into a store file.

use crate::common::standard_bundle;
use kinesnap::durability::{manifest_path, KINE_SCHEMA};
use kinesnap::prelude::*;
use rusqlite::Connection;
use std::fs;

fn names(conn: &Connection) -> Vec<String> {
    conn.prepare("SELECT name FROM kine ORDER BY id")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
}

#[test]
fn translate_then_load() {
    let bundle = standard_bundle();
    let artifact = bundle.root().join("out/snapshot.sql");
    let mut events = Vec::new();

    let (report, manifest) = Bundle::open(bundle.root())
        .unwrap()
        .translate_to(&artifact, TranslateOptions::default(), &mut |e| {
            events.push(e.clone())
        })
        .unwrap();
    assert_eq!(report.records_written, 2);
    assert_eq!(manifest.record_count, 2);
    assert_eq!(events.len(), 3);
    assert!(manifest_path(&artifact).is_file());

    let text = fs::read_to_string(&artifact).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text
        .lines()
        .all(|l| l.starts_with("INSERT INTO kine(id, name, created, deleted, create_revision, prev_revision, lease, value, old_value) VALUES(")));

    let db = bundle.root().join("state.db");
    let load = SnapshotLoader::load(&artifact, &db, LoadOptions::default().create_table(true)).unwrap();
    assert_eq!(load.statements_applied, 2);

    let conn = Connection::open(&db).unwrap();
    assert_eq!(
        names(&conn),
        vec!["/registry/minions/node-a", "/registry/pods/default/web-1"]
    );
    let (created, deleted, lease): (i64, i64, i64) = conn
        .query_row(
            "SELECT created, deleted, lease FROM kine WHERE name = '/registry/pods/default/web-1'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!((created, deleted, lease), (1, 0, 0));
}

#[test]
fn loaded_value_is_the_canonical_json() {
    let bundle = standard_bundle();
    let artifact = bundle.root().join("snapshot.sql");
    Bundle::open(bundle.root())
        .unwrap()
        .translate_to(&artifact, TranslateOptions::default(), &mut |_| {})
        .unwrap();

    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(KINE_SCHEMA).unwrap();
    SnapshotLoader::load_into(&mut conn, &artifact, LoadOptions::default()).unwrap();

    let value: String = conn
        .query_row(
            "SELECT value FROM kine WHERE name = '/registry/minions/node-a'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&value).unwrap();
    assert_eq!(parsed["metadata"]["name"], "node-a");
    assert_eq!(parsed["kind"], "Node");
    assert!(!value.contains('\n'));
}

#[test]
fn second_load_into_same_store_conflicts() {
    let bundle = standard_bundle();
    let artifact = bundle.root().join("snapshot.sql");
    Bundle::open(bundle.root())
        .unwrap()
        .translate_to(&artifact, TranslateOptions::default(), &mut |_| {})
        .unwrap();

    let db = bundle.root().join("state.db");
    let opts = LoadOptions::default().create_table(true);
    SnapshotLoader::load(&artifact, &db, opts).unwrap();
    assert!(SnapshotLoader::load(&artifact, &db, opts).is_err());

    // Shifted revisions load next to the first snapshot.
    let shifted = bundle.root().join("shifted.sql");
    Bundle::open(bundle.root())
        .unwrap()
        .translate_to(
            &shifted,
            TranslateOptions::default().start_revision(200_000_000),
            &mut |_| {},
        )
        .unwrap();
    SnapshotLoader::load(&shifted, &db, opts).unwrap();
    assert_eq!(names(&Connection::open(&db).unwrap()).len(), 4);
}
