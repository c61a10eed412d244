//! Property tests over generated bundles.

use crate::common::{item, list, TestBundle};
use kinesnap::prelude::*;
use proptest::prelude::*;

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,20}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn one_record_per_item(names in prop::collection::btree_set(name_strategy(), 0..12)) {
        let bundle = TestBundle::new();
        let items: Vec<String> = names
            .iter()
            .map(|n| item("v1", "ConfigMap", n, Some("default")))
            .collect();
        bundle.write("configmaps.yaml", &list(&items));

        let (records, report) = Bundle::open(bundle.root())
            .unwrap()
            .records(TranslateOptions::default())
            .unwrap();
        prop_assert_eq!(records.len(), names.len());
        prop_assert_eq!(report.records_written, names.len());

        for pair in records.windows(2) {
            prop_assert!(pair[0].id < pair[1].id);
        }
        for record in &records {
            prop_assert!(record.create_revision > record.id);
            prop_assert!(record.prev_revision > record.id);
            prop_assert_eq!(&record.value, &record.old_value);
            prop_assert!(record.key.as_str().starts_with("/registry/configmaps/default/"));
        }
    }

    #[test]
    fn identities_never_overlap(
        start in 1i64..1_000_000_000,
        stride in 3i64..16,
        count in 1usize..10,
    ) {
        let bundle = TestBundle::new();
        let items: Vec<String> = (0..count)
            .map(|i| item("v1", "Pod", &format!("pod-{}", i), Some("default")))
            .collect();
        bundle.write("pods.yaml", &list(&items));

        let (records, report) = Bundle::open(bundle.root())
            .unwrap()
            .records(TranslateOptions::default().start_revision(start).stride(stride))
            .unwrap();

        let mut used: Vec<i64> = records
            .iter()
            .flat_map(|r| [r.id, r.create_revision, r.prev_revision])
            .collect();
        let total = used.len();
        used.sort_unstable();
        used.dedup();
        prop_assert_eq!(used.len(), total);
        prop_assert_eq!(records[0].id, start);
        prop_assert_eq!(report.next_revision, start + stride * count as i64);
    }
}
