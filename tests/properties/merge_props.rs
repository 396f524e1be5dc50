use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use quotesync::core::{CategorySet, Quote};
use quotesync::sync::merge::merge_remote;
use quotesync::sync::{MergePolicy, SyncMetadata};

fn at(offset_ms: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::milliseconds(offset_ms)
}

fn arb_quote() -> impl Strategy<Value = Quote> {
    ("[a-e]{1,3}", prop_oneof![Just("Life"), Just("Work"), Just("Server")])
        .prop_map(|(text, category)| Quote::new(text, category).unwrap())
}

proptest! {
    #[test]
    fn conflict_only_when_edited_after_sync(
        last_sync in proptest::option::of(0i64..10_000),
        local in proptest::option::of(0i64..10_000),
    ) {
        let meta = SyncMetadata {
            last_sync_time: last_sync.map(at),
            local_modified_at: local.map(at),
            server_modified_at: None,
        };
        let expected = matches!((last_sync, local), (Some(s), Some(l)) if l > s);
        prop_assert_eq!(meta.has_conflict(), expected);
    }

    #[test]
    fn completed_syncs_strictly_increase(times in prop::collection::vec(0i64..1_000, 1..20)) {
        let mut meta = SyncMetadata::default();
        let mut previous = None;
        for offset in times {
            let stored = meta.complete_sync(at(offset));
            prop_assert!(Some(stored) > previous);
            prop_assert_eq!(meta.last_sync_time, Some(stored));
            previous = Some(stored);
        }
    }

    #[test]
    fn completing_a_sync_clears_older_edits(
        edit in 0i64..10_000,
        sync_after in 0i64..10_000,
    ) {
        let mut meta = SyncMetadata {
            local_modified_at: Some(at(edit)),
            ..SyncMetadata::default()
        };
        meta.complete_sync(at(edit + sync_after));
        prop_assert!(!meta.has_conflict());
    }

    #[test]
    fn skip_existing_merge_is_idempotent(
        local in prop::collection::vec(arb_quote(), 0..8),
        remote in prop::collection::vec(arb_quote(), 0..8),
    ) {
        let mut quotes = local.clone();
        let mut categories = CategorySet::from_quotes(&local);
        merge_remote(&mut quotes, &mut categories, &remote, MergePolicy::SkipExisting);

        prop_assert_eq!(&quotes[..local.len()], &local[..]);
        for quote in &remote {
            prop_assert!(quotes.contains(quote));
            prop_assert!(categories.contains(&quote.category));
        }

        let once = quotes.clone();
        let added = merge_remote(&mut quotes, &mut categories, &remote, MergePolicy::SkipExisting);
        prop_assert_eq!(added, 0);
        prop_assert_eq!(quotes, once);
    }

    #[test]
    fn append_merge_adds_everything(
        local in prop::collection::vec(arb_quote(), 0..8),
        remote in prop::collection::vec(arb_quote(), 0..8),
    ) {
        let mut quotes = local.clone();
        let mut categories = CategorySet::default();
        let added = merge_remote(&mut quotes, &mut categories, &remote, MergePolicy::Append);
        prop_assert_eq!(added, remote.len());
        prop_assert_eq!(quotes.len(), local.len() + remote.len());
    }
}
