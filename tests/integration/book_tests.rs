use quotesync::QsError;
use quotesync::core::CategoryFilter;
use quotesync::storage::QuoteStore;
use quotesync::test_utils::{StoreFixture, quote};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::t;

#[test]
fn export_format_is_pretty_json_array() {
    let fixture = StoreFixture::new();
    let book = fixture.book();
    book.add("Be kind", "Life").unwrap();
    book.add("Ship early", "Work").unwrap();

    insta::assert_snapshot!(book.export_json().unwrap(), @r#"
    [
      {
        "text": "Be kind",
        "category": "Life"
      },
      {
        "text": "Ship early",
        "category": "Work"
      }
    ]
    "#);
}

#[test]
fn export_then_import_into_another_store() {
    let source = StoreFixture::new();
    source.book().add("Carry me", "Travel").unwrap();
    source.book().add("Me too", "Travel").unwrap();
    let body = source.book().export_json().unwrap();

    let target = StoreFixture::new();
    target.book().add("Already here", "Home").unwrap();
    target.clock.advance_secs(60);
    let summary = target.book().import_json(&body).unwrap();

    assert_eq!(summary.added, 2);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.new_categories, vec!["Travel".to_string()]);

    let snapshot = target.store.load().unwrap();
    assert_eq!(snapshot.quotes[1], quote("Carry me", "Travel"));
    assert_eq!(snapshot.metadata.local_modified_at, Some(t(60)));
}

#[test]
fn rejected_import_changes_nothing() {
    let fixture = StoreFixture::new();
    fixture.book().add("Only one", "Solo").unwrap();
    let before = fixture.store.load().unwrap();

    for raw in [
        r#"{"text": "not an array", "category": "X"}"#,
        r#"[{"text": "ok", "category": "X"}, {"text": "missing category"}]"#,
        r#"[{"text": "   ", "category": "X"}]"#,
        "definitely not json",
    ] {
        let err = fixture.book().import_json(raw).unwrap_err();
        assert!(
            matches!(err, QsError::InvalidImportFormat(_)),
            "{raw} gave {err:?}"
        );
    }
    assert_eq!(fixture.store.load().unwrap(), before);
}

#[test]
fn random_quote_respects_filter() {
    let fixture = StoreFixture::new();
    let book = fixture.book();
    book.add("One", "Odd").unwrap();
    book.add("Two", "Even").unwrap();
    book.add("Three", "Odd").unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    let even = CategoryFilter::from("Even".to_string());
    for _ in 0..20 {
        let drawn = book.random_quote(&even, &mut rng).unwrap().unwrap();
        assert_eq!(drawn, quote("Two", "Even"));
    }

    let missing = CategoryFilter::from("Nope".to_string());
    assert!(book.random_quote(&missing, &mut rng).unwrap().is_none());
}

#[test]
fn clear_removes_quotes_and_categories() {
    let fixture = StoreFixture::new();
    let book = fixture.book();
    book.add("Gone soon", "Temp").unwrap();
    fixture.clock.advance_secs(5);

    assert_eq!(book.clear().unwrap(), 1);
    let snapshot = fixture.store.load().unwrap();
    assert!(snapshot.quotes.is_empty());
    assert!(snapshot.categories.is_empty());
    assert_eq!(snapshot.metadata.local_modified_at, Some(t(5)));
    assert!(book.random_quote(&CategoryFilter::All, &mut StdRng::seed_from_u64(1)).unwrap().is_none());
}
