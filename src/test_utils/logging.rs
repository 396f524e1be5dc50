use std::time::Instant;

use crate::storage::StoreSnapshot;
use crate::sync::events::SyncEvent;

/// Banner-style progress output for long scenario tests.
pub struct TestLogger {
    test_name: String,
    start_time: Instant,
}

impl TestLogger {
    pub fn new(test_name: &str) -> Self {
        let separator = "=".repeat(60);
        println!("\n{separator}");
        println!("[TEST START] {test_name}");
        println!("{separator}");
        Self {
            test_name: test_name.to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn step(&self, description: &str) {
        println!("[STEP] {description}");
    }

    pub fn log_snapshot(&self, label: &str, snapshot: &StoreSnapshot) {
        println!(
            "[STATE] {label}: {} quotes, {} categories, lastSync={:?}, localModified={:?}",
            snapshot.quotes.len(),
            snapshot.categories.len(),
            snapshot.metadata.last_sync_time,
            snapshot.metadata.local_modified_at,
        );
    }

    pub fn log_events(&self, events: &[SyncEvent]) {
        for event in events {
            println!("[EVENT] {}", event.message());
        }
    }

    pub fn pass(&self) {
        println!(
            "[RESULT] {} PASSED in {:?}",
            self.test_name,
            self.start_time.elapsed()
        );
        println!("{}\n", "=".repeat(60));
    }
}
