//! Shared test utilities for qs.

pub mod clock;
pub mod fixtures;
pub mod logging;
pub mod mock_remote;
pub mod observer;

pub use clock::ManualClock;
pub use fixtures::{StoreFixture, quote, quotes};
pub use logging::TestLogger;
pub use mock_remote::{FetchBehavior, MockRemote};
pub use observer::RecordingObserver;
