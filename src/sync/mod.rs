//! Last-writer-wins synchronization with a remote quote endpoint.

pub mod config;
pub mod engine;
pub mod events;
pub mod merge;
pub mod remote;
pub mod scheduler;
pub mod state;

pub use config::{MergePolicy, PayloadFormat, RemoteConfig, SyncSettings};
pub use engine::{
    PendingSummary, Resolution, SyncCoordinator, SyncOptions, SyncOutcome, SyncReport,
    SyncStatus,
};
pub use events::{NullObserver, SyncEvent, SyncObserver, TracingObserver};
pub use remote::{HttpRemote, RemoteEndpoint, RemoteSnapshot};
pub use scheduler::{SchedulerHandle, SchedulerSummary, SyncScheduler};
pub use state::{ConflictChoice, PendingConflict, SyncMetadata};
