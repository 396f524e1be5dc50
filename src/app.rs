//! Per-invocation application context shared by CLI commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::core::{Clock, QuoteBook, SystemClock};
use crate::error::{QsError, Result};
use crate::storage::{QuoteStore, SqliteStore};
use crate::sync::{HttpRemote, SyncCoordinator, SyncObserver, SyncOptions};

pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn QuoteStore>,
    pub clock: Arc<dyn Clock>,
    pub output_format: OutputFormat,
    pub robot_mode: bool,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let qs_root = resolve_root(cli.root.as_deref())?;
        let config = Config::load(cli.config.as_deref(), &qs_root)?;
        let db_path = config.store.db_path(&qs_root);
        debug!(root = %qs_root.display(), db = %db_path.display(), "resolved data root");

        let mut store = SqliteStore::open(&db_path)?;
        if config.store.seed_defaults {
            store = store.with_seed_defaults()?;
        }

        let output_format = cli.output_format();
        Ok(Self {
            config,
            store: Arc::new(store),
            clock: Arc::new(SystemClock),
            robot_mode: output_format.is_machine_readable(),
            output_format,
        })
    }

    pub fn book(&self) -> QuoteBook {
        QuoteBook::new(Arc::clone(&self.store), Arc::clone(&self.clock))
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            merge_policy: self.config.sync.merge_policy,
            auto_push: self.config.sync.auto_push,
        }
    }

    /// Coordinator against the configured HTTP remote.
    pub fn coordinator(&self, observer: Arc<dyn SyncObserver>) -> Result<SyncCoordinator> {
        let remote = HttpRemote::new(&self.config.remote)?;
        Ok(SyncCoordinator::new(
            Arc::clone(&self.store),
            Arc::new(remote),
            Arc::clone(&self.clock),
            observer,
            self.sync_options(),
        ))
    }
}

/// Single-threaded runtime for sync commands.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(QsError::Io)
}

fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    dirs::data_dir()
        .map(|dir| dir.join("qs"))
        .ok_or_else(|| QsError::MissingConfig("data directory (set --root or QS_ROOT)".to_string()))
}
