use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::{mpsc, Mutex, MutexGuard};
use tracing::warn;

use mediahub_data::compiler::Compiler;
use mediahub_data::config::Config;
use mediahub_data::db;
use mediahub_data::schedule::DownloadQueue;

/// Shared application state accessible by all handlers.
pub struct AppState {
    /// Single connection guarded by an async mutex; handlers hold it
    /// only for the duration of their queries.
    conn: Mutex<Connection>,
    config: Config,
    compiler: Arc<dyn Compiler>,
    download_tx: mpsc::Sender<i64>,
}

impl AppState {
    /// Open (or create) the database, run migrations, and build the
    /// shared state.
    pub fn open(
        db_path: &Path,
        config: Config,
        compiler: Arc<dyn Compiler>,
        download_tx: mpsc::Sender<i64>,
    ) -> anyhow::Result<Arc<Self>> {
        let conn = db::open_or_create(db_path)?;
        db::migrations::migrate(&conn)?;
        Ok(Arc::new(Self {
            conn: Mutex::new(conn),
            config,
            compiler,
            download_tx,
        }))
    }

    pub async fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn compiler(&self) -> Arc<dyn Compiler> {
        Arc::clone(&self.compiler)
    }

    /// Download queue handle for firing schedule events.
    pub fn queue(&self) -> QueueSender {
        QueueSender(self.download_tx.clone())
    }
}

/// `DownloadQueue` backed by the worker channel. A full queue drops the
/// job with a warning; the record stays `downloading` and the operator
/// can re-fire the URL change.
pub struct QueueSender(mpsc::Sender<i64>);

impl DownloadQueue for QueueSender {
    fn enqueue(&self, conference_id: i64) {
        if let Err(e) = self.0.try_send(conference_id) {
            warn!(conference_id, error = %e, "download queue full, dropping job");
        }
    }
}
