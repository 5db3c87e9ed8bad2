use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use mediahub_data::db::conferences;
use mediahub_data::schedule::{self, ScheduleEvent};

use crate::state::AppState;

/// Spawn the schedule download worker.
///
/// Drains the queue fed by `url_changed` transitions. Each job re-reads
/// the record before fetching, so a duplicate or stale job (URL cleared
/// after enqueue) degrades to a no-op.
pub fn spawn(
    state: Arc<AppState>,
    rx: mpsc::Receiver<i64>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run(state, rx, cancel))
}

async fn run(state: Arc<AppState>, mut rx: mpsc::Receiver<i64>, cancel: CancellationToken) {
    info!("schedule download worker started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("download worker shutting down");
                break;
            }

            job = rx.recv() => {
                match job {
                    Some(conference_id) => process_job(&state, conference_id).await,
                    None => break,
                }
            }
        }
    }
}

/// Fetch one conference's schedule document and mark the download
/// finished. A failed fetch leaves the record in `downloading`; there
/// is no retry layer.
async fn process_job(state: &Arc<AppState>, conference_id: i64) {
    let url = {
        let conn = state.conn().await;
        match conferences::find_by_id(&conn, conference_id) {
            Ok(Some(conference)) => {
                match conference.schedule_url.filter(|u| !u.is_empty()) {
                    Some(url) => url,
                    None => {
                        info!(conference_id, "schedule url cleared, skipping fetch");
                        return;
                    }
                }
            }
            Ok(None) => {
                warn!(conference_id, "conference vanished before download");
                return;
            }
            Err(e) => {
                error!(conference_id, error = %e, "failed to load conference");
                return;
            }
        }
    };

    info!(conference_id, url = %url, "fetching schedule");
    let body = match fetch(&url).await {
        Ok(body) => body,
        Err(e) => {
            error!(conference_id, url = %url, error = %e, "schedule fetch failed");
            return;
        }
    };
    info!(conference_id, bytes = body.len(), "schedule downloaded");

    let conn = state.conn().await;
    match conferences::find_by_id(&conn, conference_id) {
        Ok(Some(mut conference)) => {
            if let Err(e) = schedule::fire(
                &conn,
                &mut conference,
                ScheduleEvent::FinishDownload,
                &state.queue(),
            ) {
                warn!(conference_id, error = %e, "finish_download rejected");
            }
        }
        Ok(None) => warn!(conference_id, "conference vanished after download"),
        Err(e) => error!(conference_id, error = %e, "failed to reload conference"),
    }
}

async fn fetch(url: &str) -> reqwest::Result<String> {
    reqwest::get(url)
        .await?
        .error_for_status()?
        .text()
        .await
}
