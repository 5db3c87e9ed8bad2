pub mod state;
pub mod transitions;

pub use state::ScheduleState;
pub use transitions::{apply, Effect, ScheduleEvent, Transition};

use rusqlite::Connection;
use tracing::{debug, info};

use crate::conference::Conference;
use crate::db;
use crate::error::Result;

/// Sink for download jobs. The server backs this with an mpsc channel
/// drained by the background worker; tests collect the ids.
pub trait DownloadQueue {
    fn enqueue(&self, conference_id: i64);
}

/// Fire an event against a conference and persist every resulting state.
///
/// Follow-up events emitted by a transition (`url_changed` cascades into
/// `start_download`) are applied in order before returning. The
/// `EnqueueDownload` effect is skipped when the record has no schedule
/// URL, so a URL-less conference still ends up `downloading` with
/// nothing queued. Concurrent fires on the same record are not mutually
/// excluded; duplicate enqueues are tolerated by the worker.
pub fn fire(
    conn: &Connection,
    conference: &mut Conference,
    event: ScheduleEvent,
    queue: &dyn DownloadQueue,
) -> Result<ScheduleState> {
    let mut pending = vec![event];

    while let Some(event) = pending.pop() {
        let transition = transitions::apply(conference.schedule_state, event)?;
        db::conferences::update_schedule_state(conn, conference.id, transition.next)?;
        debug!(
            conference_id = conference.id,
            event = %event,
            from = %conference.schedule_state,
            to = %transition.next,
            "schedule transition"
        );
        conference.schedule_state = transition.next;

        for effect in transition.effects {
            match effect {
                Effect::Fire(next_event) => pending.push(next_event),
                Effect::EnqueueDownload => {
                    if conference.has_schedule_url() {
                        queue.enqueue(conference.id);
                        info!(conference_id = conference.id, "schedule download enqueued");
                    } else {
                        debug!(
                            conference_id = conference.id,
                            "no schedule url, skipping download enqueue"
                        );
                    }
                }
            }
        }
    }

    Ok(conference.schedule_state)
}
