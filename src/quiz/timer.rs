// src/quiz/timer.rs

use std::time::Duration;

use tokio::{
    task::AbortHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

use crate::{quiz::exam::ExamStatus, state::AppState};

/// Handle on the one-second task that drives the exam clock.
///
/// The task feeds `Tick` events into the shared exam session and exits by itself
/// once the exam is no longer running. `stop` (or dropping the handle) tears it
/// down early, e.g. on a manual submission or a reset.
#[derive(Debug, Default)]
pub struct Countdown {
    handle: Option<AbortHandle>,
}

impl Countdown {
    /// Starts ticking against `state`, replacing any previous countdown.
    pub fn start(&mut self, state: AppState) {
        self.stop();
        let task = tokio::spawn(run(state));
        self.handle = Some(task.abort_handle());
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(state: AppState) {
    let period = Duration::from_secs(1);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let mut study = state.study.lock().await;
        if study.exam.status() != ExamStatus::InProgress {
            break;
        }
        if study.exam.tick() {
            // exit on our own; calling stop() from inside would cancel the settle
            if let Err(e) = state.settle_exam(&mut study).await {
                tracing::error!("Failed to settle timed-out exam: {:?}", e);
            }
            break;
        }
    }

    tracing::debug!("Exam countdown stopped");
}
