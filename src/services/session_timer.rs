use crate::models::session::{SharedSession, Submission};
use crate::utils::time::{format_remaining, session_duration};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// One-second countdown over a session. Expiry submits the session exactly like a manual submit;
/// whichever happens first wins and the other is a no-op.
pub struct SessionTimer {
    session: SharedSession,
    remaining: watch::Receiver<u64>,
    submissions: mpsc::UnboundedSender<Submission>,
    task: JoinHandle<()>,
}

impl SessionTimer {
    pub async fn start(
        session: SharedSession,
        submissions: mpsc::UnboundedSender<Submission>,
    ) -> Self {
        let total = {
            let guard = session.lock().await;
            session_duration(guard.questions.len()).as_secs()
        };
        let (tx, rx) = watch::channel(total);
        let task = tokio::spawn(countdown(session.clone(), total, tx, submissions.clone()));

        Self {
            session,
            remaining: rx,
            submissions,
            task,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        *self.remaining.borrow()
    }

    pub fn remaining_display(&self) -> String {
        format_remaining(self.remaining_secs())
    }

    /// Submits now. Returns `None` if the session was already finalized.
    pub async fn submit_now(&self) -> Option<Submission> {
        let submission = self.session.lock().await.submit()?;
        self.task.abort();
        tracing::info!(session_id = %submission.session_id, "Session submitted");
        let _ = self.submissions.send(submission.clone());
        Some(submission)
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn countdown(
    session: SharedSession,
    total: u64,
    remaining: watch::Sender<u64>,
    submissions: mpsc::UnboundedSender<Submission>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;

    let mut left = total;
    while left > 0 {
        ticker.tick().await;
        left -= 1;
        let _ = remaining.send(left);
        if session.lock().await.is_submitted() {
            return;
        }
    }

    let submission = session.lock().await.submit();
    if let Some(submission) = submission {
        tracing::info!(session_id = %submission.session_id, "Session time expired, auto-submitting");
        let _ = submissions.send(submission);
    }
}
