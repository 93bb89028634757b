//! Background streaming worker
//!
//! Each session runs on its own named thread that owns the socket. The control
//! side keeps a [`SessionHandle`]: it can cancel, read the published state and
//! progress, receive [`SessionEvent`]s over a channel, and join for the
//! [`SessionSummary`]. [`Streamer`] allows only one session at a time.

use super::session::{ProtocolClient, SessionOptions, SessionOutcome};
use super::tcp::TcpTransport;
use super::{CancellationToken, ConnectionParams, ErrorKind, LineTransport, SessionListener};
use chrono::{DateTime, Utc};
use plotstream_core::{thread_safe, CommandList, ConnectionState, Error, Result, ThreadSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

/// Notification published by a running session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Connection state changed
    StateChanged(ConnectionState),
    /// Data commands acknowledged so far
    Progress {
        /// Acknowledged count
        sent: usize,
        /// Total to send
        total: usize,
    },
    /// Status text
    Message(String),
    /// A failure ended the session or kept it from starting
    Error {
        /// Failure category
        kind: ErrorKind,
        /// Display text of the error
        detail: String,
    },
}

/// Progress counters shared with the control thread
#[derive(Debug, Default)]
pub struct SessionProgress {
    sent: AtomicUsize,
    total: AtomicUsize,
}

impl SessionProgress {
    fn new(total: usize) -> Self {
        Self {
            sent: AtomicUsize::new(0),
            total: AtomicUsize::new(total),
        }
    }

    /// Acknowledged data commands
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }

    /// Data commands in the program
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Completion as a percentage
    pub fn percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.sent() as f64 / total as f64 * 100.0
        }
    }
}

/// Record of one finished session
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// Session identifier, also used in log messages
    pub id: Uuid,
    /// Device address
    pub address: String,
    /// When the worker started connecting
    pub started_at: DateTime<Utc>,
    /// When reset and close were done
    pub finished_at: DateTime<Utc>,
    /// Commands in the program
    pub total: usize,
    /// How the session ended
    pub outcome: SessionOutcome,
}

impl SessionSummary {
    /// Wall-clock length of the session
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Listener forwarding to the channel and the shared state
struct EventPublisher {
    id: Uuid,
    events: UnboundedSender<SessionEvent>,
    state: ThreadSafe<ConnectionState>,
    progress: Arc<SessionProgress>,
}

impl EventPublisher {
    fn publish(&self, event: SessionEvent) {
        // The receiver may already be gone; the session still runs to its end
        let _ = self.events.send(event);
    }
}

impl SessionListener for EventPublisher {
    fn on_state_changed(&self, state: ConnectionState) {
        {
            let mut current = self.state.lock();
            if !current.can_transition_to(state) {
                tracing::warn!(
                    "[{}] Unexpected state change {} -> {}",
                    self.id,
                    *current,
                    state
                );
            }
            *current = state;
        }
        tracing::debug!("[{}] {}", self.id, state);
        self.publish(SessionEvent::StateChanged(state));
    }

    fn on_progress(&self, sent: usize, total: usize) {
        self.progress.sent.store(sent, Ordering::Relaxed);
        self.progress.total.store(total, Ordering::Relaxed);
        self.publish(SessionEvent::Progress { sent, total });
    }

    fn on_message(&self, message: &str) {
        self.publish(SessionEvent::Message(message.to_string()));
    }

    fn on_error(&self, kind: ErrorKind, detail: &str) {
        self.publish(SessionEvent::Error {
            kind,
            detail: detail.to_string(),
        });
    }
}

/// Control-side view of a running session
pub struct SessionHandle {
    id: Uuid,
    cancel: CancellationToken,
    state: ThreadSafe<ConnectionState>,
    progress: Arc<SessionProgress>,
    events: UnboundedReceiver<SessionEvent>,
    thread: Option<JoinHandle<Result<SessionSummary>>>,
}

impl SessionHandle {
    /// Session identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Token that stops the session at the next command boundary
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        tracing::info!("[{}] Cancellation requested", self.id);
        self.cancel.cancel();
    }

    /// Latest published connection state
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Shared progress counters
    pub fn progress(&self) -> &SessionProgress {
        &self.progress
    }

    /// Event receiver, for `recv().await` or `try_recv()`
    pub fn events_mut(&mut self) -> &mut UnboundedReceiver<SessionEvent> {
        &mut self.events
    }

    /// Whether the worker thread has exited
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Wait for the worker and return its result
    pub fn join(mut self) -> Result<SessionSummary> {
        let thread = self
            .thread
            .take()
            .ok_or_else(|| Error::other("Session already joined"))?;
        thread
            .join()
            .map_err(|_| Error::other("Streaming worker panicked"))?
    }
}

/// Start a session on a new worker thread
///
/// Connection failures are reported as [`SessionEvent::Error`] and returned
/// from [`SessionHandle::join`]; they never surface on the calling thread.
pub fn start_streaming(
    params: ConnectionParams,
    commands: Arc<CommandList>,
    options: SessionOptions,
) -> Result<SessionHandle> {
    spawn_session(params, commands, options, None)
}

fn spawn_session(
    params: ConnectionParams,
    commands: Arc<CommandList>,
    options: SessionOptions,
    busy: Option<BusyGuard>,
) -> Result<SessionHandle> {
    let id = Uuid::new_v4();
    let cancel = CancellationToken::new();
    let state = thread_safe(ConnectionState::Disconnected);
    let progress = Arc::new(SessionProgress::new(commands.len()));
    let (tx, rx) = mpsc::unbounded_channel();

    let publisher = EventPublisher {
        id,
        events: tx,
        state: state.clone(),
        progress: progress.clone(),
    };
    let worker_cancel = cancel.clone();

    let thread = thread::Builder::new()
        .name(format!("plotstream-session-{}", id.simple()))
        .spawn(move || {
            let _busy = busy;
            run_session(id, &params, &commands, options, &worker_cancel, &publisher)
        })?;

    Ok(SessionHandle {
        id,
        cancel,
        state,
        progress,
        events: rx,
        thread: Some(thread),
    })
}

/// Connect, stream, and summarize one session on the current thread
pub fn run_session(
    id: Uuid,
    params: &ConnectionParams,
    commands: &CommandList,
    options: SessionOptions,
    cancel: &CancellationToken,
    listener: &dyn SessionListener,
) -> Result<SessionSummary> {
    let started_at = Utc::now();
    tracing::info!("[{}] Starting session with {}", id, params);
    listener.on_state_changed(ConnectionState::Connecting);
    listener.on_message(&format!("Connecting to {}", params));

    let mut transport = match TcpTransport::connect(params) {
        Ok(transport) => transport,
        Err(e) => {
            listener.on_error(ErrorKind::from(&e), &e.to_string());
            listener.on_state_changed(ConnectionState::Disconnected);
            return Err(e.into());
        }
    };

    let outcome = if cancel.is_cancelled() {
        tracing::info!("[{}] Cancelled while connecting, closing", id);
        if let Err(e) = transport.close() {
            tracing::warn!("[{}] Failed to close connection: {}", id, e);
        }
        listener.on_message("Cancelled");
        listener.on_state_changed(ConnectionState::Disconnected);
        SessionOutcome::Cancelled { sent: 0 }
    } else {
        ProtocolClient::new(transport).stream(commands, options, cancel, listener)?
    };

    let summary = SessionSummary {
        id,
        address: params.address(),
        started_at,
        finished_at: Utc::now(),
        total: commands.len(),
        outcome,
    };
    tracing::info!(
        "[{}] Session ended after {}ms: {:?}",
        id,
        summary.duration().num_milliseconds(),
        summary.outcome
    );
    Ok(summary)
}

/// Clears the busy flag when the worker exits, however it exits
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Starts sessions, one at a time
#[derive(Debug, Clone, Default)]
pub struct Streamer {
    busy: Arc<AtomicBool>,
}

impl Streamer {
    /// Create an idle streamer
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session is running
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Start a session unless one is already running
    pub fn start(
        &self,
        params: ConnectionParams,
        commands: Arc<CommandList>,
        options: SessionOptions,
    ) -> Result<SessionHandle> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::SessionActive);
        }
        let guard = BusyGuard(self.busy.clone());
        spawn_session(params, commands, options, Some(guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        let progress = SessionProgress::new(4);
        assert_eq!(progress.percent(), 0.0);
        progress.sent.store(1, Ordering::Relaxed);
        assert_eq!(progress.percent(), 25.0);
        assert_eq!(SessionProgress::new(0).percent(), 0.0);
    }

    #[test]
    fn test_busy_guard_clears_flag() {
        let flag = Arc::new(AtomicBool::new(true));
        drop(BusyGuard(flag.clone()));
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_publisher_updates_shared_state() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let publisher = EventPublisher {
            id: Uuid::new_v4(),
            events: tx,
            state: thread_safe(ConnectionState::Disconnected),
            progress: Arc::new(SessionProgress::new(2)),
        };

        publisher.on_state_changed(ConnectionState::Connecting);
        publisher.on_progress(1, 2);
        assert_eq!(*publisher.state.lock(), ConnectionState::Connecting);
        assert_eq!(publisher.progress.sent(), 1);
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::StateChanged(ConnectionState::Connecting)
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Progress { sent: 1, total: 2 }
        );
    }
}
