//! Single-worker request queue

use super::backend::ChatBackend;
use super::ui_channel::Pending;
use crate::config::CallBudget;
use crate::error::TransportError;
use crate::types::SessionId;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

type Reply<T> = oneshot::Sender<Result<T, TransportError>>;

enum Job {
    Chat { text: String, reply: Reply<String> },
    Ping { reply: Reply<String> },
    Clear { reply: Reply<()> },
}

impl Job {
    fn name(&self) -> &'static str {
        match self {
            Job::Chat { .. } => "chat",
            Job::Ping { .. } => "ping",
            Job::Clear { .. } => "clear",
        }
    }
}

/// Serializes backend exchanges onto one background task.
///
/// At most one exchange is in progress at any time; later requests queue
/// behind it in submission order. The session id is fixed for the lifetime
/// of the dispatcher and attached to every request.
pub struct RequestDispatcher {
    session_id: SessionId,
    runtime: Handle,
    jobs: Option<mpsc::UnboundedSender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl RequestDispatcher {
    pub fn spawn(
        backend: Arc<dyn ChatBackend>,
        chat_budget: CallBudget,
        probe_budget: CallBudget,
        runtime: Handle,
    ) -> Self {
        Self::spawn_with_session(
            backend,
            SessionId::generate(),
            chat_budget,
            probe_budget,
            runtime,
        )
    }

    pub fn spawn_with_session(
        backend: Arc<dyn ChatBackend>,
        session_id: SessionId,
        chat_budget: CallBudget,
        probe_budget: CallBudget,
        runtime: Handle,
    ) -> Self {
        info!("Starting request dispatcher, session {}", session_id);
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let worker = runtime.spawn(run_worker(
            backend,
            session_id.clone(),
            chat_budget,
            probe_budget,
            jobs_rx,
        ));

        Self {
            session_id,
            runtime,
            jobs: Some(jobs_tx),
            worker: Some(worker),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Runtime the worker lives on, for delivering results.
    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    pub fn is_running(&self) -> bool {
        self.jobs.as_ref().map(|tx| !tx.is_closed()).unwrap_or(false)
    }

    pub fn send(&self, text: impl Into<String>) -> Pending<String> {
        let text = text.into();
        self.enqueue(|reply| Job::Chat { text, reply })
    }

    pub fn ping(&self) -> Pending<String> {
        self.enqueue(|reply| Job::Ping { reply })
    }

    pub fn clear_remote(&self) -> Pending<()> {
        self.enqueue(|reply| Job::Clear { reply })
    }

    fn enqueue<T>(&self, make: impl FnOnce(Reply<T>) -> Job) -> Pending<T> {
        let Some(jobs) = &self.jobs else {
            return Pending::failed(TransportError::WorkerGone);
        };

        let (tx, rx) = oneshot::channel();
        let job = make(tx);
        let name = job.name();
        if jobs.send(job).is_err() {
            warn!("Dispatcher worker gone, rejecting {} request", name);
            return Pending::failed(TransportError::WorkerGone);
        }
        Pending::new(rx)
    }

    /// Stop accepting requests. The exchange in progress is not interrupted;
    /// queued requests still drain before the worker exits.
    pub fn shutdown(&mut self) {
        if self.jobs.take().is_some() {
            info!("Request dispatcher shutting down");
        }
        // Detach: the worker ends on its own once the queue is empty.
        self.worker.take();
    }
}

impl Drop for RequestDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_worker(
    backend: Arc<dyn ChatBackend>,
    session_id: SessionId,
    chat_budget: CallBudget,
    probe_budget: CallBudget,
    mut jobs: mpsc::UnboundedReceiver<Job>,
) {
    while let Some(job) = jobs.recv().await {
        debug!("Dispatching {} request", job.name());
        match job {
            Job::Chat { text, reply } => {
                let result = with_budget(chat_budget, backend.send_message(&session_id, &text)).await;
                if let Err(e) = &result {
                    error!("Chat request failed: {}", e);
                }
                let _ = reply.send(result);
            }
            Job::Ping { reply } => {
                let result = with_budget(probe_budget, backend.ping()).await;
                let _ = reply.send(result);
            }
            Job::Clear { reply } => {
                let result = with_budget(probe_budget, backend.clear(&session_id)).await;
                let _ = reply.send(result);
            }
        }
    }
    debug!("Dispatcher worker ended");
}

async fn with_budget<T>(
    budget: CallBudget,
    exchange: impl Future<Output = Result<T, TransportError>>,
) -> Result<T, TransportError> {
    match tokio::time::timeout(budget.total(), exchange).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(budget.total().as_millis() as u64)),
    }
}
