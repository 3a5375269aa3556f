//! The engine: one task that owns run issuance.
//!
//! Manual run requests, subject selection and autoplay ticks all arrive on
//! one `mpsc` channel. The engine task handles them one at a time, so token
//! issuance and run starts are serialized.

use std::sync::Arc;

use caseplay_core::{ReferenceData, ReplayError, ReplayResult, RunToken, SubjectId};
use caseplay_events::{EventBus, EventReceiver};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::autoplay::AutoplayScheduler;
use crate::config::EngineConfig;
use crate::sequencer::Sequencer;
use crate::session::{Session, SessionSnapshot};

/// Requests accepted by the engine task.
#[derive(Debug)]
pub enum RunRequest {
    /// Restart the current subject.
    RunOnce {
        /// Receives the issued token.
        reply: oneshot::Sender<ReplayResult<RunToken>>,
    },
    /// Switch to a subject and start a run for it.
    Select {
        /// Subject to switch to.
        subject: SubjectId,
        /// Receives the issued token.
        reply: oneshot::Sender<ReplayResult<RunToken>>,
    },
    /// Switch to the next subject in round-robin order and start a run.
    Advance,
    /// Enable or disable autoplay.
    SetAutoplay {
        /// Desired state.
        enabled: bool,
        /// Receives whether the state changed.
        reply: oneshot::Sender<bool>,
    },
}

/// Handle to a running engine.
///
/// Dropping the handle closes the request channel, which stops the engine
/// task and the autoplay timer. Runs already in flight play to the end.
#[derive(Debug)]
pub struct Engine {
    requests: mpsc::Sender<RunRequest>,
    session: Arc<Session>,
    task: JoinHandle<()>,
}

impl Engine {
    /// Start an engine with its own event bus.
    ///
    /// Must be called from within a Tokio runtime. No run is started; call
    /// [`Engine::request_run_once`] for the initial run. Autoplay starts if
    /// the configuration enables it.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidReferenceData`] if the reference data
    /// has no subjects, [`ReplayError::UnknownSubject`] if the configured
    /// initial subject does not exist, or [`ReplayError::InvalidConfig`] if
    /// the autoplay period is zero.
    pub fn start(config: EngineConfig, reference: Arc<ReferenceData>) -> ReplayResult<Self> {
        Self::with_bus(config, reference, EventBus::new())
    }

    /// Start an engine publishing on `bus`.
    ///
    /// # Errors
    ///
    /// See [`Engine::start`].
    pub fn with_bus(
        config: EngineConfig,
        reference: Arc<ReferenceData>,
        bus: EventBus,
    ) -> ReplayResult<Self> {
        let initial = match config.initial_subject.clone() {
            Some(subject) => subject,
            None => reference.first_subject().cloned().ok_or_else(|| {
                ReplayError::InvalidReferenceData {
                    entry: "subjects".to_string(),
                    reason: "no subjects defined".to_string(),
                }
            })?,
        };

        let session = Arc::new(Session::new(reference, initial, bus.clone())?);
        let (requests, inbox) = mpsc::channel(config.request_capacity.max(1));

        let mut autoplay =
            AutoplayScheduler::new(config.autoplay.period, requests.downgrade(), bus)?;
        autoplay.set_enabled(config.autoplay.enabled);

        let worker = Worker {
            session: Arc::clone(&session),
            sequencer: Sequencer::new(config.sequencer),
            autoplay,
        };
        let task = tokio::spawn(worker.run(inbox));

        info!(
            subject = %session.current_subject(),
            subjects = session.reference().subject_count(),
            "Engine started"
        );

        Ok(Self {
            requests,
            session,
            task,
        })
    }

    /// Start a new run for the current subject.
    ///
    /// The autoplay timer is not affected.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::EngineStopped`] if the engine task is gone.
    pub async fn request_run_once(&self) -> ReplayResult<RunToken> {
        let (reply, response) = oneshot::channel();
        self.send(RunRequest::RunOnce { reply }).await?;
        response.await.map_err(|_| ReplayError::EngineStopped)?
    }

    /// Select `subject` and start a run for it.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::UnknownSubject`] without changing any state if
    /// the subject does not exist, or [`ReplayError::EngineStopped`] if the
    /// engine task is gone.
    pub async fn select_subject(&self, subject: impl Into<SubjectId>) -> ReplayResult<RunToken> {
        let (reply, response) = oneshot::channel();
        self.send(RunRequest::Select {
            subject: subject.into(),
            reply,
        })
        .await?;
        response.await.map_err(|_| ReplayError::EngineStopped)?
    }

    /// Enable or disable autoplay. Returns whether the state changed.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::EngineStopped`] if the engine task is gone.
    pub async fn set_autoplay_enabled(&self, enabled: bool) -> ReplayResult<bool> {
        let (reply, response) = oneshot::channel();
        self.send(RunRequest::SetAutoplay { enabled, reply })
            .await?;
        response.await.map_err(|_| ReplayError::EngineStopped)
    }

    /// Wait until run `token` completes.
    ///
    /// Returns the final snapshot, or `None` if a newer run superseded it.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::EngineStopped`] if the session is gone.
    pub async fn wait_for_completion(
        &self,
        token: RunToken,
    ) -> ReplayResult<Option<SessionSnapshot>> {
        let mut rx = self.session.watch();
        let snapshot = rx
            .wait_for(|s| s.token != token || s.is_completed(token))
            .await
            .map_err(|_| ReplayError::EngineStopped)?
            .clone();
        Ok((snapshot.token == token).then_some(snapshot))
    }

    /// Receiver that observes every session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.session.watch()
    }

    /// Subscribe to engine notifications.
    #[must_use]
    pub fn events(&self) -> EventReceiver {
        self.session.bus().subscribe()
    }

    /// Copy of the current session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// The shared session.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Stop the engine task and wait for it to exit.
    pub async fn shutdown(self) {
        let Self { requests, task, .. } = self;
        drop(requests);
        if let Err(e) = task.await {
            warn!(error = %e, "Engine task ended abnormally");
        }
    }

    async fn send(&self, request: RunRequest) -> ReplayResult<()> {
        self.requests
            .send(request)
            .await
            .map_err(|_| ReplayError::EngineStopped)
    }
}

/// State owned by the engine task.
struct Worker {
    session: Arc<Session>,
    sequencer: Sequencer,
    autoplay: AutoplayScheduler,
}

impl Worker {
    async fn run(mut self, mut inbox: mpsc::Receiver<RunRequest>) {
        while let Some(request) = inbox.recv().await {
            match request {
                RunRequest::RunOnce { reply } => {
                    let subject = self.session.current_subject();
                    let _ = reply.send(self.start(&subject));
                },
                RunRequest::Select { subject, reply } => {
                    let _ = reply.send(self.start(&subject));
                },
                RunRequest::Advance => {
                    let current = self.session.current_subject();
                    let Some(next) = self.session.reference().next_subject_after(&current).cloned()
                    else {
                        continue;
                    };
                    if let Err(e) = self.start(&next) {
                        warn!(subject = %next, error = %e, "Autoplay could not start a run");
                    }
                },
                RunRequest::SetAutoplay { enabled, reply } => {
                    let _ = reply.send(self.autoplay.set_enabled(enabled));
                },
            }
        }
        debug!("Engine request channel closed");
    }

    fn start(&self, subject: &SubjectId) -> ReplayResult<RunToken> {
        let token = self.session.issue(subject)?;
        // Detached: superseded runs stop on their own at their next beat.
        drop(self.sequencer.start_run(&self.session, subject, token)?);
        Ok(token)
    }
}
