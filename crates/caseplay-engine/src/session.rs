//! Shared session state.
//!
//! The session holds the latest issued run token, the selected subject and
//! the output of the run that owns the log. State lives in a
//! [`tokio::sync::watch`] channel so presentation can re-render on every
//! change. Runs mutate it only through [`Session::commit`], which compares
//! the run's token with the latest issued one inside the same
//! `send_if_modified` call that applies the mutation.

use std::sync::Arc;

use caseplay_core::{
    CaseEvent, ReferenceData, ReplayError, ReplayResult, RunState, RunStatus, RunToken,
    StepRecord, SubjectId,
};
use caseplay_events::EventBus;
use tokio::sync::watch;
use tracing::debug;

/// Read-only view of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Latest issued run token.
    pub token: RunToken,
    /// Token of the run whose output `events`, `steps` and `run` hold.
    pub output_of: RunToken,
    /// Currently selected subject.
    pub subject: SubjectId,
    /// Investigation log of the current run.
    pub events: Vec<CaseEvent>,
    /// Completed steps of the current run.
    pub steps: Vec<StepRecord>,
    /// Progress and status of the current run.
    pub run: RunState,
}

impl SessionSnapshot {
    fn idle(subject: SubjectId) -> Self {
        Self {
            token: RunToken::NONE,
            output_of: RunToken::NONE,
            subject,
            events: Vec::new(),
            steps: Vec::new(),
            run: RunState::default(),
        }
    }

    /// Whether the run identified by `token` has finished its script.
    #[must_use]
    pub fn is_completed(&self, token: RunToken) -> bool {
        self.output_of == token && self.run.status == RunStatus::Completed
    }

    /// Clear the run output and mark `token` as its owner.
    pub(crate) fn reset_for(&mut self, token: RunToken) {
        self.output_of = token;
        self.events.clear();
        self.steps.clear();
        self.run = RunState::running();
    }
}

/// Session state shared by the engine, the sequencer and the scheduler.
#[derive(Debug)]
pub struct Session {
    state: watch::Sender<SessionSnapshot>,
    bus: EventBus,
    reference: Arc<ReferenceData>,
}

impl Session {
    /// Create a session with `initial` selected and no run issued.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::UnknownSubject`] if `initial` is not in the
    /// reference data.
    pub fn new(
        reference: Arc<ReferenceData>,
        initial: SubjectId,
        bus: EventBus,
    ) -> ReplayResult<Self> {
        if !reference.contains(&initial) {
            return Err(ReplayError::unknown_subject(initial.as_str()));
        }
        let (state, _) = watch::channel(SessionSnapshot::idle(initial));
        Ok(Self {
            state,
            bus,
            reference,
        })
    }

    /// Reference tables the session resolves subjects against.
    #[must_use]
    pub fn reference(&self) -> &Arc<ReferenceData> {
        &self.reference
    }

    /// Event bus notifications are published on.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Latest issued run token.
    #[must_use]
    pub fn current_token(&self) -> RunToken {
        self.state.borrow().token
    }

    /// Currently selected subject.
    #[must_use]
    pub fn current_subject(&self) -> SubjectId {
        self.state.borrow().subject.clone()
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Issue a new run token and select `subject`.
    ///
    /// Every run started with an older token becomes inert.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::UnknownSubject`] without touching the state if
    /// the subject is not in the reference data.
    pub fn issue(&self, subject: &SubjectId) -> ReplayResult<RunToken> {
        if !self.reference.contains(subject) {
            return Err(ReplayError::unknown_subject(subject.as_str()));
        }

        let mut issued = RunToken::NONE;
        self.state.send_modify(|snapshot| {
            snapshot.token = snapshot.token.next();
            snapshot.subject = subject.clone();
            issued = snapshot.token;
        });
        debug!(token = %issued, subject = %subject, "Issued run token");
        Ok(issued)
    }

    /// Apply `mutation` if `token` is still the latest issued token.
    ///
    /// The comparison and the mutation happen under the channel's write
    /// lock. Returns `false`, leaving the state untouched, for a stale token.
    pub fn commit<F>(&self, token: RunToken, mutation: F) -> bool
    where
        F: FnOnce(&mut SessionSnapshot, &EventBus),
    {
        self.state.send_if_modified(|snapshot| {
            if snapshot.token != token {
                return false;
            }
            mutation(snapshot, &self.bus);
            true
        })
    }
}
