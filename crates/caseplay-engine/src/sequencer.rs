//! The investigation script and the task that plays it.
//!
//! A run resolves its subject up front, then plays a fixed list of beats.
//! Every beat waits for its pause, then commits its effects through
//! [`Session::commit`]. A beat whose commit is refused means a newer run
//! has been issued: the task stops there and reports
//! [`RunOutcome::Superseded`].

use std::sync::Arc;
use std::time::Duration;

use caseplay_core::{
    CaseEvent, EventCategory, ReplayResult, RunStatus, RunToken, SimulatedClock, StepRecord,
    Subject, SubjectId, Zone,
};
use caseplay_events::{EventMetadata, ReplayEvent};
use chrono::NaiveDateTime;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::SequencerConfig;
use crate::session::Session;

const SOURCE: &str = "sequencer";

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The whole script played.
    Completed {
        /// Token of the run.
        token: RunToken,
    },
    /// A newer run was issued before this one finished.
    Superseded {
        /// Token of the run.
        token: RunToken,
        /// Latest token at the time the run stopped.
        by: RunToken,
    },
}

impl RunOutcome {
    /// Whether the run played to the end.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Wait that precedes a beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pause {
    None,
    Step,
    Final,
}

/// One scripted step: an emission plus its side effects.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Beat {
    pub(crate) pause: Pause,
    pub(crate) category: EventCategory,
    pub(crate) message: String,
    pub(crate) step: Option<StepRecord>,
    pub(crate) progress: f64,
    pub(crate) completes: bool,
}

impl Beat {
    fn new(pause: Pause, category: EventCategory, message: impl Into<String>, progress: f64) -> Self {
        Self {
            pause,
            category,
            message: message.into(),
            step: None,
            progress,
            completes: false,
        }
    }

    fn with_step(mut self, label: &str) -> Self {
        self.step = Some(StepRecord::new(label));
        self
    }

    fn completing(mut self) -> Self {
        self.completes = true;
        self
    }
}

/// Build the beats for one subject.
pub(crate) fn script(subject: &Subject, zone: &Zone) -> Vec<Beat> {
    let outcome = if zone.has_outage() {
        Beat::new(
            Pause::Step,
            EventCategory::Result,
            format!(
                "Outage detected — Incident {} ({} affected)",
                zone.incident_id.as_deref().unwrap_or_default(),
                zone.affected
            ),
            1.0,
        )
        .with_step("Network outage detected")
    } else {
        Beat::new(Pause::Step, EventCategory::Result, "No outage detected", 1.0)
    };

    vec![
        Beat::new(
            Pause::None,
            EventCategory::Request,
            format!("Request received for {}", subject.display_name),
            0.10,
        ),
        Beat::new(Pause::Step, EventCategory::System, "Querying CRM", 0.25)
            .with_step("CRM verification"),
        Beat::new(
            Pause::Step,
            EventCategory::Validation,
            format!("Account OK — {} GB remaining", subject.remaining_quota_gb),
            0.45,
        )
        .with_step("Account entitlement check"),
        Beat::new(
            Pause::Step,
            EventCategory::System,
            format!("Checking location vs outage map ({})", zone.area),
            0.65,
        )
        .with_step("Location correlation"),
        outcome,
        Beat::new(Pause::Final, EventCategory::Status, "Case completed", 1.0).completing(),
    ]
}

/// Starts runs against a session.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    config: SequencerConfig,
}

impl Sequencer {
    /// Create a sequencer.
    #[must_use]
    pub fn new(config: SequencerConfig) -> Self {
        Self { config }
    }

    /// Pacing and clock settings.
    #[must_use]
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Start playing the script for `subject` as run `token`.
    ///
    /// The returned task resolves once the run completes or notices it has
    /// been superseded. Dropping the handle detaches the run.
    ///
    /// # Errors
    ///
    /// Returns [`caseplay_core::ReplayError::UnknownSubject`] if the subject
    /// is not in the session's reference data. No state is touched and no
    /// task is spawned.
    pub fn start_run(
        &self,
        session: &Arc<Session>,
        subject: &SubjectId,
        token: RunToken,
    ) -> ReplayResult<JoinHandle<RunOutcome>> {
        let (details, zone) = session.reference().resolve(subject)?;
        let beats = script(details, zone);

        let run = ActiveRun {
            session: Arc::clone(session),
            subject: subject.clone(),
            token,
            clock: self.config.clock(),
            step_delay: self.config.step_delay,
            final_delay: self.config.final_delay,
        };
        Ok(tokio::spawn(run.play(beats)))
    }
}

/// State owned by one running script.
struct ActiveRun {
    session: Arc<Session>,
    subject: SubjectId,
    token: RunToken,
    clock: SimulatedClock,
    step_delay: Duration,
    final_delay: Duration,
}

impl ActiveRun {
    async fn play(mut self, beats: Vec<Beat>) -> RunOutcome {
        if !self.begin() {
            return self.superseded();
        }
        info!(token = %self.token, subject = %self.subject, "Run started");

        for beat in beats {
            match beat.pause {
                Pause::None => {},
                Pause::Step => tokio::time::sleep(self.step_delay).await,
                Pause::Final => tokio::time::sleep(self.final_delay).await,
            }

            if !self.apply(self.clock.now(), beat) {
                return self.superseded();
            }
            self.clock.after_emit();
        }

        info!(token = %self.token, subject = %self.subject, "Run completed");
        RunOutcome::Completed { token: self.token }
    }

    fn begin(&self) -> bool {
        let token = self.token;
        let subject = self.subject.clone();
        self.session.commit(token, |snapshot, bus| {
            snapshot.reset_for(token);
            bus.publish(ReplayEvent::RunStarted {
                metadata: EventMetadata::new(SOURCE),
                token,
                subject,
            });
        })
    }

    fn apply(&self, time: NaiveDateTime, beat: Beat) -> bool {
        let token = self.token;
        let subject = self.subject.clone();
        let event = CaseEvent::new(time, beat.category, beat.message);
        self.session.commit(token, move |snapshot, bus| {
            debug!(token = %token, category = %event.category, "Emitting case event");
            snapshot.events.push(event.clone());
            bus.publish(ReplayEvent::EventEmitted {
                metadata: EventMetadata::new(SOURCE),
                token,
                event,
            });

            if let Some(step) = beat.step {
                snapshot.steps.push(step.clone());
                bus.publish(ReplayEvent::StepCompleted {
                    metadata: EventMetadata::new(SOURCE),
                    token,
                    step,
                });
            }

            if beat.progress > snapshot.run.progress {
                snapshot.run.progress = beat.progress;
                bus.publish(ReplayEvent::ProgressChanged {
                    metadata: EventMetadata::new(SOURCE),
                    token,
                    progress: beat.progress,
                });
            }

            if beat.completes {
                snapshot.run.status = RunStatus::Completed;
                bus.publish(ReplayEvent::RunCompleted {
                    metadata: EventMetadata::new(SOURCE),
                    token,
                    subject,
                });
            }
        })
    }

    fn superseded(&self) -> RunOutcome {
        let by = self.session.current_token();
        debug!(token = %self.token, latest = %by, "Run superseded");
        RunOutcome::Superseded {
            token: self.token,
            by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionSnapshot;
    use caseplay_core::{ClockMode, ReferenceData, ReplayError};
    use caseplay_events::EventBus;

    const JAMES: &str = "+447700900123";
    const SARAH: &str = "+447700900456";

    fn session() -> Arc<Session> {
        let reference = Arc::new(ReferenceData::builtin().unwrap());
        Arc::new(Session::new(reference, SubjectId::new(JAMES), EventBus::new()).unwrap())
    }

    fn categories(snapshot: &SessionSnapshot) -> Vec<EventCategory> {
        snapshot.events.iter().map(|e| e.category).collect()
    }

    #[test]
    fn test_script_for_active_zone() {
        let reference = ReferenceData::builtin().unwrap();
        let (subject, zone) = reference.resolve(&SubjectId::new(JAMES)).unwrap();
        let beats = script(subject, zone);

        assert_eq!(beats.len(), 6);
        assert_eq!(beats.iter().filter(|b| b.step.is_some()).count(), 4);
        assert_eq!(beats[0].message, "Request received for James Walker");
        assert_eq!(beats[2].message, "Account OK — 12.4 GB remaining");
        assert_eq!(
            beats[3].message,
            "Checking location vs outage map (North London)"
        );
        assert_eq!(
            beats[4].message,
            "Outage detected — Incident INC-7712 (186 affected)"
        );
        assert!(beats[5].completes);
        assert_eq!(beats[5].pause, Pause::Final);
    }

    #[test]
    fn test_script_for_quiet_zone() {
        let reference = ReferenceData::builtin().unwrap();
        let (subject, zone) = reference.resolve(&SubjectId::new(SARAH)).unwrap();
        let beats = script(subject, zone);

        assert_eq!(beats.iter().filter(|b| b.step.is_some()).count(), 3);
        assert_eq!(beats[4].message, "No outage detected");
        assert!(beats[4].step.is_none());
    }

    #[test]
    fn test_script_progress_is_monotonic() {
        let reference = ReferenceData::builtin().unwrap();
        let (subject, zone) = reference.resolve(&SubjectId::new(JAMES)).unwrap();
        let progress: Vec<f64> = script(subject, zone).iter().map(|b| b.progress).collect();
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert!((progress.last().unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_plays_whole_script() {
        let session = session();
        let subject = SubjectId::new(JAMES);
        let token = session.issue(&subject).unwrap();

        let outcome = Sequencer::default()
            .start_run(&session, &subject, token)
            .unwrap()
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Completed { token });
        let snapshot = session.snapshot();
        assert_eq!(
            categories(&snapshot),
            vec![
                EventCategory::Request,
                EventCategory::System,
                EventCategory::Validation,
                EventCategory::System,
                EventCategory::Result,
                EventCategory::Status,
            ]
        );
        assert_eq!(snapshot.steps.len(), 4);
        assert_eq!(snapshot.run.status, RunStatus::Completed);
        assert!((snapshot.run.progress - 1.0).abs() < f64::EPSILON);
        assert!(snapshot.is_completed(token));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_takes_scripted_time() {
        let session = session();
        let subject = SubjectId::new(SARAH);
        let token = session.issue(&subject).unwrap();
        let started = tokio::time::Instant::now();

        Sequencer::default()
            .start_run(&session, &subject, token)
            .unwrap()
            .await
            .unwrap();

        // Four step pauses plus the final pause.
        assert_eq!(started.elapsed(), Duration::from_millis(3_300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_clock_advances_once() {
        let session = session();
        let subject = SubjectId::new(JAMES);
        let token = session.issue(&subject).unwrap();

        Sequencer::default()
            .start_run(&session, &subject, token)
            .unwrap()
            .await
            .unwrap();

        let labels: Vec<String> = session
            .snapshot()
            .events
            .iter()
            .map(CaseEvent::clock_label)
            .collect();
        assert_eq!(
            labels,
            vec!["19:16:10", "19:16:11", "19:16:11", "19:16:11", "19:16:11", "19:16:11"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_step_clock_advances_every_emission() {
        let session = session();
        let subject = SubjectId::new(JAMES);
        let token = session.issue(&subject).unwrap();
        let config = SequencerConfig::default().with_clock_mode(ClockMode::PerStep);

        Sequencer::new(config)
            .start_run(&session, &subject, token)
            .unwrap()
            .await
            .unwrap();

        let labels: Vec<String> = session
            .snapshot()
            .events
            .iter()
            .map(CaseEvent::clock_label)
            .collect();
        assert_eq!(
            labels,
            vec!["19:16:10", "19:16:11", "19:16:12", "19:16:13", "19:16:14", "19:16:15"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_run_supersedes_older() {
        let session = session();
        let sequencer = Sequencer::default();
        let james = SubjectId::new(JAMES);
        let sarah = SubjectId::new(SARAH);

        let first = session.issue(&james).unwrap();
        let first_run = sequencer.start_run(&session, &james, first).unwrap();
        tokio::time::sleep(Duration::from_millis(1_000)).await;

        let second = session.issue(&sarah).unwrap();
        let second_run = sequencer.start_run(&session, &sarah, second).unwrap();

        assert_eq!(
            first_run.await.unwrap(),
            RunOutcome::Superseded {
                token: first,
                by: second
            }
        );
        assert!(second_run.await.unwrap().is_completed());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.output_of, second);
        assert_eq!(snapshot.events.len(), 6);
        assert_eq!(
            snapshot.events[0].message,
            "Request received for Sarah Collins"
        );
        assert_eq!(snapshot.steps.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_subject_starts_nothing() {
        let session = session();
        let before = session.snapshot();

        let err = Sequencer::default()
            .start_run(&session, &SubjectId::new("+10000000000"), RunToken(1))
            .unwrap_err();

        assert!(matches!(err, ReplayError::UnknownSubject { .. }));
        assert_eq!(session.snapshot(), before);
    }
}
