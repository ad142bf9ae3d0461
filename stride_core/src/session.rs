//! Guided session flow.
//!
//! `SessionFlow` owns the session step and a closed transition table:
//! every (step, event) pair is either an explicit transition or an
//! `Error::Transition`. Steps are forward-only, with one exception: the
//! break-day override edge back into the normal flow, which requires an
//! explicit confirmation and fails closed without it.
//!
//! Completion is two-phase so the persistence call can be asynchronous
//! from the flow's point of view: `begin_submit` validates and yields
//! the payload exactly once while raising the saving indicator, and
//! `finish_submit` either lands on `complete` or clears the indicator
//! for a resubmission. Duplicate submissions while a save is in flight
//! are rejected, so the recorder can never be invoked twice for one
//! session.

use crate::config::Config;
use crate::pb::{detect_new_bests, sanitize_time};
use crate::prescription;
use crate::recorder::SessionRecorder;
use crate::types::{
    BodyFeel, Catalog, DrillEntry, NewBest, ReadinessInput, SessionResult, SprintPrescription,
    TimingMethod,
};
use crate::{Error, Result};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

/// Session flow steps, in order of appearance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Checkin,
    BreakDay,
    Focus,
    Drills,
    SprintEfforts,
    LogResults,
    Complete,
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Step::Checkin => "check-in",
            Step::BreakDay => "break day",
            Step::Focus => "focus",
            Step::Drills => "drills",
            Step::SprintEfforts => "sprint efforts",
            Step::LogResults => "log results",
            Step::Complete => "complete",
        }
    }
}

/// Events accepted by the transition table
#[derive(Clone, Debug)]
pub enum SessionEvent {
    CheckinSubmitted {
        input: ReadinessInput,
        forced_break: Option<bool>,
    },
    /// The single backward edge. `confirmed` must be true; anything else
    /// fails closed.
    BreakOverridden { confirmed: bool },
    FocusAcknowledged,
    DrillsFinished,
    SprintsAcknowledged,
}

/// Outcome of the external persistence call, reported back into the flow
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed,
}

/// Everything the UI needs after a completed session
#[derive(Clone, Debug)]
pub struct CompletionSummary {
    pub result: SessionResult,
    pub new_bests: Vec<NewBest>,
}

/// The session state machine
pub struct SessionFlow {
    step: Step,
    session_index: u32,
    config: Config,
    prior_bests: HashMap<String, f64>,

    // Collected over the flow
    input: Option<ReadinessInput>,
    readiness: Option<u8>,
    is_break_day: bool,
    prescriptions: Vec<SprintPrescription>,
    drill_log: Vec<DrillEntry>,
    times: HashMap<String, Vec<f64>>,
    timing_methods: HashMap<String, TimingMethod>,
    body_feel_after: Option<BodyFeel>,
    rpe: Option<u8>,
    notes: Option<String>,

    // Two-phase submission
    saving: bool,
    pending: Option<SessionResult>,
    completion: Option<CompletionSummary>,

    distances: Vec<crate::types::DistanceConfig>,
}

impl SessionFlow {
    /// Start a new flow at check-in
    ///
    /// `session_index` is the number of sessions completed before today;
    /// `prior_bests` is the stored personal-best map, read-only here.
    pub fn new(
        session_index: u32,
        catalog: &Catalog,
        prior_bests: HashMap<String, f64>,
        config: &Config,
    ) -> Self {
        let drill_log = catalog
            .drills
            .iter()
            .map(|d| DrillEntry {
                drill_id: d.id.clone(),
                completed: false,
            })
            .collect();

        Self {
            step: Step::Checkin,
            session_index,
            config: config.clone(),
            prior_bests,
            input: None,
            readiness: None,
            is_break_day: false,
            prescriptions: Vec::new(),
            drill_log,
            times: HashMap::new(),
            timing_methods: HashMap::new(),
            body_feel_after: None,
            rpe: None,
            notes: None,
            saving: false,
            pending: None,
            completion: None,
            distances: catalog.distances.clone(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn readiness_score(&self) -> Option<u8> {
        self.readiness
    }

    pub fn is_break_day(&self) -> bool {
        self.is_break_day
    }

    /// Saving indicator for the UI; while true, all events and
    /// submissions are rejected.
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn prescriptions(&self) -> &[SprintPrescription] {
        &self.prescriptions
    }

    pub fn drill_log(&self) -> &[DrillEntry] {
        &self.drill_log
    }

    pub fn completion(&self) -> Option<&CompletionSummary> {
        self.completion.as_ref()
    }

    /// Apply an event to the transition table
    ///
    /// Returns the new step, or `Error::Transition` for any pair the
    /// table does not define.
    pub fn handle(&mut self, event: SessionEvent) -> Result<Step> {
        if self.saving {
            return Err(Error::Transition(
                "save in flight, no events accepted".into(),
            ));
        }

        let next = match (self.step, event) {
            (Step::Checkin, SessionEvent::CheckinSubmitted { input, forced_break }) => {
                let score = prescription::readiness(&input);
                let break_day =
                    prescription::break_day(score, &input, forced_break, &self.config.readiness);

                self.prescriptions = prescription::sprint_reps(
                    self.session_index,
                    score,
                    &self.distances,
                    &self.config.prescription,
                    &self.config.readiness,
                );
                self.readiness = Some(score);
                self.is_break_day = break_day;
                self.input = Some(input);

                if break_day {
                    Step::BreakDay
                } else {
                    Step::Focus
                }
            }

            (Step::BreakDay, SessionEvent::BreakOverridden { confirmed }) => {
                if !confirmed {
                    return Err(Error::Transition(
                        "break-day override requires explicit confirmation".into(),
                    ));
                }
                tracing::info!("Break day overridden by athlete confirmation");
                self.is_break_day = false;
                Step::Focus
            }

            (Step::Focus, SessionEvent::FocusAcknowledged) => Step::Drills,

            (Step::Drills, SessionEvent::DrillsFinished) => Step::SprintEfforts,

            (Step::SprintEfforts, SessionEvent::SprintsAcknowledged) => Step::LogResults,

            (step, event) => {
                return Err(Error::Transition(format!(
                    "event {:?} not accepted at step '{}'",
                    event,
                    step.label()
                )));
            }
        };

        tracing::debug!("Session step: {} -> {}", self.step.label(), next.label());
        self.step = next;
        Ok(next)
    }

    /// Toggle a drill in the checklist. Non-blocking: drills never gate
    /// the transition out of the drill step.
    pub fn toggle_drill(&mut self, drill_id: &str) -> Result<bool> {
        if self.step != Step::Drills {
            return Err(Error::Transition(format!(
                "drill toggles only accepted at step 'drills', not '{}'",
                self.step.label()
            )));
        }

        let entry = self
            .drill_log
            .iter_mut()
            .find(|d| d.drill_id == drill_id)
            .ok_or_else(|| Error::Validation(format!("unknown drill '{}'", drill_id)))?;

        entry.completed = !entry.completed;
        Ok(entry.completed)
    }

    /// Record a raw time entry for a prescribed distance
    ///
    /// The entry is sanitized: non-numeric or negative input becomes 0.0,
    /// which is kept in the log but excluded from personal-best checks.
    /// Returns the sanitized value.
    pub fn record_time(&mut self, distance_key: &str, raw: &str) -> Result<f64> {
        self.require_logging("time entries")?;

        if !self.prescriptions.iter().any(|p| p.distance_key == distance_key) {
            return Err(Error::Validation(format!(
                "distance '{}' is not part of today's prescription",
                distance_key
            )));
        }

        let seconds = sanitize_time(raw);
        if seconds == 0.0 {
            tracing::warn!(
                "Invalid time entry '{}' for {} normalized to zero",
                raw,
                distance_key
            );
        }

        self.times
            .entry(distance_key.to_string())
            .or_default()
            .push(seconds);
        Ok(seconds)
    }

    pub fn set_timing_method(&mut self, distance_key: &str, method: TimingMethod) -> Result<()> {
        self.require_logging("timing methods")?;
        self.timing_methods.insert(distance_key.to_string(), method);
        Ok(())
    }

    /// Set the post-session RPE, clamped to 1-10
    pub fn set_rpe(&mut self, rpe: u8) -> Result<()> {
        self.require_logging("RPE")?;
        self.rpe = Some(rpe.clamp(1, 10));
        Ok(())
    }

    pub fn set_body_feel_after(&mut self, feel: BodyFeel) -> Result<()> {
        self.require_logging("body feel")?;
        self.body_feel_after = Some(feel);
        Ok(())
    }

    /// Notes may be attached from either completion path
    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<()> {
        if self.saving || !matches!(self.step, Step::LogResults | Step::BreakDay) {
            return Err(Error::Transition(format!(
                "notes not accepted at step '{}'",
                self.step.label()
            )));
        }
        self.notes = Some(notes.into());
        Ok(())
    }

    fn require_logging(&self, what: &str) -> Result<()> {
        if self.step != Step::LogResults || self.saving {
            return Err(Error::Transition(format!(
                "{} only accepted at step 'log results'",
                what
            )));
        }
        Ok(())
    }

    /// Validate inputs and yield the completion payload, raising the
    /// saving indicator
    ///
    /// Allowed from `log_results` (full session: body-feel-after, RPE,
    /// and a time entry per prescribed distance are required) and from
    /// `break_day` (recovery session: nothing further required). A
    /// second call while the save is outstanding is rejected, which is
    /// what keeps the recorder single-shot.
    pub fn begin_submit(&mut self) -> Result<SessionResult> {
        if self.saving {
            return Err(Error::Validation("a save is already in flight".into()));
        }

        match self.step {
            Step::BreakDay => {}
            Step::LogResults => {
                if self.body_feel_after.is_none() {
                    return Err(Error::Validation("body feel after is required".into()));
                }
                if self.rpe.is_none() {
                    return Err(Error::Validation("RPE is required".into()));
                }
                for prescription in &self.prescriptions {
                    if !self.times.contains_key(&prescription.distance_key) {
                        return Err(Error::Validation(format!(
                            "no time recorded for {}",
                            prescription.distance_key
                        )));
                    }
                }
            }
            step => {
                return Err(Error::Transition(format!(
                    "submission not accepted at step '{}'",
                    step.label()
                )));
            }
        }

        let input = self
            .input
            .as_ref()
            .ok_or_else(|| Error::State("check-in missing at submission".into()))?;

        let result = SessionResult {
            id: Uuid::new_v4(),
            performed_at: Utc::now(),
            session_index: self.session_index,
            sleep_rating: input.sleep_rating,
            body_feel_before: input.body_feel,
            body_feel_after: self.body_feel_after,
            pain_areas: input.pain_areas.clone(),
            readiness: self.readiness.unwrap_or(0),
            is_break_day: self.is_break_day,
            drill_log: self.drill_log.clone(),
            times: self.times.clone(),
            timing_methods: self.timing_methods.clone(),
            rpe: self.rpe,
            notes: self.notes.clone(),
        };

        self.saving = true;
        self.pending = Some(result.clone());
        Ok(result)
    }

    /// Report the persistence outcome back into the flow
    ///
    /// `Saved` lands on `complete` and captures the completion summary
    /// (including newly detected personal bests). `Failed` clears the
    /// saving indicator and stays put so the athlete can resubmit.
    pub fn finish_submit(&mut self, outcome: SaveOutcome) -> Result<Step> {
        if !self.saving {
            return Err(Error::State("no save in flight".into()));
        }
        self.saving = false;

        let pending = self
            .pending
            .take()
            .ok_or_else(|| Error::State("save in flight without a payload".into()))?;

        match outcome {
            SaveOutcome::Saved => {
                let new_bests = if pending.is_break_day {
                    Vec::new()
                } else {
                    detect_new_bests(&pending.times, &self.prior_bests)
                };

                self.completion = Some(CompletionSummary {
                    result: pending,
                    new_bests,
                });
                self.step = Step::Complete;
                Ok(Step::Complete)
            }
            SaveOutcome::Failed => {
                tracing::warn!(
                    "Session save failed, staying at '{}' for resubmission",
                    self.step.label()
                );
                Ok(self.step)
            }
        }
    }

    /// Drive both submission phases against a recorder
    pub fn submit(&mut self, recorder: &mut dyn SessionRecorder) -> Result<&CompletionSummary> {
        let payload = self.begin_submit()?;

        match recorder.record(&payload) {
            Ok(()) => {
                self.finish_submit(SaveOutcome::Saved)?;
                self.completion
                    .as_ref()
                    .ok_or_else(|| Error::State("completion summary missing".into()))
            }
            Err(e) => {
                self.finish_submit(SaveOutcome::Failed)?;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::types::PainArea;

    /// Recorder double that counts calls and can be told to fail
    struct StubRecorder {
        calls: usize,
        fail: bool,
        last: Option<SessionResult>,
    }

    impl StubRecorder {
        fn new() -> Self {
            Self {
                calls: 0,
                fail: false,
                last: None,
            }
        }
    }

    impl SessionRecorder for StubRecorder {
        fn record(&mut self, result: &SessionResult) -> Result<()> {
            self.calls += 1;
            self.last = Some(result.clone());
            if self.fail {
                Err(Error::Other("disk full".into()))
            } else {
                Ok(())
            }
        }
    }

    fn good_checkin() -> ReadinessInput {
        ReadinessInput {
            sleep_rating: 5,
            body_feel: BodyFeel::Good,
            pain_areas: vec![],
        }
    }

    fn tired_checkin() -> ReadinessInput {
        ReadinessInput {
            sleep_rating: 1,
            body_feel: BodyFeel::Tight,
            pain_areas: vec![PainArea::Hamstring],
        }
    }

    fn flow_with_bests(bests: &[(&str, f64)]) -> SessionFlow {
        SessionFlow::new(
            5,
            &build_default_catalog(),
            bests.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            &Config::default(),
        )
    }

    fn new_flow() -> SessionFlow {
        flow_with_bests(&[])
    }

    /// Walk a flow from check-in to log_results with required inputs set
    fn advance_to_logging(flow: &mut SessionFlow) {
        flow.handle(SessionEvent::CheckinSubmitted {
            input: good_checkin(),
            forced_break: None,
        })
        .unwrap();
        flow.handle(SessionEvent::FocusAcknowledged).unwrap();
        flow.handle(SessionEvent::DrillsFinished).unwrap();
        flow.handle(SessionEvent::SprintsAcknowledged).unwrap();

        let keys: Vec<String> = flow
            .prescriptions()
            .iter()
            .map(|p| p.distance_key.clone())
            .collect();
        for key in keys {
            flow.record_time(&key, "4.50").unwrap();
        }
        flow.set_body_feel_after(BodyFeel::Okay).unwrap();
        flow.set_rpe(7).unwrap();
    }

    #[test]
    fn test_good_checkin_goes_to_focus() {
        let mut flow = new_flow();
        let next = flow
            .handle(SessionEvent::CheckinSubmitted {
                input: good_checkin(),
                forced_break: None,
            })
            .unwrap();

        assert_eq!(next, Step::Focus);
        assert_eq!(flow.readiness_score(), Some(100));
        assert!(!flow.is_break_day());
        assert!(!flow.prescriptions().is_empty());
    }

    #[test]
    fn test_forced_break_goes_to_break_day() {
        let mut flow = new_flow();
        let next = flow
            .handle(SessionEvent::CheckinSubmitted {
                input: good_checkin(),
                forced_break: Some(true),
            })
            .unwrap();

        assert_eq!(next, Step::BreakDay);
        assert!(flow.is_break_day());
    }

    #[test]
    fn test_low_readiness_forces_break_day() {
        let mut flow = new_flow();
        let next = flow
            .handle(SessionEvent::CheckinSubmitted {
                input: tired_checkin(),
                forced_break: None,
            })
            .unwrap();

        assert_eq!(next, Step::BreakDay);
    }

    #[test]
    fn test_override_requires_confirmation() {
        let mut flow = new_flow();
        flow.handle(SessionEvent::CheckinSubmitted {
            input: good_checkin(),
            forced_break: Some(true),
        })
        .unwrap();

        // Unconfirmed override fails closed
        let err = flow.handle(SessionEvent::BreakOverridden { confirmed: false });
        assert!(matches!(err, Err(Error::Transition(_))));
        assert_eq!(flow.step(), Step::BreakDay);

        // Confirmed override clears the flag and resumes the flow
        let next = flow
            .handle(SessionEvent::BreakOverridden { confirmed: true })
            .unwrap();
        assert_eq!(next, Step::Focus);
        assert!(!flow.is_break_day());
    }

    #[test]
    fn test_override_then_complete_records_full_session() {
        let mut flow = new_flow();
        flow.handle(SessionEvent::CheckinSubmitted {
            input: good_checkin(),
            forced_break: Some(true),
        })
        .unwrap();
        flow.handle(SessionEvent::BreakOverridden { confirmed: true })
            .unwrap();
        flow.handle(SessionEvent::FocusAcknowledged).unwrap();
        flow.handle(SessionEvent::DrillsFinished).unwrap();
        flow.handle(SessionEvent::SprintsAcknowledged).unwrap();

        let keys: Vec<String> = flow
            .prescriptions()
            .iter()
            .map(|p| p.distance_key.clone())
            .collect();
        for key in keys {
            flow.record_time(&key, "5.0").unwrap();
        }
        flow.set_body_feel_after(BodyFeel::Good).unwrap();
        flow.set_rpe(6).unwrap();

        let mut recorder = StubRecorder::new();
        let summary = flow.submit(&mut recorder).unwrap();
        assert!(!summary.result.is_break_day);
    }

    #[test]
    fn test_steps_cannot_be_skipped() {
        let mut flow = new_flow();

        // Straight to drills from check-in is not in the table
        let err = flow.handle(SessionEvent::DrillsFinished);
        assert!(matches!(err, Err(Error::Transition(_))));
        assert_eq!(flow.step(), Step::Checkin);
    }

    #[test]
    fn test_drill_toggle_non_blocking() {
        let mut flow = new_flow();
        flow.handle(SessionEvent::CheckinSubmitted {
            input: good_checkin(),
            forced_break: None,
        })
        .unwrap();
        flow.handle(SessionEvent::FocusAcknowledged).unwrap();

        assert!(flow.toggle_drill("a_skip").unwrap());
        assert!(!flow.toggle_drill("a_skip").unwrap());
        assert!(flow.toggle_drill("no_such_drill").is_err());

        // Proceeding with an incomplete checklist is fine
        let next = flow.handle(SessionEvent::DrillsFinished).unwrap();
        assert_eq!(next, Step::SprintEfforts);
    }

    #[test]
    fn test_missing_inputs_block_submission() {
        let mut flow = new_flow();
        flow.handle(SessionEvent::CheckinSubmitted {
            input: good_checkin(),
            forced_break: None,
        })
        .unwrap();
        flow.handle(SessionEvent::FocusAcknowledged).unwrap();
        flow.handle(SessionEvent::DrillsFinished).unwrap();
        flow.handle(SessionEvent::SprintsAcknowledged).unwrap();

        // No times, feel, or RPE yet
        assert!(matches!(flow.begin_submit(), Err(Error::Validation(_))));
        assert!(!flow.is_saving());
    }

    #[test]
    fn test_duplicate_submission_rejected_while_saving() {
        let mut flow = new_flow();
        advance_to_logging(&mut flow);

        let first = flow.begin_submit();
        assert!(first.is_ok());
        assert!(flow.is_saving());

        // Second attempt while the save is outstanding
        let second = flow.begin_submit();
        assert!(matches!(second, Err(Error::Validation(_))));

        // Events are rejected too
        let event = flow.handle(SessionEvent::SprintsAcknowledged);
        assert!(matches!(event, Err(Error::Transition(_))));
    }

    #[test]
    fn test_submit_calls_recorder_exactly_once() {
        let mut flow = new_flow();
        advance_to_logging(&mut flow);

        let mut recorder = StubRecorder::new();
        flow.submit(&mut recorder).unwrap();

        assert_eq!(recorder.calls, 1);
        assert_eq!(flow.step(), Step::Complete);

        let recorded = recorder.last.as_ref().unwrap();
        assert_eq!(recorded.readiness, 100);
        assert_eq!(recorded.session_index, 5);

        // Completed flows accept nothing further
        assert!(flow.begin_submit().is_err());
        assert_eq!(recorder.calls, 1);
    }

    #[test]
    fn test_failed_save_allows_resubmission() {
        let mut flow = new_flow();
        advance_to_logging(&mut flow);

        let mut recorder = StubRecorder::new();
        recorder.fail = true;

        let err = flow.submit(&mut recorder);
        assert!(err.is_err());
        assert_eq!(flow.step(), Step::LogResults);
        assert!(!flow.is_saving());
        assert!(flow.completion().is_none());

        // Resubmission succeeds once the recorder recovers
        recorder.fail = false;
        flow.submit(&mut recorder).unwrap();
        assert_eq!(flow.step(), Step::Complete);
        assert_eq!(recorder.calls, 2);
    }

    #[test]
    fn test_break_day_completes_as_recovery_session() {
        let mut flow = new_flow();
        flow.handle(SessionEvent::CheckinSubmitted {
            input: tired_checkin(),
            forced_break: None,
        })
        .unwrap();
        assert_eq!(flow.step(), Step::BreakDay);

        flow.set_notes("easy walk and stretching").unwrap();

        let mut recorder = StubRecorder::new();
        let summary = flow.submit(&mut recorder).unwrap();

        assert!(summary.result.is_break_day);
        assert!(summary.new_bests.is_empty());
        assert_eq!(flow.step(), Step::Complete);
    }

    #[test]
    fn test_new_best_detected_at_completion() {
        let mut flow = flow_with_bests(&[("10m", 2.00)]);
        flow.handle(SessionEvent::CheckinSubmitted {
            input: good_checkin(),
            forced_break: None,
        })
        .unwrap();
        flow.handle(SessionEvent::FocusAcknowledged).unwrap();
        flow.handle(SessionEvent::DrillsFinished).unwrap();
        flow.handle(SessionEvent::SprintsAcknowledged).unwrap();

        let keys: Vec<String> = flow
            .prescriptions()
            .iter()
            .map(|p| p.distance_key.clone())
            .collect();
        for key in &keys {
            let raw = if key == "10m" { "1.92" } else { "not yet" };
            flow.record_time(key, raw).unwrap();
        }
        flow.set_body_feel_after(BodyFeel::Good).unwrap();
        flow.set_rpe(8).unwrap();

        let mut recorder = StubRecorder::new();
        let summary = flow.submit(&mut recorder).unwrap();

        assert_eq!(summary.new_bests.len(), 1);
        assert_eq!(summary.new_bests[0].distance_key, "10m");
        assert_eq!(summary.new_bests[0].previous, Some(2.00));
    }

    #[test]
    fn test_invalid_times_are_normalized() {
        let mut flow = new_flow();
        flow.handle(SessionEvent::CheckinSubmitted {
            input: good_checkin(),
            forced_break: None,
        })
        .unwrap();
        flow.handle(SessionEvent::FocusAcknowledged).unwrap();
        flow.handle(SessionEvent::DrillsFinished).unwrap();
        flow.handle(SessionEvent::SprintsAcknowledged).unwrap();

        assert_eq!(flow.record_time("10m", "garbage").unwrap(), 0.0);
        assert_eq!(flow.record_time("10m", "-3.0").unwrap(), 0.0);
        assert_eq!(flow.record_time("10m", "1.95").unwrap(), 1.95);

        // Unprescribed distances are rejected
        assert!(flow.record_time("400m", "55.0").is_err());
    }

    #[test]
    fn test_times_rejected_outside_logging_step() {
        let mut flow = new_flow();
        assert!(flow.record_time("10m", "1.95").is_err());
        assert!(flow.set_rpe(7).is_err());
    }
}
