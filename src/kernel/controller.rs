use std::collections::VecDeque;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::average::RunningAverage;
use super::binder::{CollaboratorBinder, CollaboratorSet};
use super::event::{CutInfo, EventSink, HitId, MeterEvent, NoteData};
use super::instance::{InstanceGuard, InstanceSlot};
use super::mode::MeasurementMode;
use super::pending::PendingHitScore;
use super::series::{Sample, SeriesBuffer};
use super::state::{MeterGraph, MeterRequest, MeterState, Transition};
use super::strategy::{self, Outcome};
use crate::config::MeterConfig;
use crate::error::MeterError;
use crate::host::CollaboratorLocator;

/// Records one performance series per session and tracks whether the
/// session ended in a presentable state.
///
/// Lives for the whole process; `bind` and `reset` recycle it between
/// sessions. Only one may exist per `InstanceSlot`.
pub struct RecordingController {
    state: MeterState,
    mode: MeasurementMode,
    collaborators: Option<CollaboratorSet>,
    series: SeriesBuffer,
    average: RunningAverage,
    // true only between level end and presentation
    outcome_ok: bool,

    epoch: u64,
    session_id: Option<Uuid>,
    session: CancellationToken,
    next_ordinal: u32,
    outstanding: VecDeque<HitId>,

    inbox: mpsc::UnboundedSender<MeterEvent>,
    _guard: InstanceGuard,
}

impl RecordingController {
    /// Fails with `DuplicateInstance` while another controller holds `slot`.
    pub fn create(
        slot: &InstanceSlot,
        inbox: mpsc::UnboundedSender<MeterEvent>,
    ) -> Result<Self, MeterError> {
        let guard = slot.claim()?;
        debug!("RecordingController created");

        let session = CancellationToken::new();
        session.cancel();

        Ok(Self {
            state: MeterState::Idle,
            mode: MeasurementMode::default(),
            collaborators: None,
            series: SeriesBuffer::new(),
            average: RunningAverage::new(),
            outcome_ok: false,
            epoch: 0,
            session_id: None,
            session,
            next_ordinal: 0,
            outstanding: VecDeque::new(),
            inbox,
            _guard: guard,
        })
    }

    /// Start-of-session bind. Always discards the previous session first.
    ///
    /// On failure nothing stays subscribed and the controller is `Idle`;
    /// the level simply runs without telemetry.
    pub fn bind(
        &mut self,
        locator: &dyn CollaboratorLocator,
        config: &MeterConfig,
    ) -> Result<Uuid, MeterError> {
        self.reset();

        if !config.enabled {
            info!("PerformanceMeter disabled, not binding");
            return Err(MeterError::Disabled);
        }

        self.epoch += 1;
        self.session = CancellationToken::new();
        let sink = self.sink();

        let set = match CollaboratorBinder::bind(locator, &sink) {
            Ok(set) => set,
            Err(e) => {
                error!("Could not reload PerformanceMeter: {}", e);
                self.session.cancel();
                return Err(e);
            }
        };

        self.mode = config.mode();
        self.collaborators = Some(set);
        if let Some(baseline) = self.mode.baseline() {
            self.series.push(baseline);
        }

        let session_id = Uuid::new_v4();
        self.session_id = Some(session_id);
        self.apply(MeterRequest::Bind);

        debug!(session = %session_id, mode = %self.mode, "PerformanceMeter reloaded successfully");
        Ok(session_id)
    }

    /// Applies a collaborator event. `ShowResults` and `Dismissed` belong
    /// to the presentation side and are ignored here.
    pub fn handle(&mut self, event: MeterEvent) -> Option<Transition> {
        match event {
            MeterEvent::ActionSucceeded { note, cut, .. } => {
                self.on_action_succeeded(&note, &cut);
                None
            }
            MeterEvent::ActionMissed { .. } => {
                self.on_action_missed();
                None
            }
            MeterEvent::HitFinalized {
                hit,
                score_with_multiplier,
            } => {
                self.on_hit_finalized(hit, score_with_multiplier);
                None
            }
            MeterEvent::LevelFinished | MeterEvent::LevelFailed => self.on_level_end(),
            MeterEvent::ShowResults | MeterEvent::Dismissed(_) => None,
        }
    }

    fn on_action_succeeded(&mut self, note: &NoteData, cut: &CutInfo) {
        if !self.state.accepts_actions() {
            debug!(state = ?self.state, "hit ignored");
            return;
        }

        if !self.mode.requires_finalization() {
            self.record(Outcome::Hit { cut_score: None });
            return;
        }

        let Some(score) = self.collaborators.as_ref().map(|c| c.score.clone()) else {
            return;
        };
        let hit = HitId {
            epoch: self.epoch,
            ordinal: self.next_ordinal,
        };
        self.next_ordinal += 1;
        self.outstanding.push_back(hit);
        score.finalize_cut(note, cut, PendingHitScore::new(hit, self.sink()));
    }

    fn on_action_missed(&mut self) {
        if !self.state.accepts_actions() {
            debug!(state = ?self.state, "miss ignored");
            return;
        }
        self.record(Outcome::Miss);
    }

    fn on_hit_finalized(&mut self, hit: HitId, score_with_multiplier: Option<f32>) {
        let Some(pos) = self.outstanding.iter().position(|h| *h == hit) else {
            debug!(?hit, "stale hit finalization dropped");
            return;
        };
        if pos != 0 {
            warn!(?hit, "hit finalized out of order");
        }
        self.outstanding.remove(pos);

        if !self.state.accepts_actions() {
            return;
        }

        match score_with_multiplier {
            Some(score) => self.record(Outcome::Hit {
                cut_score: Some(score),
            }),
            None => warn!("{}", MeterError::MissingScoreOnFinalization(hit)),
        }
    }

    fn on_level_end(&mut self) -> Option<Transition> {
        if self.collaborators.is_none() {
            debug!("level ended without bound collaborators");
            return None;
        }
        let transition = self.apply(MeterRequest::SessionEnded)?;
        self.outcome_ok = true;
        Some(transition)
    }

    fn record(&mut self, outcome: Outcome) {
        let Some(set) = &self.collaborators else {
            return;
        };
        let live = set.readings();

        match strategy::sample(self.mode, outcome, &live, &mut self.average) {
            Ok(Some(sample)) => self.series.push(sample),
            Ok(None) => {}
            Err(e) => error!(
                "{}: PerformanceMeter will not record scores, resulting in a blank graph",
                e
            ),
        }
    }

    /// Moves `Finished -> Presenting` once and returns the frozen series.
    /// Any other time this is a no-op.
    pub fn begin_presentation(&mut self) -> Option<Vec<Sample>> {
        if !self.outcome_ok {
            return None;
        }
        self.apply(MeterRequest::ShowResults)?;
        self.outcome_ok = false;

        debug!(samples = self.series.len(), "Found {} notes", self.series.len());
        Some(self.series.freeze())
    }

    /// Dismissal of the graph. Returns to `Idle` from `Presenting` only.
    pub fn dismiss(&mut self) -> Option<Transition> {
        let to = MeterGraph::transition(self.state, MeterRequest::Dismiss)?;
        let from = self.state;
        self.reset();
        Some(Transition { from, to })
    }

    /// Drops collaborators and all recorded state. Late events from the
    /// old session are discarded by their sinks.
    pub fn reset(&mut self) {
        self.session.cancel();
        self.collaborators = None;
        self.series.clear();
        self.average.reset();
        self.outcome_ok = false;
        self.outstanding.clear();
        self.next_ordinal = 0;
        self.session_id = None;
        self.mode = MeasurementMode::default();
        self.state = MeterState::Idle;
    }

    fn apply(&mut self, request: MeterRequest) -> Option<Transition> {
        let to = MeterGraph::transition(self.state, request)?;
        let from = self.state;
        self.state = to;
        Some(Transition { from, to })
    }

    /// Sink tied to the current session.
    pub fn sink(&self) -> EventSink {
        EventSink::new(self.inbox.clone(), self.session.clone())
    }

    pub fn state(&self) -> MeterState {
        self.state
    }

    pub fn mode(&self) -> MeasurementMode {
        self.mode
    }

    pub fn series(&self) -> &SeriesBuffer {
        &self.series
    }

    pub fn average(&self) -> &RunningAverage {
        &self.average
    }

    pub fn is_presentable(&self) -> bool {
        self.outcome_ok
    }

    pub fn is_bound(&self) -> bool {
        self.collaborators.is_some()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Hits still waiting for their cut score.
    pub fn pending_hits(&self) -> usize {
        self.outstanding.len()
    }
}

impl Drop for RecordingController {
    fn drop(&mut self) {
        self.session.cancel();
    }
}
