//! Scriptable collaborators for tests and the terminal driver.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    Collaborator, CollaboratorLocator, EnergySource, PresentationHost, PresentationSurface,
    RankSource, ResultsView, ScoreSource, SessionEndSource, SurfaceSpec,
};
use crate::kernel::event::{CutInfo, EventSink, NoteData};
use crate::kernel::pending::PendingHitScore;
use crate::kernel::series::Sample;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct ScoreInner {
    prev_frame_modified_score: i32,
    immediate_max_possible_raw_score: i32,
    subscribers: Vec<EventSink>,
    pending: VecDeque<PendingHitScore>,
}

#[derive(Default)]
pub struct MockScoreSource {
    inner: Mutex<ScoreInner>,
}

impl MockScoreSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_scores(&self, prev_frame_modified: i32, immediate_max_raw: i32) {
        let mut inner = lock(&self.inner);
        inner.prev_frame_modified_score = prev_frame_modified;
        inner.immediate_max_possible_raw_score = immediate_max_raw;
    }

    fn sinks(&self) -> Vec<EventSink> {
        lock(&self.inner).subscribers.clone()
    }

    pub fn cut(&self) {
        for sink in self.sinks() {
            sink.action_succeeded(NoteData::default(), CutInfo::default(), 0);
        }
    }

    pub fn miss(&self) {
        for sink in self.sinks() {
            sink.action_missed(NoteData::default(), 0);
        }
    }

    /// Resolve the oldest pending hit. False if none was waiting.
    pub fn finish_next(&self, score_with_multiplier: f32) -> bool {
        let next = lock(&self.inner).pending.pop_front();
        match next {
            Some(pending) => {
                pending.finish(score_with_multiplier);
                true
            }
            None => false,
        }
    }

    pub fn abandon_next(&self) -> bool {
        let next = lock(&self.inner).pending.pop_front();
        match next {
            Some(pending) => {
                pending.abandon();
                true
            }
            None => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.inner).pending.len()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }
}

impl ScoreSource for MockScoreSource {
    fn prev_frame_modified_score(&self) -> i32 {
        lock(&self.inner).prev_frame_modified_score
    }

    fn immediate_max_possible_raw_score(&self) -> i32 {
        lock(&self.inner).immediate_max_possible_raw_score
    }

    fn subscribe(&self, sink: EventSink) {
        lock(&self.inner).subscribers.push(sink);
    }

    fn finalize_cut(&self, _note: &NoteData, _cut: &CutInfo, pending: PendingHitScore) {
        lock(&self.inner).pending.push_back(pending);
    }
}

pub struct MockEnergySource {
    energy: Mutex<f32>,
}

impl MockEnergySource {
    pub fn new(energy: f32) -> Arc<Self> {
        Arc::new(Self {
            energy: Mutex::new(energy),
        })
    }

    pub fn set(&self, energy: f32) {
        *lock(&self.energy) = energy;
    }
}

impl EnergySource for MockEnergySource {
    fn energy(&self) -> f32 {
        *lock(&self.energy)
    }
}

pub struct MockRankSource {
    relative_score: Mutex<f32>,
}

impl MockRankSource {
    pub fn new(relative_score: f32) -> Arc<Self> {
        Arc::new(Self {
            relative_score: Mutex::new(relative_score),
        })
    }

    pub fn set(&self, relative_score: f32) {
        *lock(&self.relative_score) = relative_score;
    }
}

impl RankSource for MockRankSource {
    fn relative_score(&self) -> f32 {
        *lock(&self.relative_score)
    }
}

#[derive(Default)]
pub struct MockSessionEnd {
    subscribers: Mutex<Vec<EventSink>>,
}

impl MockSessionEnd {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn finish(&self) {
        for sink in lock(&self.subscribers).clone() {
            sink.level_finished();
        }
    }

    pub fn fail(&self) {
        for sink in lock(&self.subscribers).clone() {
            sink.level_failed();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }
}

impl SessionEndSource for MockSessionEnd {
    fn subscribe(&self, sink: EventSink) {
        lock(&self.subscribers).push(sink);
    }
}

/// One level's worth of collaborators. Any of them can be hidden from the
/// locator to simulate an engine object that couldn't be found.
pub struct MockSession {
    pub score: Arc<MockScoreSource>,
    pub energy: Arc<MockEnergySource>,
    pub rank: Arc<MockRankSource>,
    pub end: Arc<MockSessionEnd>,
    missing: Vec<Collaborator>,
}

impl MockSession {
    pub fn complete() -> Self {
        Self {
            score: MockScoreSource::new(),
            energy: MockEnergySource::new(0.5),
            rank: MockRankSource::new(1.0),
            end: MockSessionEnd::new(),
            missing: Vec::new(),
        }
    }

    pub fn without(mut self, missing: Collaborator) -> Self {
        if !self.missing.contains(&missing) {
            self.missing.push(missing);
        }
        self
    }

    fn has(&self, which: Collaborator) -> bool {
        !self.missing.contains(&which)
    }
}

impl CollaboratorLocator for MockSession {
    fn score_source(&self) -> Option<Arc<dyn ScoreSource>> {
        self.has(Collaborator::ScoreSource)
            .then(|| self.score.clone() as Arc<dyn ScoreSource>)
    }

    fn energy_source(&self) -> Option<Arc<dyn EnergySource>> {
        self.has(Collaborator::EnergySource)
            .then(|| self.energy.clone() as Arc<dyn EnergySource>)
    }

    fn rank_source(&self) -> Option<Arc<dyn RankSource>> {
        self.has(Collaborator::RankSource)
            .then(|| self.rank.clone() as Arc<dyn RankSource>)
    }

    fn session_end_source(&self) -> Option<Arc<dyn SessionEndSource>> {
        self.has(Collaborator::SessionEndSource)
            .then(|| self.end.clone() as Arc<dyn SessionEndSource>)
    }
}

#[derive(Default)]
pub struct MockResultsView {
    subscribers: Mutex<Vec<EventSink>>,
}

impl MockResultsView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn press_continue(&self) {
        for sink in lock(&self.subscribers).clone() {
            sink.continue_pressed();
        }
    }

    pub fn press_restart(&self) {
        for sink in lock(&self.subscribers).clone() {
            sink.restart_pressed();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }
}

impl ResultsView for MockResultsView {
    fn subscribe_dismissal(&self, sink: EventSink) {
        lock(&self.subscribers).push(sink);
    }
}

/// What the mock host saw of its surfaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceLog {
    pub created: usize,
    pub destroyed: usize,
    pub shown: Vec<Vec<Sample>>,
}

struct MockSurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl PresentationSurface for MockSurface {
    fn show_graph(&mut self, series: &[Sample]) {
        lock(&self.log).shown.push(series.to_vec());
    }

    fn destroy(&mut self) {
        lock(&self.log).destroyed += 1;
    }
}

#[derive(Default)]
pub struct MockPresentationHost {
    results_view: Mutex<Option<Arc<MockResultsView>>>,
    log: Arc<Mutex<SurfaceLog>>,
    probes: Mutex<usize>,
}

impl MockPresentationHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes the results view discoverable, as when the menu finishes loading.
    pub fn publish_results_view(&self, view: Arc<MockResultsView>) {
        *lock(&self.results_view) = Some(view);
    }

    pub fn withdraw_results_view(&self) {
        *lock(&self.results_view) = None;
    }

    pub fn surfaces(&self) -> SurfaceLog {
        lock(&self.log).clone()
    }

    /// Number of `find_results_view` calls so far.
    pub fn probes(&self) -> usize {
        *lock(&self.probes)
    }
}

impl PresentationHost for MockPresentationHost {
    fn create_surface(&self, _spec: &SurfaceSpec) -> Box<dyn PresentationSurface> {
        lock(&self.log).created += 1;
        Box::new(MockSurface {
            log: self.log.clone(),
        })
    }

    fn find_results_view(&self) -> Option<Arc<dyn ResultsView>> {
        *lock(&self.probes) += 1;
        lock(&self.results_view)
            .clone()
            .map(|v| v as Arc<dyn ResultsView>)
    }
}
