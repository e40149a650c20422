use std::fmt;
use std::sync::Arc;

use super::event::EventSink;
use super::strategy::LiveReadings;
use crate::error::MeterError;
use crate::host::{
    Collaborator, CollaboratorLocator, EnergySource, RankSource, ScoreSource, SessionEndSource,
};

/// The four per-session sources. Only ever exists complete.
#[derive(Clone)]
pub struct CollaboratorSet {
    pub score: Arc<dyn ScoreSource>,
    pub energy: Arc<dyn EnergySource>,
    pub rank: Arc<dyn RankSource>,
    pub session_end: Arc<dyn SessionEndSource>,
}

impl fmt::Debug for CollaboratorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollaboratorSet").finish_non_exhaustive()
    }
}

impl CollaboratorSet {
    pub fn readings(&self) -> LiveReadings {
        LiveReadings {
            energy: self.energy.energy(),
            prev_frame_modified_score: self.score.prev_frame_modified_score(),
            immediate_max_possible_raw_score: self.score.immediate_max_possible_raw_score(),
            relative_score: self.rank.relative_score(),
        }
    }
}

pub struct CollaboratorBinder;

impl CollaboratorBinder {
    /// All-or-nothing lookup. Nothing is subscribed unless all four exist.
    pub fn locate(locator: &dyn CollaboratorLocator) -> Result<CollaboratorSet, MeterError> {
        let score = locator.score_source();
        let energy = locator.energy_source();
        let rank = locator.rank_source();
        let session_end = locator.session_end_source();

        match (score, energy, rank, session_end) {
            (Some(score), Some(energy), Some(rank), Some(session_end)) => Ok(CollaboratorSet {
                score,
                energy,
                rank,
                session_end,
            }),
            (score, energy, rank, session_end) => {
                let mut missing = Vec::new();
                if score.is_none() {
                    missing.push(Collaborator::ScoreSource);
                }
                if energy.is_none() {
                    missing.push(Collaborator::EnergySource);
                }
                if rank.is_none() {
                    missing.push(Collaborator::RankSource);
                }
                if session_end.is_none() {
                    missing.push(Collaborator::SessionEndSource);
                }
                // Partial handles are dropped here.
                Err(MeterError::BindingIncomplete { missing })
            }
        }
    }

    /// Locate then subscribe `sink` to hit/miss and finished/failed.
    pub fn bind(
        locator: &dyn CollaboratorLocator,
        sink: &EventSink,
    ) -> Result<CollaboratorSet, MeterError> {
        let set = Self::locate(locator)?;
        set.score.subscribe(sink.clone());
        set.session_end.subscribe(sink.clone());
        Ok(set)
    }
}
