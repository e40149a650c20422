//! Boundary with the host game session.
//!
//! The meter never discovers engine objects itself. The host hands it a
//! `CollaboratorLocator` at session start and a `PresentationHost` at
//! construction; everything the meter reads or subscribes to goes through
//! these traits.

pub mod mock;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::kernel::event::{CutInfo, EventSink, NoteData};
use crate::kernel::pending::PendingHitScore;
use crate::kernel::series::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collaborator {
    ScoreSource,
    EnergySource,
    RankSource,
    SessionEndSource,
}

/// Score controller of the running level.
pub trait ScoreSource: Send + Sync {
    fn prev_frame_modified_score(&self) -> i32;
    fn immediate_max_possible_raw_score(&self) -> i32;

    /// Deliver `ActionSucceeded` / `ActionMissed` to `sink` until the session ends.
    fn subscribe(&self, sink: EventSink);

    /// Start the follow-through scoring for a hit. The scorer must call
    /// `pending.finish(..)` once the cut score is final, in hit order.
    fn finalize_cut(&self, note: &NoteData, cut: &CutInfo, pending: PendingHitScore);
}

pub trait EnergySource: Send + Sync {
    /// 0..1
    fn energy(&self) -> f32;
}

pub trait RankSource: Send + Sync {
    fn relative_score(&self) -> f32;
}

/// Gameplay manager that reports level finished / failed.
pub trait SessionEndSource: Send + Sync {
    fn subscribe(&self, sink: EventSink);
}

/// Host-provided lookup of the per-session engine objects.
pub trait CollaboratorLocator {
    fn score_source(&self) -> Option<Arc<dyn ScoreSource>>;
    fn energy_source(&self) -> Option<Arc<dyn EnergySource>>;
    fn rank_source(&self) -> Option<Arc<dyn RankSource>>;
    fn session_end_source(&self) -> Option<Arc<dyn SessionEndSource>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSpec {
    pub name: String,
    pub label: String,
}

impl Default for SurfaceSpec {
    fn default() -> Self {
        Self {
            name: "PerformanceMeter".to_string(),
            label: "Performance".to_string(),
        }
    }
}

/// Graph widget. The meter owns its lifetime, not its rendering.
pub trait PresentationSurface: Send {
    fn show_graph(&mut self, series: &[Sample]);
    fn destroy(&mut self);
}

/// Results screen whose buttons dismiss the graph.
pub trait ResultsView: Send + Sync {
    /// Route continue / restart presses to `sink`.
    fn subscribe_dismissal(&self, sink: EventSink);
}

pub trait PresentationHost: Send + Sync {
    fn create_surface(&self, spec: &SurfaceSpec) -> Box<dyn PresentationSurface>;

    /// May return `None` for a while after results are requested.
    fn find_results_view(&self) -> Option<Arc<dyn ResultsView>>;
}
