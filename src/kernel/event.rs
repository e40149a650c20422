use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Identifies one hit awaiting its finalized cut score.
/// `epoch` is the bind generation the hit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitId {
    pub epoch: u64,
    pub ordinal: u32,
}

/// Note the player acted on. Opaque to the meter, forwarded to the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NoteData {
    pub time: f32,
    pub line_index: u8,
    pub line_layer: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CutInfo {
    pub speed: f32,
    pub direction_ok: bool,
    pub cut_distance_to_center: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DismissReason {
    Continue,
    Restart,
}

#[derive(Debug, Clone)]
pub enum MeterEvent {
    ActionSucceeded {
        note: NoteData,
        cut: CutInfo,
        score: i32,
    },
    ActionMissed {
        note: NoteData,
        score: i32,
    },
    /// Deferred result of a `PendingHitScore`. `None` means the scorer went
    /// away without delivering a value.
    HitFinalized {
        hit: HitId,
        score_with_multiplier: Option<f32>,
    },
    LevelFinished,
    LevelFailed,
    /// Host asks for the results graph.
    ShowResults,
    Dismissed(DismissReason),
}

/// Handle given to collaborators when the meter subscribes to them.
///
/// Tied to one session: once the session token is cancelled every call is a
/// silent no-op, so a collaborator from an old session can't feed the next.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<MeterEvent>,
    session: CancellationToken,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<MeterEvent>, session: CancellationToken) -> Self {
        Self { tx, session }
    }

    pub fn is_closed(&self) -> bool {
        self.session.is_cancelled() || self.tx.is_closed()
    }

    /// Returns false if the event was dropped.
    pub fn send(&self, event: MeterEvent) -> bool {
        if self.session.is_cancelled() {
            return false;
        }
        self.tx.send(event).is_ok()
    }

    pub fn action_succeeded(&self, note: NoteData, cut: CutInfo, score: i32) -> bool {
        self.send(MeterEvent::ActionSucceeded { note, cut, score })
    }

    pub fn action_missed(&self, note: NoteData, score: i32) -> bool {
        self.send(MeterEvent::ActionMissed { note, score })
    }

    pub fn level_finished(&self) -> bool {
        self.send(MeterEvent::LevelFinished)
    }

    pub fn level_failed(&self) -> bool {
        self.send(MeterEvent::LevelFailed)
    }

    pub fn continue_pressed(&self) -> bool {
        self.send(MeterEvent::Dismissed(DismissReason::Continue))
    }

    pub fn restart_pressed(&self) -> bool {
        self.send(MeterEvent::Dismissed(DismissReason::Restart))
    }
}
