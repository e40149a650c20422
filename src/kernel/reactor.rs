use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::controller::RecordingController;
use super::event::MeterEvent;
use super::instance::InstanceSlot;
use super::state::Transition;
use crate::config::MeterConfig;
use crate::error::MeterError;
use crate::host::{CollaboratorLocator, PresentationHost};
use crate::presentation::{HandoffConfig, PresentationHandoff};

pub const TICK_MS: u64 = 20;

/// Host integration layer: owns the controller, its inbox and the
/// presentation handoff, and applies events on a single logical thread.
pub struct MeterReactor {
    receiver: mpsc::UnboundedReceiver<MeterEvent>,
    tx: mpsc::UnboundedSender<MeterEvent>,
    controller: RecordingController,
    handoff: PresentationHandoff,
    config: MeterConfig,
}

impl MeterReactor {
    pub fn new(
        slot: &InstanceSlot,
        config: MeterConfig,
        host: Arc<dyn PresentationHost>,
        handoff_config: HandoffConfig,
    ) -> Result<Self, MeterError> {
        let (tx, receiver) = mpsc::unbounded_channel();
        let controller = RecordingController::create(slot, tx.clone())?;

        Ok(Self {
            receiver,
            tx,
            controller,
            handoff: PresentationHandoff::new(host, handoff_config),
            config,
        })
    }

    /// For host-side triggers such as `MeterEvent::ShowResults`.
    pub fn sender(&self) -> mpsc::UnboundedSender<MeterEvent> {
        self.tx.clone()
    }

    /// Takes effect at the next bind.
    pub fn set_config(&mut self, config: MeterConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Session start. A graph still on screen from the last session is torn down.
    pub fn bind(&mut self, locator: &dyn CollaboratorLocator) -> Result<Uuid, MeterError> {
        if self.handoff.teardown() {
            debug!("previous graph torn down by rebind");
        }
        self.controller.bind(locator, &self.config)
    }

    /// Applies events in delivery order. Must not block.
    pub fn tick_step(&mut self, events: Vec<MeterEvent>) -> Vec<Transition> {
        let mut transitions = Vec::new();

        for event in events {
            match event {
                MeterEvent::ShowResults => {
                    // Checked before the controller gives up its outcome, so a
                    // later ShowResults from inside a runtime can still present.
                    if !self.handoff.can_begin() {
                        error!("{}", MeterError::NoRuntime);
                        continue;
                    }
                    let from = self.controller.state();
                    if let Some(series) = self.controller.begin_presentation() {
                        if let Err(e) = self.handoff.begin(&series, self.controller.sink()) {
                            error!("{}", e);
                        }
                        transitions.push(Transition {
                            from,
                            to: self.controller.state(),
                        });
                    }
                }
                MeterEvent::Dismissed(reason) => {
                    if !self.handoff.teardown() {
                        debug!(?reason, "dismissal ignored, nothing presented");
                        continue;
                    }
                    if let Some(t) = self.controller.dismiss() {
                        transitions.push(t);
                    }
                    debug!(?reason, "graph dismissed");
                }
                other => {
                    if let Some(t) = self.controller.handle(other) {
                        transitions.push(t);
                    }
                }
            }
        }

        transitions
    }

    /// Drains the inbox until it is empty, including events queued while
    /// handling earlier ones.
    pub fn pump(&mut self) -> Vec<Transition> {
        let mut transitions = Vec::new();
        loop {
            let mut events = Vec::new();
            while let Ok(event) = self.receiver.try_recv() {
                events.push(event);
            }
            if events.is_empty() {
                return transitions;
            }
            transitions.extend(self.tick_step(events));
        }
    }

    /// Async driver loop. Runs until `cancel` fires.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!("PerformanceMeter reactor started. Tick: {}ms", TICK_MS);

        let mut cadence = interval(Duration::from_millis(TICK_MS));
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = cadence.tick() => {}
            }
            for t in self.pump() {
                debug!(from = ?t.from, to = ?t.to, "meter transition");
            }
        }

        info!("PerformanceMeter reactor stopped");
    }

    pub fn controller(&self) -> &RecordingController {
        &self.controller
    }

    pub fn handoff(&self) -> &PresentationHandoff {
        &self.handoff
    }
}
