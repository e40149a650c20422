use super::event::{EventSink, HitId, MeterEvent};

/// One-shot completion token for a hit whose cut score isn't final yet.
///
/// Created by the controller on `ActionSucceeded`, handed to the score
/// source, and resolved exactly once: through `finish`, `abandon`, or by
/// being dropped (which counts as abandoned).
#[derive(Debug)]
pub struct PendingHitScore {
    hit: HitId,
    sink: Option<EventSink>,
}

impl PendingHitScore {
    pub fn new(hit: HitId, sink: EventSink) -> Self {
        Self {
            hit,
            sink: Some(sink),
        }
    }

    pub fn hit(&self) -> HitId {
        self.hit
    }

    /// Deliver the final note score including multiplier.
    pub fn finish(mut self, score_with_multiplier: f32) {
        self.resolve(Some(score_with_multiplier));
    }

    /// Scoring ended without a usable value.
    pub fn abandon(mut self) {
        self.resolve(None);
    }

    fn resolve(&mut self, score_with_multiplier: Option<f32>) {
        if let Some(sink) = self.sink.take() {
            sink.send(MeterEvent::HitFinalized {
                hit: self.hit,
                score_with_multiplier,
            });
        }
    }
}

impl Drop for PendingHitScore {
    fn drop(&mut self) {
        self.resolve(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    fn pending(ordinal: u32) -> (PendingHitScore, mpsc::UnboundedReceiver<MeterEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(tx, CancellationToken::new());
        (PendingHitScore::new(HitId { epoch: 1, ordinal }, sink), rx)
    }

    #[test]
    fn finish_fires_once() {
        let (p, mut rx) = pending(0);
        p.finish(92.0);
        match rx.try_recv() {
            Ok(MeterEvent::HitFinalized { hit, score_with_multiplier }) => {
                assert_eq!(hit.ordinal, 0);
                assert_eq!(score_with_multiplier, Some(92.0));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(rx.try_recv().is_err(), "drop after finish must not fire again");
    }

    #[test]
    fn dropping_reports_missing_score() {
        let (p, mut rx) = pending(3);
        drop(p);
        assert!(matches!(
            rx.try_recv(),
            Ok(MeterEvent::HitFinalized { score_with_multiplier: None, .. })
        ));
    }
}
