use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Probe until it yields a value, yielding to the runtime between probes.
///
/// Returns `None` only if `cancel` fires first. Can be called again with a
/// fresh token to restart the wait.
pub async fn wait_for<T, F>(mut probe: F, every: Duration, cancel: &CancellationToken) -> Option<T>
where
    F: FnMut() -> Option<T>,
{
    let mut cadence = interval(every);
    cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // first tick completes immediately
    cadence.tick().await;

    loop {
        if cancel.is_cancelled() {
            return None;
        }
        if let Some(found) = probe() {
            return Some(found);
        }
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = cadence.tick() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_once_probe_succeeds() {
        let cancel = CancellationToken::new();
        let mut calls = 0;
        let found = wait_for(
            || {
                calls += 1;
                (calls == 3).then_some(calls)
            },
            Duration::from_millis(1),
            &cancel,
        )
        .await;
        assert_eq!(found, Some(3));
    }

    #[tokio::test]
    async fn cancellation_ends_the_wait() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let found: Option<()> = wait_for(|| None, Duration::from_millis(5), &cancel).await;
        assert!(found.is_none());
    }
}
