use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

use perfmeter::host::mock::{MockPresentationHost, MockResultsView, MockSession};
use perfmeter::kernel::event::MeterEvent;
use perfmeter::kernel::instance::InstanceSlot;
use perfmeter::kernel::state::MeterState;
use perfmeter::presentation::HandoffConfig;
use perfmeter::{MeasurementMode, MeterConfig, MeterReactor};

fn fast() -> HandoffConfig {
    HandoffConfig {
        poll_interval: Duration::from_millis(5),
        settle_delay: Duration::from_millis(5),
        ..HandoffConfig::default()
    }
}

async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

fn presenting(slot: &InstanceSlot, host: Arc<MockPresentationHost>) -> (MeterReactor, MockSession) {
    let mut reactor =
        MeterReactor::new(slot, MeterConfig::with_mode(MeasurementMode::Energy), host, fast()).unwrap();
    let session = MockSession::complete();
    reactor.bind(&session).unwrap();
    session.end.finish();
    reactor.sender().send(MeterEvent::ShowResults).unwrap();
    reactor.pump();
    assert_eq!(reactor.controller().state(), MeterState::Presenting);
    (reactor, session)
}

#[tokio::test]
async fn test_polls_until_results_view_appears() {
    let slot = InstanceSlot::new();
    let host = MockPresentationHost::new();
    let (mut reactor, _session) = presenting(&slot, host.clone());

    // Keep polling while the menu isn't there yet.
    wait_until(|| host.probes() >= 3).await;
    assert!(!reactor.handoff().is_subscribed());

    let view = MockResultsView::new();
    host.publish_results_view(view.clone());
    wait_until(|| view.subscriber_count() == 1).await;
    wait_until(|| reactor.handoff().is_subscribed()).await;

    let probes = host.probes();
    sleep(Duration::from_millis(30)).await;
    assert_eq!(host.probes(), probes, "polling stops once found");

    view.press_restart();
    reactor.pump();
    assert_eq!(reactor.controller().state(), MeterState::Idle);
    assert_eq!(host.surfaces().destroyed, 1);
}

#[tokio::test]
async fn test_rebind_while_presenting_tears_down_graph() {
    let slot = InstanceSlot::new();
    let host = MockPresentationHost::new();
    let (mut reactor, _old) = presenting(&slot, host.clone());

    let next = MockSession::complete();
    reactor.bind(&next).unwrap();

    assert_eq!(host.surfaces().destroyed, 1);
    assert!(!reactor.handoff().is_active());
    assert_eq!(reactor.controller().state(), MeterState::Bound);

    // The abandoned wait must not subscribe to a menu that shows up later.
    let view = MockResultsView::new();
    host.publish_results_view(view.clone());
    sleep(Duration::from_millis(40)).await;
    assert_eq!(view.subscriber_count(), 0);
}

#[tokio::test]
async fn test_run_loop_drives_full_dismissal() {
    let slot = InstanceSlot::new();
    let host = MockPresentationHost::new();
    let (mut reactor, _session) = presenting(&slot, host.clone());

    let view = MockResultsView::new();
    let publisher = host.clone();
    let published = view.clone();
    let cancel = CancellationToken::new();
    let stopper = cancel.clone();

    tokio::spawn(async move {
        sleep(Duration::from_millis(30)).await;
        publisher.publish_results_view(published.clone());
        wait_until(|| published.subscriber_count() == 1).await;
        published.press_continue();
        sleep(Duration::from_millis(60)).await;
        stopper.cancel();
    });

    reactor.run(cancel).await;

    assert_eq!(reactor.controller().state(), MeterState::Idle);
    assert_eq!(host.surfaces().created, 1);
    assert_eq!(host.surfaces().destroyed, 1);
    assert_eq!(view.subscriber_count(), 1);
}
