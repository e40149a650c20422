use perfmeter::host::mock::{MockPresentationHost, MockSession};
use perfmeter::host::Collaborator;
use perfmeter::kernel::instance::InstanceSlot;
use perfmeter::kernel::state::MeterState;
use perfmeter::presentation::HandoffConfig;
use perfmeter::{MeasurementMode, MeterConfig, MeterError, MeterReactor};

const ALL: [Collaborator; 4] = [
    Collaborator::ScoreSource,
    Collaborator::EnergySource,
    Collaborator::RankSource,
    Collaborator::SessionEndSource,
];

fn reactor(slot: &InstanceSlot, config: MeterConfig) -> MeterReactor {
    MeterReactor::new(slot, config, MockPresentationHost::new(), HandoffConfig::default()).unwrap()
}

#[test]
fn test_binding_is_all_or_nothing() {
    // Every non-empty subset of missing collaborators.
    for mask in 1u8..16 {
        let slot = InstanceSlot::new();
        let mut reactor = reactor(&slot, MeterConfig::with_mode(MeasurementMode::Energy));

        let mut session = MockSession::complete();
        let mut expected = Vec::new();
        for (bit, which) in ALL.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                session = session.without(*which);
                expected.push(*which);
            }
        }

        match reactor.bind(&session) {
            Err(MeterError::BindingIncomplete { missing }) => assert_eq!(missing, expected),
            other => panic!("mask {:04b}: expected BindingIncomplete, got {:?}", mask, other),
        }

        let controller = reactor.controller();
        assert_eq!(controller.state(), MeterState::Idle);
        assert!(!controller.is_bound());
        assert!(controller.series().is_empty(), "no baseline on failed bind");
        assert_eq!(session.score.subscriber_count(), 0);
        assert_eq!(session.end.subscriber_count(), 0);
    }
}

#[test]
fn test_failed_bind_records_nothing() {
    let slot = InstanceSlot::new();
    let mut reactor = reactor(&slot, MeterConfig::with_mode(MeasurementMode::Energy));
    let session = MockSession::complete().without(Collaborator::RankSource);

    assert!(reactor.bind(&session).is_err());
    session.score.cut();
    session.score.miss();
    session.end.finish();
    reactor.pump();

    assert!(reactor.controller().series().is_empty());
    assert!(!reactor.controller().is_presentable());
}

#[test]
fn test_successful_bind_wires_subscriptions() {
    let slot = InstanceSlot::new();
    let mut reactor = reactor(&slot, MeterConfig::with_mode(MeasurementMode::PercentRaw));
    let session = MockSession::complete();

    let id = reactor.bind(&session).unwrap();

    assert_eq!(reactor.controller().session_id(), Some(id));
    assert_eq!(reactor.controller().state(), MeterState::Bound);
    assert_eq!(reactor.controller().mode(), MeasurementMode::PercentRaw);
    assert_eq!(session.score.subscriber_count(), 1);
    assert_eq!(session.end.subscriber_count(), 1);
    assert!(reactor.controller().series().is_empty(), "only energy mode has a baseline");
}

#[test]
fn test_energy_bind_seeds_baseline() {
    let slot = InstanceSlot::new();
    let mut reactor = reactor(&slot, MeterConfig::default());
    reactor.bind(&MockSession::complete()).unwrap();
    assert_eq!(reactor.controller().series().as_slice(), &[0.5]);
}

#[test]
fn test_rebind_is_a_full_reset() {
    let slot = InstanceSlot::new();
    let mut reactor = reactor(&slot, MeterConfig::default());
    let session = MockSession::complete();

    let first = reactor.bind(&session).unwrap();
    session.energy.set(0.9);
    session.score.cut();
    reactor.pump();
    assert_eq!(reactor.controller().series().len(), 2);

    let second = reactor.bind(&session).unwrap();
    assert_ne!(first, second);
    assert_eq!(reactor.controller().series().as_slice(), &[0.5]);

    // The first session's sink is dead, so one cut yields one sample.
    session.score.cut();
    reactor.pump();
    assert_eq!(reactor.controller().series().as_slice(), &[0.5, 0.9]);
}

#[test]
fn test_disabled_config_skips_binding() {
    let slot = InstanceSlot::new();
    let config = MeterConfig {
        enabled: false,
        ..MeterConfig::default()
    };
    let mut reactor = reactor(&slot, config);
    let session = MockSession::complete();

    assert!(matches!(reactor.bind(&session), Err(MeterError::Disabled)));
    assert_eq!(session.score.subscriber_count(), 0);
    assert_eq!(reactor.controller().state(), MeterState::Idle);
}

#[test]
fn test_config_change_applies_at_next_bind() {
    let slot = InstanceSlot::new();
    let mut reactor = reactor(&slot, MeterConfig::default());
    let session = MockSession::complete();
    reactor.bind(&session).unwrap();

    reactor.set_config(MeterConfig::with_mode(MeasurementMode::CutValue));
    assert_eq!(reactor.controller().mode(), MeasurementMode::Energy);

    reactor.bind(&session).unwrap();
    assert_eq!(reactor.controller().mode(), MeasurementMode::CutValue);
    assert!(reactor.controller().series().is_empty());
}

#[test]
fn test_second_controller_is_rejected() {
    let slot = InstanceSlot::new();
    let host = MockPresentationHost::new();
    let mut first = MeterReactor::new(&slot, MeterConfig::default(), host.clone(), HandoffConfig::default()).unwrap();
    first.bind(&MockSession::complete()).unwrap();

    let second = MeterReactor::new(&slot, MeterConfig::default(), host.clone(), HandoffConfig::default());
    assert!(matches!(second, Err(MeterError::DuplicateInstance)));

    // First controller keeps its state.
    assert_eq!(first.controller().state(), MeterState::Bound);
    assert_eq!(first.controller().series().as_slice(), &[0.5]);

    drop(first);
    assert!(!slot.is_claimed());
    assert!(MeterReactor::new(&slot, MeterConfig::default(), host, HandoffConfig::default()).is_ok());
}
