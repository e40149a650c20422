use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use perfmeter::host::mock::{MockResultsView, MockSession};
use perfmeter::kernel::event::MeterEvent;
use perfmeter::kernel::instance::InstanceSlot;
use perfmeter::presentation::text::TerminalHost;
use perfmeter::presentation::HandoffConfig;
use perfmeter::{MeasurementMode, MeterConfig, MeterReactor};

// (hit?, final cut score) for a short scripted level
const PLAY: [(bool, f32); 16] = [
    (true, 110.0),
    (true, 104.0),
    (true, 115.0),
    (false, 0.0),
    (true, 98.0),
    (true, 101.0),
    (true, 92.0),
    (true, 113.0),
    (false, 0.0),
    (false, 0.0),
    (true, 85.0),
    (true, 107.0),
    (true, 112.0),
    (true, 115.0),
    (true, 109.0),
    (true, 100.0),
];

/// Usage: perfmeter [MODE | CONFIG.json]
fn load_config() -> anyhow::Result<MeterConfig> {
    match std::env::args().nth(1) {
        Some(arg) if arg.ends_with(".json") => Ok(MeterConfig::load(&arg)?),
        Some(arg) => {
            let mode: MeasurementMode = arg.parse().map_err(anyhow::Error::msg)?;
            Ok(MeterConfig::with_mode(mode))
        }
        None => Ok(MeterConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config()?;
    info!(mode = %config.mode(), "PerformanceMeter demo starting");

    let host = Arc::new(TerminalHost::new());
    let slot = InstanceSlot::new();
    let mut reactor = MeterReactor::new(&slot, config, host.clone(), HandoffConfig::default())?;

    // === 1. Level start ===
    let session = MockSession::complete();
    if let Err(e) = reactor.bind(&session) {
        warn!("running without telemetry: {}", e);
    }

    // === 2. Play ===
    let mut energy: f32 = 0.5;
    let mut modified = 0;
    let mut max_raw = 0;
    for (hit, cut_score) in PLAY {
        max_raw += 115;
        if hit {
            energy = (energy + 0.01).min(1.0);
            modified += cut_score as i32;
        } else {
            energy = (energy - 0.1).max(0.0);
        }
        session.energy.set(energy);
        session.score.set_scores(modified, max_raw);
        session.rank.set(modified as f32 / max_raw as f32);

        if hit {
            session.score.cut();
            reactor.pump();
            session.score.finish_next(cut_score);
        } else {
            session.score.miss();
        }
        reactor.pump();
    }

    // === 3. Level end + results ===
    session.end.finish();
    reactor.pump();

    let stats = reactor.controller().series().stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);

    reactor.sender().send(MeterEvent::ShowResults)?;
    reactor.pump();

    // The results menu loads a moment after the graph appears.
    let view = MockResultsView::new();
    let publisher = host.clone();
    let published = view.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(250)).await;
        publisher.publish_results_view(published);
    });

    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(600)).await;
        view.press_continue();
        sleep(Duration::from_millis(100)).await;
        stopper.cancel();
    });

    reactor.run(cancel).await;
    info!(state = ?reactor.controller().state(), "session closed");

    Ok(())
}
