use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::wait::wait_for;
use crate::error::MeterError;
use crate::host::{PresentationHost, PresentationSurface, SurfaceSpec};
use crate::kernel::event::EventSink;
use crate::kernel::series::Sample;

#[derive(Debug, Clone)]
pub struct HandoffConfig {
    /// How often to look for the results view.
    pub poll_interval: Duration,
    /// Pause after the results view shows up, before subscribing to it.
    pub settle_delay: Duration,
    pub surface: SurfaceSpec,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            settle_delay: Duration::from_millis(100),
            surface: SurfaceSpec::default(),
        }
    }
}

struct ActiveHandoff {
    surface: Box<dyn PresentationSurface>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Shows the frozen series and waits for the results screen to dismiss it.
pub struct PresentationHandoff {
    host: Arc<dyn PresentationHost>,
    config: HandoffConfig,
    runtime: Option<Handle>,
    active: Option<ActiveHandoff>,
}

impl PresentationHandoff {
    /// Picks up the current tokio runtime, if any, for the results-view wait.
    pub fn new(host: Arc<dyn PresentationHost>, config: HandoffConfig) -> Self {
        Self {
            host,
            config,
            runtime: Handle::try_current().ok(),
            active: None,
        }
    }

    // Captured at construction, else whatever runtime we are called from.
    fn runtime(&self) -> Option<Handle> {
        self.runtime.clone().or_else(|| Handle::try_current().ok())
    }

    /// False when there is no runtime to spawn the results-view wait on.
    pub fn can_begin(&self) -> bool {
        self.runtime().is_some()
    }

    /// Dismissal presses arrive on `sink` as `MeterEvent::Dismissed`.
    /// Fails with `NoRuntime` before touching the host if no runtime is reachable.
    pub fn begin(&mut self, series: &[Sample], sink: EventSink) -> Result<(), MeterError> {
        let runtime = self.runtime().ok_or(MeterError::NoRuntime)?;
        self.teardown();

        let mut surface = self.host.create_surface(&self.config.surface);
        surface.show_graph(series);

        let cancel = CancellationToken::new();
        let task = runtime.spawn(subscribe_when_ready(
            self.host.clone(),
            self.config.clone(),
            sink,
            cancel.clone(),
        ));

        self.active = Some(ActiveHandoff {
            surface,
            cancel,
            task,
        });
        Ok(())
    }

    /// Destroys the surface and stops any wait still in flight.
    /// Returns false if nothing was being presented.
    pub fn teardown(&mut self) -> bool {
        let Some(mut active) = self.active.take() else {
            return false;
        };
        active.cancel.cancel();
        active.surface.destroy();
        drop(active.task);
        true
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// True once the results view has been found and subscribed to.
    pub fn is_subscribed(&self) -> bool {
        self.active
            .as_ref()
            .map(|a| a.task.is_finished() && !a.cancel.is_cancelled())
            .unwrap_or(false)
    }
}

impl Drop for PresentationHandoff {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn subscribe_when_ready(
    host: Arc<dyn PresentationHost>,
    config: HandoffConfig,
    sink: EventSink,
    cancel: CancellationToken,
) {
    let Some(view) = wait_for(|| host.find_results_view(), config.poll_interval, &cancel).await
    else {
        return;
    };

    // Let the results view finish its own setup.
    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(config.settle_delay) => {}
    }

    view.subscribe_dismissal(sink);
    debug!("PerformanceMeter menu created successfully");
}
