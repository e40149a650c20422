use std::sync::{Arc, Mutex};

use crate::host::{PresentationHost, PresentationSurface, ResultsView, SurfaceSpec};
use crate::kernel::series::{compute_stats, Sample};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Renders a series as one line of block characters, 0..1 mapped to bar height.
pub fn sparkline(series: &[Sample]) -> String {
    series
        .iter()
        .map(|s| {
            let clamped = if s.is_finite() { s.clamp(0.0, 1.0) } else { 0.0 };
            let idx = (clamped * (BARS.len() - 1) as f32).round() as usize;
            BARS[idx]
        })
        .collect()
}

/// Terminal stand-in for the in-game graph widget.
#[derive(Debug)]
pub struct TextSurface {
    label: String,
    rendered: Option<String>,
}

impl TextSurface {
    pub fn new(spec: &SurfaceSpec) -> Self {
        Self {
            label: spec.label.clone(),
            rendered: None,
        }
    }

    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }
}

impl PresentationSurface for TextSurface {
    fn show_graph(&mut self, series: &[Sample]) {
        let stats = compute_stats(series);
        let text = format!(
            "{} [{}] n={} min={:.3} max={:.3} mean={:.3}",
            self.label,
            sparkline(series),
            stats.count,
            stats.min,
            stats.max,
            stats.mean
        );
        println!("{}", text);
        self.rendered = Some(text);
    }

    fn destroy(&mut self) {
        self.rendered = None;
    }
}

/// Presentation host for the terminal driver. The results view is published
/// by whoever plays the menu side.
#[derive(Default)]
pub struct TerminalHost {
    results_view: Mutex<Option<Arc<dyn ResultsView>>>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish_results_view(&self, view: Arc<dyn ResultsView>) {
        if let Ok(mut slot) = self.results_view.lock() {
            *slot = Some(view);
        }
    }
}

impl PresentationHost for TerminalHost {
    fn create_surface(&self, spec: &SurfaceSpec) -> Box<dyn PresentationSurface> {
        Box::new(TextSurface::new(spec))
    }

    fn find_results_view(&self) -> Option<Arc<dyn ResultsView>> {
        self.results_view.lock().ok().and_then(|slot| slot.clone())
    }
}
