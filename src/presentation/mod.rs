pub mod handoff;
pub mod text;
pub mod wait;

pub use handoff::{HandoffConfig, PresentationHandoff};
