pub mod config;
pub mod error;
pub mod host;
pub mod kernel;
pub mod presentation;

pub use config::MeterConfig;
pub use error::MeterError;
pub use kernel::controller::RecordingController;
pub use kernel::mode::MeasurementMode;
pub use kernel::reactor::MeterReactor;
