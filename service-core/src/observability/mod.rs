pub mod logging;
pub mod metrics;

pub use logging::{LogFormat, init_tracing};
pub use metrics::{install_metrics_recorder, render_metrics};
