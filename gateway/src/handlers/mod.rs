pub mod app;
pub mod increment;
pub mod metrics;
