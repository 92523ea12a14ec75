//! CLI command implementations.

mod clean;
mod combine;
mod config;
mod doctor;
mod run;

pub use clean::run_clean;
pub use combine::run_combine;
pub use config::run_config;
pub use doctor::run_doctor;
pub use run::run_run;
