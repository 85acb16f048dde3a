//! CLI command implementations.

mod config;
mod doctor;
mod render;
mod upload;

pub use config::run_config;
pub use doctor::run_doctor;
pub use render::run_render;
pub use upload::run_upload;
