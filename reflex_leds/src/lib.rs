mod config;
mod types;
mod rng;
mod scoring;
mod input;
mod player;
mod timer;
mod state_machine;
mod stats;
mod ai;
mod logging;

#[cfg(feature = "bevy")]
mod plugin;

pub use config::*;
pub use types::*;
pub use rng::*;
pub use scoring::*;
pub use input::*;
pub use player::*;
pub use timer::*;
pub use state_machine::*;
pub use stats::*;
pub use ai::*;
pub use logging::*;

#[cfg(feature = "bevy")]
pub use plugin::*;
