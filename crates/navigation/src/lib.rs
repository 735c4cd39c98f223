pub mod blend;
pub mod config;
pub mod flight;
pub mod kinetic;
pub mod navigator;
pub mod pose;
pub mod rig;
pub mod viewpoints;

pub use blend::*;
pub use config::*;
pub use flight::*;
pub use kinetic::*;
pub use navigator::*;
pub use pose::*;
pub use rig::*;
pub use viewpoints::*;
