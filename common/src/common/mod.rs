//! Game objects as seen from the current tick of a demo.

mod bomb;
mod equipment;
mod grenade;
mod hostage;
mod inferno;
mod player;
mod team;

pub use bomb::*;
pub use equipment::*;
pub use grenade::*;
pub use hostage::*;
pub use inferno::*;
pub use player::*;
pub use team::*;
