pub mod common;
pub mod config;
pub mod directory;
pub mod entity;
mod error;
pub mod fake;
pub mod header;
pub mod steamid;
pub mod types;

pub use common::{
    Bomb, Equipment, EquipmentClass, EquipmentType, GrenadeProjectile, Hostage, HostageState,
    Inferno, InfernoOutline, Player, Team, TeamState, convex_hull,
};
pub use config::CommonConfig;
pub use directory::{Roster, StateDirectory};
pub use entity::{Entity, Property, PropertyPath, PropertyValue, PropertyValueKind};
pub use error::*;
pub use header::DemoHeader;
pub use steamid::*;
pub use strum;
pub use types::{EntityHandle, EntityId, ProtocolVariant, Vector};

#[cfg(feature = "arc")]
pub type Rc<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub type Rc<T> = std::rc::Rc<T>;
