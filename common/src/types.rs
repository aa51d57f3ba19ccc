use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};

/// Tick-scoped entity identifier. Unique among the entities alive at one tick,
/// but recycled by the decoder as objects are destroyed and created.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub i32);

impl EntityId {
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for EntityId {
    fn from(v: i32) -> Self {
        EntityId(v)
    }
}

impl From<u32> for EntityId {
    fn from(v: u32) -> Self {
        EntityId(v as i32)
    }
}

/// The generation of the network protocol a demo was recorded with.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum ProtocolVariant {
    /// Source 1 (`HL2DEMO`) demos. Per-player aggregates live on the shared
    /// player-resource entity.
    #[default]
    #[strum(serialize = "source1")]
    Source1,
    /// Source 2 (`PBDEMS2`) demos. Players are split into a controller and a pawn.
    #[strum(serialize = "source2")]
    Source2,
}

impl ProtocolVariant {
    pub fn from_is_source2(is_source2: bool) -> Self {
        if is_source2 {
            ProtocolVariant::Source2
        } else {
            ProtocolVariant::Source1
        }
    }

    pub fn is_source2(self) -> bool {
        self == ProtocolVariant::Source2
    }

    /// Bits used for the entity index inside a handle.
    pub const fn max_edict_bits(self) -> u32 {
        match self {
            ProtocolVariant::Source1 => 11,
            ProtocolVariant::Source2 => 14,
        }
    }
}

/// Number of serial number bits stored above the entity index in a handle.
pub const ENTITY_HANDLE_SERIAL_NUMBER_BITS: u32 = 10;

/// Cross-referencing identifier for an entity: an entity index plus a serial
/// number that changes whenever the index slot is reused.
///
/// Handles only mean something relative to the current tick; resolve them
/// through [`crate::StateDirectory`] every time instead of storing the result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityHandle(pub u64);

impl EntityHandle {
    pub fn raw(self) -> u64 {
        self.0
    }

    pub const fn index_mask(variant: ProtocolVariant) -> u64 {
        (1 << variant.max_edict_bits()) - 1
    }

    pub const fn invalid(variant: ProtocolVariant) -> EntityHandle {
        EntityHandle((1 << (variant.max_edict_bits() + ENTITY_HANDLE_SERIAL_NUMBER_BITS)) - 1)
    }

    /// Entity index encoded in the lower bits of the handle.
    pub fn index(self, variant: ProtocolVariant) -> EntityId {
        EntityId((self.0 & Self::index_mask(variant)) as i32)
    }

    pub fn serial(self, variant: ProtocolVariant) -> u32 {
        let serial_mask = (1 << ENTITY_HANDLE_SERIAL_NUMBER_BITS) - 1;
        ((self.0 >> variant.max_edict_bits()) & serial_mask) as u32
    }

    pub fn is_valid(self, variant: ProtocolVariant) -> bool {
        self != Self::invalid(variant)
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for EntityHandle {
    fn from(v: u64) -> Self {
        EntityHandle(v)
    }
}

impl From<i32> for EntityHandle {
    fn from(v: i32) -> Self {
        EntityHandle(v as u32 as u64)
    }
}

/// World-space position or direction in game units.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector { x, y, z }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Vector) -> f64 {
        (self - other).length()
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

impl std::ops::Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}
