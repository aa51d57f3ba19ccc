use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, FromRepr};

use super::Player;
use crate::Rc;
use crate::entity::{Entity, PropertyPath, int_prop};
use crate::types::ProtocolVariant;

static NEXT_UNIQUE_ID: AtomicI64 = AtomicI64::new(1);

const CLIP: PropertyPath = PropertyPath::from_static("m_iClip1");
const AMMO_TYPE: PropertyPath = PropertyPath::from_static("LocalWeaponData.m_iPrimaryAmmoType");
const S1_RESERVE_AMMO: PropertyPath = PropertyPath::from_static("m_iPrimaryReserveAmmoCount");
const S2_RESERVE_AMMO: PropertyPath = PropertyPath::from_static("m_pReserveAmmo.0000");
const ZOOM_LEVEL: PropertyPath = PropertyPath::from_static("m_zoomLevel");

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRepr)]
#[repr(i32)]
pub enum EquipmentClass {
    #[default]
    Unknown = 0,
    Pistols = 1,
    Smg = 2,
    Heavy = 3,
    Rifle = 4,
    Equipment = 5,
    Grenade = 6,
}

/// Weapon or equipment type. The hundreds digit encodes the [`EquipmentClass`].
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, FromRepr,
)]
#[repr(i32)]
pub enum EquipmentType {
    #[default]
    #[strum(serialize = "UNKNOWN")]
    Unknown = 0,

    #[strum(serialize = "P2000")]
    P2000 = 1,
    #[strum(serialize = "Glock-18")]
    Glock = 2,
    #[strum(serialize = "P250")]
    P250 = 3,
    #[strum(serialize = "Desert Eagle")]
    Deagle = 4,
    #[strum(serialize = "Five-SeveN")]
    FiveSeven = 5,
    #[strum(serialize = "Dual Berettas")]
    DualBerettas = 6,
    #[strum(serialize = "Tec-9")]
    Tec9 = 7,
    #[strum(serialize = "CZ75 Auto")]
    Cz75 = 8,
    #[strum(serialize = "USP-S")]
    Usp = 9,
    #[strum(serialize = "R8 Revolver")]
    Revolver = 10,

    #[strum(serialize = "MP7")]
    Mp7 = 101,
    #[strum(serialize = "MP9")]
    Mp9 = 102,
    #[strum(serialize = "PP-Bizon")]
    Bizon = 103,
    #[strum(serialize = "MAC-10")]
    Mac10 = 104,
    #[strum(serialize = "UMP-45")]
    Ump45 = 105,
    #[strum(serialize = "P90")]
    P90 = 106,
    #[strum(serialize = "MP5-SD")]
    Mp5 = 107,

    #[strum(serialize = "Sawed-Off")]
    SawedOff = 201,
    #[strum(serialize = "Nova")]
    Nova = 202,
    #[strum(serialize = "MAG-7")]
    Mag7 = 203,
    #[strum(serialize = "XM1014")]
    Xm1014 = 204,
    #[strum(serialize = "M249")]
    M249 = 205,
    #[strum(serialize = "Negev")]
    Negev = 206,

    #[strum(serialize = "Galil AR")]
    Galil = 301,
    #[strum(serialize = "FAMAS")]
    Famas = 302,
    #[strum(serialize = "AK-47")]
    Ak47 = 303,
    #[strum(serialize = "M4A4")]
    M4A4 = 304,
    #[strum(serialize = "M4A1")]
    M4A1 = 305,
    #[strum(serialize = "SSG 08")]
    Ssg08 = 306,
    #[strum(serialize = "SG 553")]
    Sg553 = 307,
    #[strum(serialize = "AUG")]
    Aug = 308,
    #[strum(serialize = "AWP")]
    Awp = 309,
    #[strum(serialize = "SCAR-20")]
    Scar20 = 310,
    #[strum(serialize = "G3SG1")]
    G3Sg1 = 311,

    #[strum(serialize = "Zeus x27")]
    Zeus = 401,
    #[strum(serialize = "Kevlar Vest")]
    Kevlar = 402,
    #[strum(serialize = "Kevlar + Helmet")]
    Helmet = 403,
    #[strum(serialize = "C4")]
    Bomb = 404,
    #[strum(serialize = "Knife")]
    Knife = 405,
    #[strum(serialize = "Defuse Kit")]
    DefuseKit = 406,
    #[strum(serialize = "World")]
    World = 407,
    #[strum(serialize = "Zone Repulsor")]
    ZoneRepulsor = 408,
    #[strum(serialize = "Shield")]
    Shield = 409,
    #[strum(serialize = "Heavy Assault Suit")]
    HeavyAssaultSuit = 410,
    #[strum(serialize = "Night Vision")]
    NightVision = 411,
    #[strum(serialize = "Medi-Shot")]
    HealthShot = 412,
    #[strum(serialize = "TA Grenade")]
    TacticalAwarenessGrenade = 413,
    #[strum(serialize = "Fists")]
    Fists = 414,
    #[strum(serialize = "Breach Charge")]
    BreachCharge = 415,
    #[strum(serialize = "Tablet")]
    Tablet = 416,
    #[strum(serialize = "Axe")]
    Axe = 417,
    #[strum(serialize = "Hammer")]
    Hammer = 418,
    #[strum(serialize = "Wrench")]
    Wrench = 419,
    #[strum(serialize = "Snowball")]
    Snowball = 420,
    #[strum(serialize = "Bump Mine")]
    BumpMine = 421,

    #[strum(serialize = "Decoy Grenade")]
    Decoy = 501,
    #[strum(serialize = "Molotov")]
    Molotov = 502,
    #[strum(serialize = "Incendiary Grenade")]
    Incendiary = 503,
    #[strum(serialize = "Flashbang")]
    Flash = 504,
    #[strum(serialize = "Smoke Grenade")]
    Smoke = 505,
    #[strum(serialize = "HE Grenade")]
    He = 506,
}

impl EquipmentType {
    pub fn class(self) -> EquipmentClass {
        const CLASS_DENOMINATOR: i32 = 100;
        let class = (self as i32 + CLASS_DENOMINATOR - 1) / CLASS_DENOMINATOR;
        EquipmentClass::from_repr(class).unwrap_or_default()
    }
}

/// Maps a weapon or equipment name (`weapon_ak47`, `hegrenade`,
/// `smokegrenade_projectile`, ...) to its [`EquipmentType`].
pub fn map_equipment(name: &str) -> EquipmentType {
    let lower = name.to_lowercase();
    let name = lower.strip_prefix("weapon_").unwrap_or(&lower);

    if name.contains("knife") || name.contains("bayonet") {
        return EquipmentType::Knife;
    }

    match name {
        "ak47" => EquipmentType::Ak47,
        "aug" => EquipmentType::Aug,
        "awp" => EquipmentType::Awp,
        "bizon" => EquipmentType::Bizon,
        "c4" | "planted_c4" => EquipmentType::Bomb,
        "deagle" => EquipmentType::Deagle,
        "decoy" | "decoygrenade" | "decoyprojectile" | "decoy_projectile" => EquipmentType::Decoy,
        "elite" => EquipmentType::DualBerettas,
        "famas" => EquipmentType::Famas,
        "fiveseven" => EquipmentType::FiveSeven,
        "flashbang" | "flashbang_projectile" => EquipmentType::Flash,
        "g3sg1" => EquipmentType::G3Sg1,
        "galil" | "galilar" => EquipmentType::Galil,
        "glock" => EquipmentType::Glock,
        "hegrenade" | "hegrenade_projectile" => EquipmentType::He,
        "hkp2000" => EquipmentType::P2000,
        "incgrenade" | "incendiarygrenade" => EquipmentType::Incendiary,
        "m249" => EquipmentType::M249,
        "m4a1" => EquipmentType::M4A4,
        "m4a1_silencer" | "m4a1_silencer_off" => EquipmentType::M4A1,
        "mac10" => EquipmentType::Mac10,
        "mag7" => EquipmentType::Mag7,
        "molotov" | "molotovgrenade" | "molotovprojectile" | "molotov_projectile" => {
            EquipmentType::Molotov
        }
        "mp7" => EquipmentType::Mp7,
        "mp5sd" => EquipmentType::Mp5,
        "mp9" => EquipmentType::Mp9,
        "negev" => EquipmentType::Negev,
        "nova" => EquipmentType::Nova,
        "p250" => EquipmentType::P250,
        "p90" => EquipmentType::P90,
        "sawedoff" => EquipmentType::SawedOff,
        "scar20" => EquipmentType::Scar20,
        "sg556" => EquipmentType::Sg553,
        "smokegrenade" | "smokegrenadeprojectile" | "smokegrenade_projectile" => {
            EquipmentType::Smoke
        }
        "ssg08" => EquipmentType::Ssg08,
        "taser" => EquipmentType::Zeus,
        "tec9" => EquipmentType::Tec9,
        "ump45" => EquipmentType::Ump45,
        "xm1014" => EquipmentType::Xm1014,
        "cz75a" => EquipmentType::Cz75,
        "usp" | "usp_silencer" | "usp_silencer_off" => EquipmentType::Usp,
        "world" | "worldspawn" => EquipmentType::World,
        "inferno" => EquipmentType::Incendiary,
        "revolver" => EquipmentType::Revolver,
        "vest" => EquipmentType::Kevlar,
        "vesthelm" => EquipmentType::Helmet,
        "defuser" => EquipmentType::DefuseKit,
        "zone_repulsor" | "zonerepulsor" => EquipmentType::ZoneRepulsor,
        "shield" => EquipmentType::Shield,
        "heavyassaultsuit" => EquipmentType::HeavyAssaultSuit,
        "nvg" | "nightvision" => EquipmentType::NightVision,
        "healthshot" => EquipmentType::HealthShot,
        "tagrenade" | "tagrenade_projectile" => EquipmentType::TacticalAwarenessGrenade,
        "fists" => EquipmentType::Fists,
        "breachcharge" | "breachcharge_projectile" => EquipmentType::BreachCharge,
        "tablet" => EquipmentType::Tablet,
        "axe" => EquipmentType::Axe,
        "hammer" => EquipmentType::Hammer,
        "spanner" | "wrench" => EquipmentType::Wrench,
        "snowball" | "snowballprojectile" => EquipmentType::Snowball,
        "bumpmine" | "bumpmine_projectile" => EquipmentType::BumpMine,
        _ => EquipmentType::Unknown,
    }
}

/// Scope state of a sniper or scoped rifle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, FromRepr)]
#[repr(i32)]
pub enum ZoomLevel {
    #[default]
    None = 0,
    Single = 1,
    Double = 2,
}

/// A weapon or piece of equipment, possibly backed by a live weapon entity.
#[derive(Debug)]
pub struct Equipment {
    pub equipment_type: EquipmentType,
    pub entity: Option<Rc<dyn Entity>>,
    pub owner: Option<Rc<Player>>,
    /// Name the type was mapped from.
    pub original_string: String,
    variant: ProtocolVariant,
    unique_id: i64,
}

impl Equipment {
    pub fn new(equipment_type: EquipmentType, variant: ProtocolVariant) -> Self {
        Self {
            equipment_type,
            entity: None,
            owner: None,
            original_string: String::new(),
            variant,
            unique_id: NEXT_UNIQUE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn from_name(name: &str, variant: ProtocolVariant) -> Self {
        Self {
            original_string: name.to_owned(),
            ..Self::new(map_equipment(name), variant)
        }
    }

    pub fn with_entity(mut self, entity: Rc<dyn Entity>) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn class(&self) -> EquipmentClass {
        self.equipment_type.class()
    }

    pub fn unique_id(&self) -> i64 {
        self.unique_id
    }

    /// Rounds left in the magazine. Grenades always report 1, weapons without
    /// a clip property report -1.
    pub fn ammo_in_magazine(&self) -> i32 {
        if self.class() == EquipmentClass::Grenade {
            return 1;
        }
        let Some(entity) = &self.entity else {
            return 0;
        };
        let Some(clip) = entity.property_value(&CLIP) else {
            return -1;
        };
        match self.variant {
            // Source 1 networks the clip size plus one
            ProtocolVariant::Source1 => clip.int_val() - 1,
            ProtocolVariant::Source2 => clip.int_val(),
        }
    }

    pub fn ammo_type(&self) -> i32 {
        int_prop(self.entity.as_deref(), &AMMO_TYPE)
    }

    pub fn ammo_reserve(&self) -> i32 {
        if self.class() == EquipmentClass::Grenade {
            return 0;
        }
        match self.variant {
            ProtocolVariant::Source1 => int_prop(self.entity.as_deref(), &S1_RESERVE_AMMO),
            ProtocolVariant::Source2 => int_prop(self.entity.as_deref(), &S2_RESERVE_AMMO),
        }
    }

    /// Scope zoom. Weapons without a scope have no `m_zoomLevel` and report `None`.
    pub fn zoom_level(&self) -> ZoomLevel {
        let level = int_prop(self.entity.as_deref(), &ZOOM_LEVEL);
        ZoomLevel::from_repr(level).unwrap_or_default()
    }
}
