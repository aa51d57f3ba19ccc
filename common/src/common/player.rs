use std::collections::BTreeSet;
use std::time::Duration;

use tracing::trace;

use super::{Equipment, Team};
use crate::Rc;
use crate::directory::StateDirectory;
use crate::entity::{
    Entity, PropertyPath, bool_prop, float_prop, handle_prop, i64_prop, int_prop, string_prop,
    vector_prop,
};
use crate::error::{ErrorKind, Result};
use crate::steamid::convert_steam_id64_to_32;
use crate::types::{EntityHandle, EntityId, Vector};

/// Property paths read by [`Player`]. `S1_` paths belong to Source 1 player
/// entities or the player resource, `S2_` paths to Source 2 controllers and pawns.
mod prop {
    use crate::entity::PropertyPath;

    pub const CURRENT_EQUIPMENT_VALUE: PropertyPath =
        PropertyPath::from_static("m_unCurrentEquipmentValue");
    pub const ROUND_START_EQUIPMENT_VALUE: PropertyPath =
        PropertyPath::from_static("m_unRoundStartEquipmentValue");
    pub const FREEZETIME_END_EQUIPMENT_VALUE: PropertyPath =
        PropertyPath::from_static("m_unFreezetimeEndEquipmentValue");

    pub const S1_CASH_SPENT_THIS_ROUND: PropertyPath =
        PropertyPath::from_static("m_iCashSpentThisRound");
    pub const S1_TOTAL_CASH_SPENT: PropertyPath = PropertyPath::from_static("m_iTotalCashSpent");
    pub const S2_CASH_SPENT_THIS_ROUND: PropertyPath =
        PropertyPath::from_static("m_pInGameMoneyServices.m_iCashSpentThisRound");
    pub const S2_TOTAL_CASH_SPENT: PropertyPath =
        PropertyPath::from_static("m_pInGameMoneyServices.m_iTotalCashSpent");

    pub const S1_ACCOUNT: PropertyPath = PropertyPath::from_static("m_iAccount");
    pub const S2_ACCOUNT: PropertyPath =
        PropertyPath::from_static("m_pInGameMoneyServices.m_iAccount");

    pub const S1_HEALTH: PropertyPath = PropertyPath::from_static("m_iHealth");
    pub const S2_HEALTH: PropertyPath = PropertyPath::from_static("m_iPawnHealth");
    pub const S1_ARMOR: PropertyPath = PropertyPath::from_static("m_ArmorValue");
    pub const S2_ARMOR: PropertyPath = PropertyPath::from_static("m_iPawnArmor");
    pub const S1_HAS_DEFUSER: PropertyPath = PropertyPath::from_static("m_bHasDefuser");
    pub const S2_HAS_DEFUSER: PropertyPath = PropertyPath::from_static("m_bPawnHasDefuser");
    pub const S1_HAS_HELMET: PropertyPath = PropertyPath::from_static("m_bHasHelmet");
    pub const S2_HAS_HELMET: PropertyPath = PropertyPath::from_static("m_bPawnHasHelmet");
    pub const S1_LIFE_STATE: PropertyPath = PropertyPath::from_static("m_lifeState");
    pub const S2_PAWN_IS_ALIVE: PropertyPath = PropertyPath::from_static("m_bPawnIsAlive");

    pub const S1_KILLS: PropertyPath = PropertyPath::from_static("m_iKills");
    pub const S1_DEATHS: PropertyPath = PropertyPath::from_static("m_iDeaths");
    pub const S1_ASSISTS: PropertyPath = PropertyPath::from_static("m_iAssists");
    pub const S2_KILLS: PropertyPath =
        PropertyPath::from_static("m_pActionTrackingServices.m_matchStats.m_iKills");
    pub const S2_DEATHS: PropertyPath =
        PropertyPath::from_static("m_pActionTrackingServices.m_matchStats.m_iDeaths");
    pub const S2_ASSISTS: PropertyPath =
        PropertyPath::from_static("m_pActionTrackingServices.m_matchStats.m_iAssists");
    pub const SCORE: PropertyPath = PropertyPath::from_static("m_iScore");
    pub const MVPS: PropertyPath = PropertyPath::from_static("m_iMVPs");
    pub const PING: PropertyPath = PropertyPath::from_static("m_iPing");
    pub const CLAN_TAG: PropertyPath = PropertyPath::from_static("m_szClan");

    pub const FLAGS: PropertyPath = PropertyPath::from_static("m_fFlags");
    pub const IN_BOMB_ZONE: PropertyPath = PropertyPath::from_static("m_bInBombZone");
    pub const IS_SCOPED: PropertyPath = PropertyPath::from_static("m_bIsScoped");
    pub const S1_EYE_ANGLE_PITCH: PropertyPath = PropertyPath::from_static("m_angEyeAngles[0]");
    pub const S1_EYE_ANGLE_YAW: PropertyPath = PropertyPath::from_static("m_angEyeAngles[1]");
    pub const S2_EYE_ANGLES: PropertyPath = PropertyPath::from_static("m_angEyeAngles");
    pub const S1_VELOCITY_X: PropertyPath = PropertyPath::from_static("localdata.m_vecVelocity[0]");
    pub const S1_VELOCITY_Y: PropertyPath = PropertyPath::from_static("localdata.m_vecVelocity[1]");
    pub const S1_VELOCITY_Z: PropertyPath = PropertyPath::from_static("localdata.m_vecVelocity[2]");
    pub const S2_VELOCITY: PropertyPath = PropertyPath::from_static("m_vecAbsVelocity");

    pub const SPOTTED_BY_MASK: PropertyPath = PropertyPath::from_static("m_bSpottedByMask");
    pub const S1_ACTIVE_WEAPON: PropertyPath = PropertyPath::from_static("m_hActiveWeapon");
    pub const S2_ACTIVE_WEAPON: PropertyPath =
        PropertyPath::from_static("m_pWeaponServices.m_hActiveWeapon");
    pub const S2_PLAYER_PAWN: PropertyPath = PropertyPath::from_static("m_hPlayerPawn");
}

/// `m_fFlags` bit set while the player is crouched.
const FL_DUCKING: i32 = 1 << 1;

/// A player as of the decoder's current tick.
///
/// Identity fields are maintained by the decoder. Everything else is read from
/// the backing entity (the player entity in Source 1, the controller in
/// Source 2) each time an accessor is called, so values always match the
/// current tick. A player without a backing entity reports zero values.
pub struct Player {
    pub steam_id64: u64,
    pub user_id: i32,
    pub name: String,
    /// Entity index of the player (Source 1) or controller (Source 2). Also
    /// the slot of this player in the player resource arrays.
    pub entity_id: EntityId,
    pub team: Team,
    pub is_bot: bool,
    pub is_connected: bool,
    pub is_defusing: bool,
    pub is_planting: bool,
    pub is_reloading: bool,
    pub is_unknown: bool,
    /// Flash blindness in seconds, as set by the last flash.
    pub flash_duration: f32,
    /// Tick at which `flash_duration` was last updated.
    pub flash_tick: i32,
    pub last_alive_position: Vector,
    /// Entity ids of the weapons this player owns.
    pub inventory: BTreeSet<EntityId>,
    entity: Option<Rc<dyn Entity>>,
    directory: Rc<dyn StateDirectory>,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("steam_id64", &self.steam_id64)
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .field("entity_id", &self.entity_id)
            .field("team", &self.team)
            .field("is_bot", &self.is_bot)
            .field("is_connected", &self.is_connected)
            .field("entity", &self.entity)
            .finish_non_exhaustive()
    }
}

impl Player {
    pub fn new(directory: Rc<dyn StateDirectory>) -> Player {
        Player {
            steam_id64: 0,
            user_id: 0,
            name: String::new(),
            entity_id: EntityId::default(),
            team: Team::Unassigned,
            is_bot: false,
            is_connected: false,
            is_defusing: false,
            is_planting: false,
            is_reloading: false,
            is_unknown: false,
            flash_duration: 0.0,
            flash_tick: 0,
            last_alive_position: Vector::default(),
            inventory: BTreeSet::new(),
            entity: None,
            directory,
        }
    }

    pub fn with_entity(mut self, entity: Rc<dyn Entity>) -> Player {
        self.set_entity(Some(entity));
        self
    }

    pub fn set_entity(&mut self, entity: Option<Rc<dyn Entity>>) {
        if let Some(entity) = &entity {
            self.entity_id = entity.id();
        }
        self.entity = entity;
    }

    pub fn entity(&self) -> Option<&Rc<dyn Entity>> {
        self.entity.as_ref()
    }

    pub fn directory(&self) -> &Rc<dyn StateDirectory> {
        &self.directory
    }

    fn is_source2(&self) -> bool {
        self.directory.is_source2()
    }

    fn own(&self) -> Option<&dyn Entity> {
        self.entity.as_deref()
    }

    /// Reads `base.NNN` from the player resource, where `NNN` is this player's slot.
    fn resource_prop<T>(
        &self,
        base: &PropertyPath,
        read: fn(Option<&dyn Entity>, &PropertyPath) -> T,
    ) -> T {
        let resource = self.directory.player_resource_entity();
        read(resource.as_deref(), &PropertyPath::indexed(base, self.entity_id.raw()))
    }

    /// The pawn in Source 2, the player entity itself in Source 1.
    fn body(&self) -> Option<Rc<dyn Entity>> {
        if self.is_source2() {
            self.player_pawn_entity()
        } else {
            self.entity.clone()
        }
    }

    /// 32-bit account id derived from the 64-bit Steam ID. Zero for bots.
    pub fn steam_id32(&self) -> u32 {
        if self.steam_id64 == 0 {
            return 0;
        }
        convert_steam_id64_to_32(self.steam_id64)
    }

    /// Handle of the pawn controlled by this player.
    ///
    /// Only Source 2 controllers carry `m_hPlayerPawn`; asking a Source 1 player
    /// is an error rather than a default value.
    pub fn pawn_handle(&self) -> Result<EntityHandle> {
        let Some(entity) = self.own() else {
            return Err(ErrorKind::EntityMissing {
                path: prop::S2_PLAYER_PAWN,
            }
            .into());
        };
        Ok(entity
            .property_value_must(&prop::S2_PLAYER_PAWN)?
            .as_handle()
            .unwrap_or(EntityHandle::invalid(self.directory.protocol_variant())))
    }

    /// The Source 2 pawn entity of this player, if it currently exists.
    pub fn player_pawn_entity(&self) -> Option<Rc<dyn Entity>> {
        if !self.is_source2() {
            return None;
        }
        let handle = self.pawn_handle().ok()?;
        let pawn = self.directory.find_entity_by_handle(handle);
        if pawn.is_none() {
            trace!(player = %self.name, %handle, "pawn handle did not resolve");
        }
        pawn
    }

    pub fn position(&self) -> Vector {
        self.body().map(|e| e.position()).unwrap_or_default()
    }

    pub fn velocity(&self) -> Vector {
        let body = self.body();
        if self.is_source2() {
            return vector_prop(body.as_deref(), &prop::S2_VELOCITY);
        }
        Vector::new(
            float_prop(body.as_deref(), &prop::S1_VELOCITY_X) as f64,
            float_prop(body.as_deref(), &prop::S1_VELOCITY_Y) as f64,
            float_prop(body.as_deref(), &prop::S1_VELOCITY_Z) as f64,
        )
    }

    /// Yaw in degrees.
    pub fn view_direction_x(&self) -> f32 {
        let body = self.body();
        if self.is_source2() {
            return vector_prop(body.as_deref(), &prop::S2_EYE_ANGLES).y as f32;
        }
        float_prop(body.as_deref(), &prop::S1_EYE_ANGLE_YAW)
    }

    /// Pitch in degrees.
    pub fn view_direction_y(&self) -> f32 {
        let body = self.body();
        if self.is_source2() {
            return vector_prop(body.as_deref(), &prop::S2_EYE_ANGLES).x as f32;
        }
        float_prop(body.as_deref(), &prop::S1_EYE_ANGLE_PITCH)
    }

    pub fn equipment_value_current(&self) -> i64 {
        i64_prop(self.own(), &prop::CURRENT_EQUIPMENT_VALUE)
    }

    pub fn equipment_value_round_start(&self) -> i64 {
        i64_prop(self.own(), &prop::ROUND_START_EQUIPMENT_VALUE)
    }

    pub fn equipment_value_freeze_time_end(&self) -> i64 {
        i64_prop(self.own(), &prop::FREEZETIME_END_EQUIPMENT_VALUE)
    }

    pub fn money_spent_this_round(&self) -> i64 {
        if self.is_source2() {
            return i64_prop(self.own(), &prop::S2_CASH_SPENT_THIS_ROUND);
        }
        self.resource_prop(&prop::S1_CASH_SPENT_THIS_ROUND, i64_prop)
    }

    pub fn money_spent_total(&self) -> i64 {
        if self.is_source2() {
            return i64_prop(self.own(), &prop::S2_TOTAL_CASH_SPENT);
        }
        self.resource_prop(&prop::S1_TOTAL_CASH_SPENT, i64_prop)
    }

    pub fn money(&self) -> i32 {
        if self.is_source2() {
            return int_prop(self.own(), &prop::S2_ACCOUNT);
        }
        int_prop(self.own(), &prop::S1_ACCOUNT)
    }

    pub fn health(&self) -> i32 {
        if self.is_source2() {
            return int_prop(self.own(), &prop::S2_HEALTH);
        }
        int_prop(self.own(), &prop::S1_HEALTH)
    }

    pub fn armor(&self) -> i32 {
        if self.is_source2() {
            return int_prop(self.own(), &prop::S2_ARMOR);
        }
        int_prop(self.own(), &prop::S1_ARMOR)
    }

    pub fn has_defuse_kit(&self) -> bool {
        if self.is_source2() {
            return bool_prop(self.own(), &prop::S2_HAS_DEFUSER);
        }
        bool_prop(self.own(), &prop::S1_HAS_DEFUSER)
    }

    pub fn has_helmet(&self) -> bool {
        if self.is_source2() {
            return bool_prop(self.own(), &prop::S2_HAS_HELMET);
        }
        bool_prop(self.own(), &prop::S1_HAS_HELMET)
    }

    pub fn is_alive(&self) -> bool {
        if self.is_source2() {
            return bool_prop(self.own(), &prop::S2_PAWN_IS_ALIVE);
        }
        let Some(entity) = self.own() else {
            return false;
        };
        // m_lifeState 0 == LIFE_ALIVE
        self.health() > 0
            || entity
                .property_value(&prop::S1_LIFE_STATE)
                .is_some_and(|v| v.int_val() == 0)
    }

    pub fn is_in_bomb_zone(&self) -> bool {
        bool_prop(self.body().as_deref(), &prop::IN_BOMB_ZONE)
    }

    pub fn is_scoped(&self) -> bool {
        bool_prop(self.body().as_deref(), &prop::IS_SCOPED)
    }

    pub fn is_ducking(&self) -> bool {
        let body = self.body();
        int_prop(body.as_deref(), &prop::FLAGS) & FL_DUCKING != 0
    }

    pub fn kills(&self) -> i32 {
        if self.is_source2() {
            return int_prop(self.own(), &prop::S2_KILLS);
        }
        self.resource_prop(&prop::S1_KILLS, int_prop)
    }

    pub fn deaths(&self) -> i32 {
        if self.is_source2() {
            return int_prop(self.own(), &prop::S2_DEATHS);
        }
        self.resource_prop(&prop::S1_DEATHS, int_prop)
    }

    pub fn assists(&self) -> i32 {
        if self.is_source2() {
            return int_prop(self.own(), &prop::S2_ASSISTS);
        }
        self.resource_prop(&prop::S1_ASSISTS, int_prop)
    }

    pub fn score(&self) -> i32 {
        if self.is_source2() {
            return int_prop(self.own(), &prop::SCORE);
        }
        self.resource_prop(&prop::SCORE, int_prop)
    }

    pub fn mvps(&self) -> i32 {
        if self.is_source2() {
            return int_prop(self.own(), &prop::MVPS);
        }
        self.resource_prop(&prop::MVPS, int_prop)
    }

    pub fn ping(&self) -> i32 {
        if self.is_source2() {
            return int_prop(self.own(), &prop::PING);
        }
        self.resource_prop(&prop::PING, int_prop)
    }

    pub fn clan_tag(&self) -> String {
        if self.is_source2() {
            return string_prop(self.own(), &prop::CLAN_TAG);
        }
        self.resource_prop(&prop::CLAN_TAG, string_prop)
    }

    pub fn flash_duration_time(&self) -> Duration {
        Duration::try_from_secs_f32(self.flash_duration).unwrap_or_default()
    }

    /// How much longer the player stays blinded by the last flash.
    ///
    /// Without a tick rate (and no fallback configured) the elapsed time cannot
    /// be computed, so the full duration is returned.
    pub fn flash_duration_time_remaining(&self) -> Duration {
        if self.flash_tick == 0 {
            return self.flash_duration_time();
        }

        let tick_rate = match self.directory.tick_rate() {
            rate if rate > 0.0 => rate,
            _ => match self.directory.config().fallback_tick_rate {
                Some(rate) if rate > 0.0 => rate,
                _ => return self.flash_duration_time(),
            },
        };

        let elapsed_ticks = self.directory.ingame_tick() as i64 - self.flash_tick as i64;
        let elapsed_secs = elapsed_ticks as f64 / tick_rate;
        let elapsed = match Duration::try_from_secs_f64(elapsed_secs) {
            Ok(elapsed) => elapsed,
            Err(_) if elapsed_secs > 0.0 => Duration::MAX,
            Err(_) => Duration::ZERO,
        };
        self.flash_duration_time().saturating_sub(elapsed)
    }

    pub fn is_blinded(&self) -> bool {
        !self.flash_duration_time_remaining().is_zero()
    }

    /// Whether `other` currently has this player in sight, according to the
    /// spotted-by bitmask (one bit per client slot, 32 per array element).
    pub fn is_spotted_by(&self, other: &Player) -> bool {
        let slot = other.entity_id.raw() - 1;
        if slot < 0 {
            return false;
        }
        let (bucket, bit) = (slot / 32, slot % 32);

        let (entity, path) = if self.is_source2() {
            (
                self.player_pawn_entity(),
                PropertyPath::indexed_wide(&prop::SPOTTED_BY_MASK, bucket),
            )
        } else {
            (
                self.entity.clone(),
                PropertyPath::indexed(&prop::SPOTTED_BY_MASK, bucket),
            )
        };

        entity
            .and_then(|e| e.property_value(&path))
            .is_some_and(|mask| mask.u64_val() & (1 << bit) != 0)
    }

    pub fn active_weapon(&self) -> Option<Rc<Equipment>> {
        let variant = self.directory.protocol_variant();
        let handle = if self.is_source2() {
            let pawn = self.player_pawn_entity();
            handle_prop(pawn.as_deref(), &prop::S2_ACTIVE_WEAPON)?
        } else {
            handle_prop(self.own(), &prop::S1_ACTIVE_WEAPON)?
        };
        if !handle.is_valid(variant) {
            return None;
        }
        self.directory.find_weapon_by_entity_id(handle.index(variant))
    }

    /// Weapons currently owned, in entity id order. Ids that no longer resolve are skipped.
    pub fn weapons(&self) -> Vec<Rc<Equipment>> {
        self.inventory
            .iter()
            .filter_map(|id| self.directory.find_weapon_by_entity_id(*id))
            .collect()
    }
}
