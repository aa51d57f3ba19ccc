use crate::Rc;
use crate::common::{Equipment, Player, Team};
use crate::config::CommonConfig;
use crate::entity::Entity;
use crate::types::{EntityHandle, EntityId, ProtocolVariant};

/// Readonly view into the decoder's current-tick state.
///
/// Domain objects hold a shared reference to this instead of caching what they
/// resolved, since every answer here may change when the decoder advances a
/// tick. A handle that resolves at tick N may resolve to nothing, or to a
/// different object, at tick N+1.
pub trait StateDirectory {
    fn find_entity_by_handle(&self, handle: EntityHandle) -> Option<Rc<dyn Entity>>;

    /// Resolve a player controller handle (Source 2) or player entity handle (Source 1).
    fn find_player_by_handle(&self, handle: EntityHandle) -> Option<Rc<Player>>;

    /// Resolve the handle of a Source 2 player pawn to the player owning it.
    fn find_player_by_pawn_handle(&self, handle: EntityHandle) -> Option<Rc<Player>>;

    /// Shared entity holding per-player arrays (Source 1 only).
    fn player_resource_entity(&self) -> Option<Rc<dyn Entity>>;

    fn find_weapon_by_entity_id(&self, id: EntityId) -> Option<Rc<Equipment>>;

    /// Server ticks per second.
    fn tick_rate(&self) -> f64;

    /// Current server tick.
    fn ingame_tick(&self) -> i32;

    /// True for protocol variant 2 (Source 2) demos.
    fn is_source2(&self) -> bool;

    fn protocol_variant(&self) -> ProtocolVariant {
        ProtocolVariant::from_is_source2(self.is_source2())
    }

    fn config(&self) -> CommonConfig {
        CommonConfig::default()
    }
}

/// Team membership as of the current tick.
///
/// Rosters change every round (connects, side swaps), so [`crate::TeamState`]
/// asks for members on every access rather than keeping a list.
pub trait Roster {
    fn members(&self, team: Team) -> Vec<Rc<Player>>;
}
