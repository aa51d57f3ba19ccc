//! In-memory stand-ins for the decoder boundary.
//!
//! Tests (and tools that want to inspect the object model without a demo) can
//! build entity and directory state by hand with these. Everything is
//! mutable through shared references so a fixture can be changed between
//! "ticks" while domain objects keep pointing at it.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::Rc;
use crate::common::{Equipment, Player, Team};
use crate::config::CommonConfig;
use crate::directory::{Roster, StateDirectory};
use crate::entity::{Entity, Property, PropertyPath, PropertyValue};
use crate::types::{EntityHandle, EntityId, ProtocolVariant};

/// An entity backed by a plain property table.
#[derive(Debug, Default)]
pub struct FakeEntity {
    id: EntityId,
    props: RefCell<HashMap<PropertyPath, PropertyValue>>,
}

impl FakeEntity {
    pub fn new(id: i32) -> Self {
        FakeEntity {
            id: EntityId(id),
            props: RefCell::default(),
        }
    }

    pub fn with_property(self, path: impl Into<PropertyPath>, value: PropertyValue) -> Self {
        self.set_property(path, value);
        self
    }

    pub fn set_property(&self, path: impl Into<PropertyPath>, value: PropertyValue) {
        self.props.borrow_mut().insert(path.into(), value);
    }

    pub fn remove_property(&self, path: impl Into<PropertyPath>) -> Option<PropertyValue> {
        self.props.borrow_mut().remove(&path.into())
    }
}

impl Entity for FakeEntity {
    fn id(&self) -> EntityId {
        self.id
    }

    fn property(&self, path: &PropertyPath) -> Option<Property> {
        self.props
            .borrow()
            .get(path)
            .map(|value| Property::new(path.clone(), value.clone()))
    }
}

/// A [`StateDirectory`] over hand-filled lookup tables.
#[derive(Debug, Default)]
pub struct FakeDirectory {
    variant: ProtocolVariant,
    tick_rate: Cell<f64>,
    ingame_tick: Cell<i32>,
    config: CommonConfig,
    player_resource: RefCell<Option<Rc<dyn Entity>>>,
    entities: RefCell<HashMap<EntityHandle, Rc<dyn Entity>>>,
    players: RefCell<HashMap<EntityHandle, Rc<Player>>>,
    pawn_players: RefCell<HashMap<EntityHandle, Rc<Player>>>,
    weapons: RefCell<HashMap<EntityId, Rc<Equipment>>>,
}

impl FakeDirectory {
    pub fn new(variant: ProtocolVariant) -> Self {
        FakeDirectory {
            variant,
            ..Default::default()
        }
    }

    pub fn source1() -> Self {
        Self::new(ProtocolVariant::Source1)
    }

    pub fn source2() -> Self {
        Self::new(ProtocolVariant::Source2)
    }

    pub fn with_tick(self, tick_rate: f64, ingame_tick: i32) -> Self {
        self.set_tick(tick_rate, ingame_tick);
        self
    }

    pub fn with_player_resource(self, entity: Rc<dyn Entity>) -> Self {
        self.set_player_resource(Some(entity));
        self
    }

    pub fn with_config(mut self, config: CommonConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_tick(&self, tick_rate: f64, ingame_tick: i32) {
        self.tick_rate.set(tick_rate);
        self.ingame_tick.set(ingame_tick);
    }

    pub fn set_player_resource(&self, entity: Option<Rc<dyn Entity>>) {
        *self.player_resource.borrow_mut() = entity;
    }

    pub fn insert_entity(&self, handle: EntityHandle, entity: Rc<dyn Entity>) {
        self.entities.borrow_mut().insert(handle, entity);
    }

    pub fn remove_entity(&self, handle: EntityHandle) {
        self.entities.borrow_mut().remove(&handle);
    }

    pub fn insert_player(&self, handle: EntityHandle, player: Rc<Player>) {
        self.players.borrow_mut().insert(handle, player);
    }

    pub fn insert_pawn_player(&self, pawn: EntityHandle, player: Rc<Player>) {
        self.pawn_players.borrow_mut().insert(pawn, player);
    }

    pub fn insert_weapon(&self, id: EntityId, weapon: Rc<Equipment>) {
        self.weapons.borrow_mut().insert(id, weapon);
    }

    pub fn remove_weapon(&self, id: EntityId) {
        self.weapons.borrow_mut().remove(&id);
    }
}

impl StateDirectory for FakeDirectory {
    fn find_entity_by_handle(&self, handle: EntityHandle) -> Option<Rc<dyn Entity>> {
        self.entities.borrow().get(&handle).cloned()
    }

    fn find_player_by_handle(&self, handle: EntityHandle) -> Option<Rc<Player>> {
        self.players.borrow().get(&handle).cloned()
    }

    fn find_player_by_pawn_handle(&self, handle: EntityHandle) -> Option<Rc<Player>> {
        self.pawn_players.borrow().get(&handle).cloned()
    }

    fn player_resource_entity(&self) -> Option<Rc<dyn Entity>> {
        self.player_resource.borrow().clone()
    }

    fn find_weapon_by_entity_id(&self, id: EntityId) -> Option<Rc<Equipment>> {
        self.weapons.borrow().get(&id).cloned()
    }

    fn tick_rate(&self) -> f64 {
        self.tick_rate.get()
    }

    fn ingame_tick(&self) -> i32 {
        self.ingame_tick.get()
    }

    fn is_source2(&self) -> bool {
        self.variant.is_source2()
    }

    fn config(&self) -> CommonConfig {
        self.config
    }
}

/// A [`Roster`] whose membership is set explicitly per team.
#[derive(Debug, Default)]
pub struct FakeRoster {
    members: RefCell<HashMap<Team, Vec<Rc<Player>>>>,
}

impl FakeRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_members(&self, team: Team, members: Vec<Rc<Player>>) {
        self.members.borrow_mut().insert(team, members);
    }
}

impl Roster for FakeRoster {
    fn members(&self, team: Team) -> Vec<Rc<Player>> {
        self.members
            .borrow()
            .get(&team)
            .cloned()
            .unwrap_or_default()
    }
}
