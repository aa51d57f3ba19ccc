use cs_demo_common::fake::{FakeDirectory, FakeEntity};
use cs_demo_common::{
    EntityHandle, EntityId, Equipment, EquipmentType, Player, PropertyValue, ProtocolVariant, Rc,
    StateDirectory,
};

#[test]
fn active_weapon_follows_handle_source1() {
    let directory = Rc::new(FakeDirectory::source1());
    let ak = Rc::new(Equipment::from_name("weapon_ak47", ProtocolVariant::Source1));
    directory.insert_weapon(EntityId(87), ak.clone());

    // serial 3, index 87
    let handle = (3u64 << 11) | 87;
    let entity = Rc::new(
        FakeEntity::new(4).with_property("m_hActiveWeapon", PropertyValue::Handle(handle)),
    );
    let player = Player::new(directory.clone()).with_entity(entity.clone());

    let active = player.active_weapon().unwrap();
    assert_eq!(EquipmentType::Ak47, active.equipment_type);
    assert_eq!(ak.unique_id(), active.unique_id());

    // weapon dropped and destroyed
    directory.remove_weapon(EntityId(87));
    assert!(player.active_weapon().is_none());

    // nothing in hand
    let invalid = EntityHandle::invalid(ProtocolVariant::Source1).raw();
    entity.set_property("m_hActiveWeapon", PropertyValue::Handle(invalid));
    assert!(player.active_weapon().is_none());
}

#[test]
fn active_weapon_through_pawn_source2() {
    let directory = Rc::new(FakeDirectory::source2());
    let pawn_handle = EntityHandle((1 << 14) | 130);
    let pawn = FakeEntity::new(130).with_property(
        "m_pWeaponServices.m_hActiveWeapon",
        PropertyValue::Handle((7 << 14) | 250),
    );
    directory.insert_entity(pawn_handle, Rc::new(pawn));
    directory.insert_weapon(
        EntityId(250),
        Rc::new(Equipment::new(EquipmentType::Awp, ProtocolVariant::Source2)),
    );

    let controller =
        FakeEntity::new(2).with_property("m_hPlayerPawn", PropertyValue::Handle(pawn_handle.raw()));
    let player = Player::new(directory.clone()).with_entity(Rc::new(controller));

    assert_eq!(pawn_handle, player.pawn_handle().unwrap());
    assert_eq!(
        EquipmentType::Awp,
        player.active_weapon().unwrap().equipment_type
    );

    directory.remove_entity(pawn_handle);
    assert!(player.player_pawn_entity().is_none());
    assert!(player.active_weapon().is_none());
}

#[test]
fn inventory_skips_unresolved_weapons() {
    let directory = Rc::new(FakeDirectory::source1());
    directory.insert_weapon(
        EntityId(10),
        Rc::new(Equipment::new(EquipmentType::Knife, ProtocolVariant::Source1)),
    );
    directory.insert_weapon(
        EntityId(12),
        Rc::new(Equipment::new(EquipmentType::Glock, ProtocolVariant::Source1)),
    );

    let mut player = Player::new(directory);
    player.inventory.extend([EntityId(12), EntityId(11), EntityId(10)]);

    let types: Vec<_> = player
        .weapons()
        .iter()
        .map(|weapon| weapon.equipment_type)
        .collect();
    assert_eq!(vec![EquipmentType::Knife, EquipmentType::Glock], types);
}

#[test]
fn player_lookup_by_handle() {
    let directory = Rc::new(FakeDirectory::source2());
    let mut player = Player::new(directory.clone());
    player.name = "s1mple".into();
    let player = Rc::new(player);

    let controller = EntityHandle::from(0x0000_4001u64);
    let pawn = EntityHandle::from(0x0001_c082u64);
    directory.insert_player(controller, player.clone());
    directory.insert_pawn_player(pawn, player);

    assert_eq!("s1mple", directory.find_player_by_handle(controller).unwrap().name);
    assert_eq!("s1mple", directory.find_player_by_pawn_handle(pawn).unwrap().name);
    assert!(directory.find_player_by_handle(pawn).is_none());
    assert_eq!(ProtocolVariant::Source2, directory.protocol_variant());
}
