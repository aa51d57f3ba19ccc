use super::Player;
use crate::Rc;
use crate::types::Vector;

/// The C4. Either carried by a player or lying somewhere on the map.
#[derive(Debug, Default)]
pub struct Bomb {
    /// Where the bomb was last seen while not being carried.
    pub last_on_ground_position: Vector,
    pub carrier: Option<Rc<Player>>,
}

impl Bomb {
    /// The carrier's live position while carried, otherwise the last ground position.
    pub fn position(&self) -> Vector {
        match &self.carrier {
            Some(carrier) => carrier.position(),
            None => self.last_on_ground_position,
        }
    }

    pub fn is_carried(&self) -> bool {
        self.carrier.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropertyValue;
    use crate::fake::{FakeDirectory, FakeEntity};

    #[test]
    fn position_prefers_carrier() {
        let ground = Vector::new(1.0, 2.0, 3.0);
        let mut bomb = Bomb {
            last_on_ground_position: ground,
            carrier: None,
        };
        assert_eq!(ground, bomb.position());
        assert!(!bomb.is_carried());

        let entity = Rc::new(FakeEntity::new(1).with_property(
            "m_vecOrigin",
            PropertyValue::Vector(Vector::new(4.0, 5.0, 6.0)),
        ));
        let carrier = Player::new(Rc::new(FakeDirectory::source1())).with_entity(entity.clone());
        bomb.carrier = Some(Rc::new(carrier));
        assert_eq!(Vector::new(4.0, 5.0, 6.0), bomb.position());

        // the carrier moves, the bomb follows without being touched
        entity.set_property("m_vecOrigin", PropertyValue::Vector(Vector::new(7.0, 8.0, 9.0)));
        assert_eq!(Vector::new(7.0, 8.0, 9.0), bomb.position());

        bomb.carrier = None;
        assert_eq!(ground, bomb.position());
    }
}
