use serde::Serialize;
use strum_macros::{Display, FromRepr};

use crate::Rc;
use crate::entity::{Entity, PropertyPath, int_prop};
use crate::types::Vector;

const HOSTAGE_STATE: PropertyPath = PropertyPath::from_static("m_nHostageState");

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, FromRepr)]
#[repr(u8)]
pub enum HostageState {
    #[default]
    Idle = 0,
    BeingUntied = 1,
    GettingPickedUp = 2,
    BeingCarried = 3,
    FollowingPlayer = 4,
    GettingDropped = 5,
    Rescued = 6,
    Dead = 7,
}

/// A hostage on a hostage rescue map.
#[derive(Debug, Default)]
pub struct Hostage {
    pub entity: Option<Rc<dyn Entity>>,
}

impl Hostage {
    pub fn new(entity: Rc<dyn Entity>) -> Self {
        Hostage {
            entity: Some(entity),
        }
    }

    pub fn position(&self) -> Vector {
        self.entity
            .as_ref()
            .map(|e| e.position())
            .unwrap_or_default()
    }

    /// Unknown or missing states read as `Idle`.
    pub fn state(&self) -> HostageState {
        u8::try_from(int_prop(self.entity.as_deref(), &HOSTAGE_STATE))
            .ok()
            .and_then(HostageState::from_repr)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropertyValue;
    use crate::fake::FakeEntity;

    #[test]
    fn position_is_live() {
        assert_eq!(Vector::default(), Hostage::default().position());

        let entity = Rc::new(
            FakeEntity::new(90)
                .with_property("m_vecOrigin", PropertyValue::Vector(Vector::new(1.0, 1.0, 0.0))),
        );
        let hostage = Hostage::new(entity.clone());
        assert_eq!(Vector::new(1.0, 1.0, 0.0), hostage.position());

        entity.set_property("m_vecOrigin", PropertyValue::Vector(Vector::new(5.0, 1.0, 0.0)));
        assert_eq!(Vector::new(5.0, 1.0, 0.0), hostage.position());
    }

    #[test]
    fn state_from_entity() {
        assert_eq!(HostageState::Idle, Hostage::default().state());

        let entity =
            Rc::new(FakeEntity::new(91).with_property("m_nHostageState", PropertyValue::Int(3)));
        let hostage = Hostage::new(entity.clone());
        assert_eq!(HostageState::BeingCarried, hostage.state());

        entity.set_property("m_nHostageState", PropertyValue::Int(6));
        assert_eq!(HostageState::Rescued, hostage.state());

        entity.set_property("m_nHostageState", PropertyValue::Int(42));
        assert_eq!(HostageState::Idle, hostage.state());
        entity.set_property("m_nHostageState", PropertyValue::Int(-1));
        assert_eq!(HostageState::Idle, hostage.state());
    }
}
