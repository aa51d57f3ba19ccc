use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tracing::trace;

use super::{Equipment, Player};
use crate::Rc;
use crate::config::CommonConfig;
use crate::entity::{Entity, PropertyPath};
use crate::error::{ErrorKind, Result};
use crate::types::Vector;

/// Source of [`GrenadeProjectile::unique_id`]. Starts at 1, never reset.
static NEXT_UNIQUE_ID: AtomicI64 = AtomicI64::new(1);

const VELOCITY: PropertyPath = PropertyPath::from_static("m_vecVelocity");

/// One recorded position of a projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryEntry {
    pub position: Vector,
    pub frame_id: i32,
    pub time: Duration,
}

/// A thrown grenade while it is in the air or bouncing around.
#[derive(Debug)]
pub struct GrenadeProjectile {
    pub entity: Option<Rc<dyn Entity>>,
    pub weapon_instance: Option<Rc<Equipment>>,
    pub thrower: Option<Rc<Player>>,
    pub owner: Option<Rc<Player>>,
    pub trajectory: Vec<TrajectoryEntry>,
    unique_id: i64,
}

impl Default for GrenadeProjectile {
    fn default() -> Self {
        Self::new()
    }
}

impl GrenadeProjectile {
    /// Creates a projectile with a fresh process-wide unique id.
    pub fn new() -> Self {
        Self {
            entity: None,
            weapon_instance: None,
            thrower: None,
            owner: None,
            trajectory: Vec::new(),
            unique_id: NEXT_UNIQUE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn with_entity(entity: Rc<dyn Entity>) -> Self {
        Self {
            entity: Some(entity),
            ..Self::new()
        }
    }

    /// Identifier that stays stable for the whole flight and is never shared
    /// with another projectile, unlike the entity id which the decoder recycles.
    pub fn unique_id(&self) -> i64 {
        self.unique_id
    }

    pub fn position(&self) -> Vector {
        self.entity
            .as_ref()
            .map(|e| e.position())
            .unwrap_or_default()
    }

    /// Current velocity. Every projectile entity networks `m_vecVelocity`, so a
    /// missing value is reported as an error.
    pub fn velocity(&self) -> Result<Vector> {
        let Some(entity) = &self.entity else {
            return Err(ErrorKind::EntityMissing { path: VELOCITY }.into());
        };
        Ok(entity.property_value_must(&VELOCITY)?.vector_val())
    }

    /// Record a position sample, subject to the trajectory settings in `config`.
    pub fn track_position(
        &mut self,
        config: &CommonConfig,
        position: Vector,
        frame_id: i32,
        time: Duration,
    ) {
        if !config.track_grenade_trajectories {
            return;
        }
        if let Some(max) = config.max_trajectory_len {
            if self.trajectory.len() >= max {
                trace!(unique_id = self.unique_id, "trajectory full, dropping sample");
                return;
            }
        }
        self.trajectory.push(TrajectoryEntry {
            position,
            frame_id,
            time,
        });
    }

    pub fn last_position(&self) -> Option<Vector> {
        self.trajectory.last().map(|entry| entry.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropertyValue;
    use crate::fake::FakeEntity;

    #[test]
    fn unique_ids_differ() {
        assert_ne!(
            GrenadeProjectile::new().unique_id(),
            GrenadeProjectile::new().unique_id()
        );
    }

    #[test]
    fn unique_ids_differ_for_recycled_entity() {
        let entity: Rc<dyn Entity> = Rc::new(FakeEntity::new(77));
        let first = GrenadeProjectile::with_entity(entity.clone());
        let second = GrenadeProjectile::with_entity(entity);
        assert_ne!(first.unique_id(), second.unique_id());
    }

    #[test]
    fn velocity() {
        let expected = Vector::new(1.0, 2.0, 3.0);
        let projectile = GrenadeProjectile::with_entity(Rc::new(
            FakeEntity::new(1).with_property("m_vecVelocity", PropertyValue::Vector(expected)),
        ));
        assert_eq!(expected, projectile.velocity().unwrap());
    }

    #[test]
    fn velocity_without_entity_is_an_error() {
        let err = GrenadeProjectile::new().velocity().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::EntityMissing { .. }));

        let projectile = GrenadeProjectile::with_entity(Rc::new(FakeEntity::new(1)));
        let err = projectile.velocity().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::PropertyNotFound { .. }));
    }

    #[test]
    fn trajectory_respects_config() {
        let mut projectile = GrenadeProjectile::new();
        let bounded = CommonConfig {
            max_trajectory_len: Some(2),
            ..Default::default()
        };
        for frame in 0..5 {
            projectile.track_position(
                &bounded,
                Vector::new(frame as f64, 0.0, 0.0),
                frame,
                Duration::from_millis(frame as u64 * 16),
            );
        }
        assert_eq!(2, projectile.trajectory.len());
        assert_eq!(Some(Vector::new(1.0, 0.0, 0.0)), projectile.last_position());

        let disabled = CommonConfig {
            track_grenade_trajectories: false,
            ..Default::default()
        };
        let mut projectile = GrenadeProjectile::new();
        projectile.track_position(&disabled, Vector::default(), 0, Duration::ZERO);
        assert!(projectile.trajectory.is_empty());
        assert_eq!(None, projectile.last_position());
    }
}
