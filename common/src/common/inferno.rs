use serde::Serialize;

use crate::Rc;
use crate::entity::Entity;
use crate::types::Vector;

/// Burning area left by a molotov or incendiary grenade.
#[derive(Debug, Default)]
pub struct Inferno {
    pub entity: Option<Rc<dyn Entity>>,
    /// Flame origins in the order they appeared.
    pub flames: Vec<Vector>,
    hull: Vec<Vector>,
}

impl Inferno {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: Rc<dyn Entity>) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn add_flame(&mut self, position: Vector) {
        self.flames.push(position);
        self.update_hull();
    }

    /// Recomputes the outline after `flames` was changed directly.
    pub fn update_hull(&mut self) {
        self.hull = convex_hull(&self.flames);
    }

    /// Outline of the burning area on the ground plane, counter-clockwise.
    pub fn hull(&self) -> &[Vector] {
        &self.hull
    }

    pub fn position(&self) -> Vector {
        self.entity
            .as_ref()
            .map(|e| e.position())
            .unwrap_or_default()
    }
}

/// Area covered by flames, for serializing a snapshot of an inferno.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfernoOutline {
    pub flames: Vec<Vector>,
    pub hull: Vec<Vector>,
}

impl From<&Inferno> for InfernoOutline {
    fn from(inferno: &Inferno) -> Self {
        InfernoOutline {
            flames: inferno.flames.clone(),
            hull: inferno.hull.clone(),
        }
    }
}

/// 2D convex hull of `points` (monotone chain). `z` is ignored and collinear
/// points on an edge are dropped.
pub fn convex_hull(points: &[Vector]) -> Vec<Vector> {
    let mut points = points.to_vec();
    if points.len() <= 1 {
        return points;
    }
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

    let mut lower: Vec<Vector> = Vec::with_capacity(points.len());
    for &p in &points {
        push_turning_left(&mut lower, p);
    }
    let mut upper: Vec<Vector> = Vec::with_capacity(points.len());
    for &p in points.iter().rev() {
        push_turning_left(&mut upper, p);
    }

    // each chain ends where the other starts
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn push_turning_left(chain: &mut Vec<Vector>, p: Vector) {
    while let [.., o, a] = chain[..] {
        if cross(o, a, p) > 0.0 {
            break;
        }
        chain.pop();
    }
    chain.push(p);
}

fn cross(o: Vector, a: Vector, b: Vector) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}
