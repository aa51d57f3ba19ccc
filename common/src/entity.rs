//! The read surface the domain layer needs from the entity decoder.
//!
//! The decoder owns property storage; this module only describes how a
//! property is addressed ([`PropertyPath`]), what a decoded value looks like
//! ([`PropertyValue`]) and how an entity hands values out ([`Entity`]).

use std::borrow::Cow;
use std::fmt;

use kinded::Kinded;
use serde::{Deserialize, Serialize};
use tracing::warn;
use variantly::Variantly;

use crate::error::{ErrorKind, Result};
use crate::types::{EntityHandle, EntityId, Vector};

/// Key of a property on an entity, e.g. `m_iHealth` or
/// `m_iCashSpentThisRound.003`.
///
/// Segments are separated by dots. A purely numeric last segment addresses a
/// fixed array slot. The path is otherwise opaque: no array decoding happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyPath(Cow<'static, str>);

impl PropertyPath {
    pub const fn from_static(path: &'static str) -> Self {
        PropertyPath(Cow::Borrowed(path))
    }

    pub fn new(path: impl Into<String>) -> Self {
        PropertyPath(Cow::Owned(path.into()))
    }

    /// Array slot with the three digit suffix Source 1 uses (`m_iKills.007`).
    pub fn indexed(base: &PropertyPath, slot: i32) -> Self {
        PropertyPath::new(format!("{}.{:03}", base.as_str(), slot))
    }

    /// Array slot with the four digit suffix Source 2 uses (`m_pReserveAmmo.0000`).
    pub fn indexed_wide(base: &PropertyPath, slot: i32) -> Self {
        PropertyPath::new(format!("{}.{:04}", base.as_str(), slot))
    }

    pub fn nested(parent: &PropertyPath, child: &str) -> Self {
        PropertyPath::new(format!("{}.{}", parent.as_str(), child))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The array slot addressed by a numeric last segment, if any.
    pub fn array_index(&self) -> Option<usize> {
        let (_, last) = self.0.rsplit_once('.')?;
        if last.is_empty() || !last.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        last.parse().ok()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for PropertyPath {
    fn from(path: &'static str) -> Self {
        PropertyPath::from_static(path)
    }
}

impl From<String> for PropertyPath {
    fn from(path: String) -> Self {
        PropertyPath::new(path)
    }
}

/// A decoded property value for the current tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Kinded, Variantly)]
#[kinded(derive(Serialize))]
pub enum PropertyValue {
    Int(i32),
    Int64(i64),
    #[variantly(rename = "uint64")]
    UInt64(u64),
    Float(f32),
    Bool(bool),
    Vector(Vector),
    String(String),
    Handle(u64),
    Array(Vec<PropertyValue>),
}

impl Default for PropertyValue {
    fn default() -> Self {
        PropertyValue::Int(0)
    }
}

impl PropertyValue {
    /// Integer view of any integral value. Wide values are truncated the
    /// same way the game does when it stores them in an `int`.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            PropertyValue::Int64(v) => Some(*v as i32),
            PropertyValue::UInt64(v) => Some(*v as i32),
            PropertyValue::Handle(v) => Some(*v as i32),
            PropertyValue::Bool(v) => Some(*v as i32),
            _ => None,
        }
    }

    /// Integer view without truncation. Unsigned values above `i64::MAX`
    /// saturate.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v as i64),
            PropertyValue::Int64(v) => Some(*v),
            PropertyValue::UInt64(v) | PropertyValue::Handle(v) => {
                Some(i64::try_from(*v).unwrap_or(i64::MAX))
            }
            PropertyValue::Bool(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            PropertyValue::Int(v) => Some(*v as u32 as u64),
            PropertyValue::Int64(v) => Some(*v as u64),
            PropertyValue::UInt64(v) | PropertyValue::Handle(v) => Some(*v),
            PropertyValue::Bool(v) => Some(*v as u64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            other => other.as_int().map(|v| v > 0),
        }
    }

    pub fn as_vector(&self) -> Option<Vector> {
        match self {
            PropertyValue::Vector(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<EntityHandle> {
        self.as_u64().map(EntityHandle)
    }

    pub fn int_val(&self) -> i32 {
        self.as_int().unwrap_or_default()
    }

    pub fn i64_val(&self) -> i64 {
        self.as_i64().unwrap_or_default()
    }

    pub fn u64_val(&self) -> u64 {
        self.as_u64().unwrap_or_default()
    }

    pub fn float_val(&self) -> f32 {
        self.as_float().unwrap_or_default()
    }

    pub fn bool_val(&self) -> bool {
        self.as_bool().unwrap_or_default()
    }

    pub fn vector_val(&self) -> Vector {
        self.as_vector().unwrap_or_default()
    }

    pub fn string_val(&self) -> String {
        self.as_str().map(str::to_owned).unwrap_or_default()
    }
}

/// A property as handed out by an entity: where it lives and its current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    path: PropertyPath,
    value: PropertyValue,
}

impl Property {
    pub fn new(path: PropertyPath, value: PropertyValue) -> Self {
        Property { path, value }
    }

    pub fn name(&self) -> &str {
        self.path.as_str()
    }

    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn kind(&self) -> PropertyValueKind {
        self.value.kind()
    }

    pub fn into_value(self) -> PropertyValue {
        self.value
    }
}

/// Width of one spatial cell in the Source 2 position encoding.
const CELL_WIDTH: f64 = (1 << 9) as f64;
/// Offset applied so cell coordinates start at the map edge rather than its center.
const CELL_ORIGIN: f64 = 16384.0;

const VEC_ORIGIN: PropertyPath = PropertyPath::from_static("m_vecOrigin");
const CELL_X: PropertyPath = PropertyPath::from_static("CBodyComponent.m_cellX");
const CELL_Y: PropertyPath = PropertyPath::from_static("CBodyComponent.m_cellY");
const CELL_Z: PropertyPath = PropertyPath::from_static("CBodyComponent.m_cellZ");
const VEC_X: PropertyPath = PropertyPath::from_static("CBodyComponent.m_vecX");
const VEC_Y: PropertyPath = PropertyPath::from_static("CBodyComponent.m_vecY");
const VEC_Z: PropertyPath = PropertyPath::from_static("CBodyComponent.m_vecZ");

/// A game object instance as exposed by the decoder for the current tick.
pub trait Entity: fmt::Debug {
    fn id(&self) -> EntityId;

    /// The property at `path`, or `None` if this entity does not carry it at
    /// the current tick. Absence is a normal state for optional fields.
    fn property(&self, path: &PropertyPath) -> Option<Property>;

    fn property_value(&self, path: &PropertyPath) -> Option<PropertyValue> {
        self.property(path).map(Property::into_value)
    }

    /// Like [`Entity::property_value`] but treats absence as an error. Only call
    /// this for fields the active protocol variant is known to populate.
    fn property_value_must(&self, path: &PropertyPath) -> Result<PropertyValue> {
        match self.property_value(path) {
            Some(value) => Ok(value),
            None => {
                warn!(entity_id = %self.id(), %path, "required property missing");
                Err(ErrorKind::PropertyNotFound {
                    entity_id: self.id(),
                    path: path.clone(),
                }
                .into())
            }
        }
    }

    /// World position. Source 1 entities store it directly in `m_vecOrigin`,
    /// Source 2 entities as a cell index plus an offset inside the cell.
    fn position(&self) -> Vector {
        if let Some(origin) = self.property_value(&VEC_ORIGIN) {
            return origin.vector_val();
        }

        let axis = |cell: &PropertyPath, offset: &PropertyPath| -> Option<f64> {
            let cell = self.property_value(cell)?.u64_val() as f64;
            let offset = self.property_value(offset)?.float_val() as f64;
            Some(cell * CELL_WIDTH - CELL_ORIGIN + offset)
        };

        match (
            axis(&CELL_X, &VEC_X),
            axis(&CELL_Y, &VEC_Y),
            axis(&CELL_Z, &VEC_Z),
        ) {
            (Some(x), Some(y), Some(z)) => Vector::new(x, y, z),
            _ => Vector::default(),
        }
    }
}

/// Reads an integer property, treating absence or a missing entity as zero.
pub(crate) fn int_prop(entity: Option<&dyn Entity>, path: &PropertyPath) -> i32 {
    entity
        .and_then(|e| e.property_value(path))
        .map(|v| v.int_val())
        .unwrap_or_default()
}

pub(crate) fn i64_prop(entity: Option<&dyn Entity>, path: &PropertyPath) -> i64 {
    entity
        .and_then(|e| e.property_value(path))
        .map(|v| v.i64_val())
        .unwrap_or_default()
}

pub(crate) fn bool_prop(entity: Option<&dyn Entity>, path: &PropertyPath) -> bool {
    entity
        .and_then(|e| e.property_value(path))
        .map(|v| v.bool_val())
        .unwrap_or_default()
}

pub(crate) fn float_prop(entity: Option<&dyn Entity>, path: &PropertyPath) -> f32 {
    entity
        .and_then(|e| e.property_value(path))
        .map(|v| v.float_val())
        .unwrap_or_default()
}

pub(crate) fn string_prop(entity: Option<&dyn Entity>, path: &PropertyPath) -> String {
    entity
        .and_then(|e| e.property_value(path))
        .map(|v| v.string_val())
        .unwrap_or_default()
}

pub(crate) fn vector_prop(entity: Option<&dyn Entity>, path: &PropertyPath) -> Vector {
    entity
        .and_then(|e| e.property_value(path))
        .map(|v| v.vector_val())
        .unwrap_or_default()
}

pub(crate) fn handle_prop(
    entity: Option<&dyn Entity>,
    path: &PropertyPath,
) -> Option<EntityHandle> {
    entity?.property_value(path)?.as_handle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeEntity;

    #[test]
    fn indexed_paths_are_zero_padded() {
        let base = PropertyPath::from_static("m_iCashSpentThisRound");
        assert_eq!("m_iCashSpentThisRound.000", PropertyPath::indexed(&base, 0).as_str());
        assert_eq!("m_iCashSpentThisRound.012", PropertyPath::indexed(&base, 12).as_str());
        assert_eq!(
            "m_pReserveAmmo.0000",
            PropertyPath::indexed_wide(&"m_pReserveAmmo".into(), 0).as_str()
        );
    }

    #[test]
    fn array_index_only_for_numeric_last_segment() {
        assert_eq!(Some(7), PropertyPath::from_static("m_iKills.007").array_index());
        assert_eq!(None, PropertyPath::from_static("m_pItemServices.m_bHasHelmet").array_index());
        assert_eq!(None, PropertyPath::from_static("m_iHealth").array_index());
    }

    #[test]
    fn lenient_accessors_fall_back_to_zero() {
        let value = PropertyValue::String("abc".into());
        assert_eq!(0, value.int_val());
        assert_eq!(Vector::default(), value.vector_val());
        assert_eq!("abc", value.string_val());
        assert_eq!(PropertyValueKind::String, value.kind());

        assert_eq!(300, PropertyValue::UInt64(300).int_val());
        assert!(PropertyValue::Int(1).bool_val());
        assert!(!PropertyValue::Int(0).bool_val());
    }

    #[test]
    fn wide_integers_are_not_truncated() {
        assert_eq!(3_000_000_000, PropertyValue::UInt64(3_000_000_000).i64_val());
        assert_eq!(i64::MAX, PropertyValue::UInt64(u64::MAX).i64_val());
        assert_eq!(-7, PropertyValue::Int(-7).i64_val());
        assert_eq!(0, PropertyValue::Float(2.0).i64_val());
    }

    #[test]
    fn variantly_accessors() {
        let value = PropertyValue::Vector(Vector::new(1.0, 2.0, 3.0));
        assert!(value.is_vector());
        assert!(!value.is_int());
        assert_eq!(Some(Vector::new(1.0, 2.0, 3.0)), value.vector());
    }

    #[test]
    fn property_value_must_reports_missing_path() {
        let entity = FakeEntity::new(4);
        let err = entity
            .property_value_must(&PropertyPath::from_static("m_vecVelocity"))
            .unwrap_err();
        match err.kind() {
            ErrorKind::PropertyNotFound { entity_id, path } => {
                assert_eq!(EntityId(4), *entity_id);
                assert_eq!("m_vecVelocity", path.as_str());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn position_from_origin() {
        let entity = FakeEntity::new(1).with_property(
            "m_vecOrigin",
            PropertyValue::Vector(Vector::new(10.0, 20.0, 30.0)),
        );
        assert_eq!(Vector::new(10.0, 20.0, 30.0), entity.position());
    }

    #[test]
    fn position_from_cells() {
        let entity = FakeEntity::new(1)
            .with_property("CBodyComponent.m_cellX", PropertyValue::UInt64(32))
            .with_property("CBodyComponent.m_cellY", PropertyValue::UInt64(33))
            .with_property("CBodyComponent.m_cellZ", PropertyValue::UInt64(32))
            .with_property("CBodyComponent.m_vecX", PropertyValue::Float(10.0))
            .with_property("CBodyComponent.m_vecY", PropertyValue::Float(0.5))
            .with_property("CBodyComponent.m_vecZ", PropertyValue::Float(0.0));

        assert_eq!(Vector::new(10.0, 512.5, 0.0), entity.position());
    }

    #[test]
    fn position_defaults_when_unknown() {
        assert_eq!(Vector::default(), FakeEntity::new(1).position());
    }
}
