//! Snapshots of an entity's state fields.
//!
//! A snapshot is what a store keeps for an entity: the four state fields,
//! tagged with the machine they belong to. It encodes to JSON for people and
//! to a compact binary form for storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{EntityState, StatefulEntity};
use crate::machine::Machine;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of an entity's state fields.
///
/// # Example
///
/// ```rust
/// use machinist::core::EntityState;
/// use machinist::snapshot::Snapshot;
///
/// let snapshot = Snapshot::capture("vehicle", &EntityState::new("parked"));
///
/// let bytes = snapshot.to_binary().unwrap();
/// let loaded = Snapshot::from_binary(&bytes).unwrap();
/// assert_eq!(loaded.state.current, "parked");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: Uuid,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// Name of the machine that manages the entity
    pub machine: String,

    pub state: EntityState,
}

impl Snapshot {
    pub fn capture(machine: impl Into<String>, state: &EntityState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            taken_at: Utc::now(),
            machine: machine.into(),
            state: state.clone(),
        }
    }

    /// Snapshot `entity` as managed by `machine`.
    pub fn of<E: StatefulEntity>(machine: &Machine<E>, entity: &E) -> Self {
        Self::capture(machine.name(), entity.state())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()
    }

    /// Write the captured fields back onto `entity`.
    ///
    /// Fails if the snapshot belongs to another machine or names a state
    /// `machine` does not know.
    pub fn restore<E: StatefulEntity>(
        &self,
        machine: &Machine<E>,
        entity: &mut E,
    ) -> Result<(), SnapshotError> {
        if self.machine != machine.name() {
            return Err(SnapshotError::ValidationFailed(format!(
                "snapshot belongs to machine '{}', not '{}'",
                self.machine,
                machine.name()
            )));
        }
        if !machine.table().has_state(&self.state.current) {
            return Err(SnapshotError::ValidationFailed(format!(
                "unknown state '{}'",
                self.state.current
            )));
        }

        *entity.state_mut() = self.state.clone();
        Ok(())
    }

    fn validate(self) -> Result<Self, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        if self.state.current.is_empty() {
            return Err(SnapshotError::ValidationFailed(
                "current state is empty".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MachineBuilder;

    fn vehicle() -> Machine<EntityState> {
        MachineBuilder::new("vehicle")
            .initial("parked")
            .transition("ignite", [("parked", "idling")])
            .build()
            .unwrap()
    }

    fn idling() -> EntityState {
        EntityState {
            current: "idling".to_string(),
            previous: Some("parked".to_string()),
            last_transition: Some("ignite".to_string()),
            last_role: Some("driver".to_string()),
        }
    }

    #[test]
    fn json_snapshot_loads() {
        let snapshot = Snapshot::capture("vehicle", &idling());

        let loaded = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();

        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn binary_snapshot_keeps_every_field() {
        let snapshot = Snapshot::capture("vehicle", &idling());

        let loaded = Snapshot::from_binary(&snapshot.to_binary().unwrap()).unwrap();

        assert_eq!(loaded.state, idling());
        assert_eq!(loaded.id, snapshot.id);
    }

    #[test]
    fn future_versions_are_rejected() {
        let mut snapshot = Snapshot::capture("vehicle", &idling());
        snapshot.version = SNAPSHOT_VERSION + 1;
        let json = serde_json::to_string(&snapshot).unwrap();

        assert!(matches!(
            Snapshot::from_json(&json),
            Err(SnapshotError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn garbage_is_a_deserialization_error() {
        assert!(matches!(
            Snapshot::from_binary(&[1, 2, 3]),
            Err(SnapshotError::DeserializationFailed(_))
        ));
        assert!(matches!(
            Snapshot::from_json("{}"),
            Err(SnapshotError::DeserializationFailed(_))
        ));
    }

    #[test]
    fn restore_checks_machine_and_state() {
        let machine = vehicle();
        let mut entity = EntityState::new("parked");

        Snapshot::capture("vehicle", &idling())
            .restore(&machine, &mut entity)
            .unwrap();
        assert_eq!(entity, idling());

        let foreign = Snapshot::capture("boat", &idling());
        assert!(foreign.restore(&machine, &mut entity).is_err());

        let unknown = Snapshot::capture("vehicle", &EntityState::new("flying"));
        assert!(unknown.restore(&machine, &mut entity).is_err());
        assert_eq!(entity, idling());
    }

    #[test]
    fn snapshot_of_uses_machine_name() {
        let machine = vehicle();
        let entity = EntityState::new("parked");

        let snapshot = Snapshot::of(&machine, &entity);

        assert_eq!(snapshot.machine, "vehicle");
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    }
}
