//! An in-memory [`Persistence`] implementation for tests and demos.

use std::fmt;

use crate::core::StatefulEntity;
use crate::machine::{Persistence, SaveError, SaveOptions};
use crate::snapshot::{Snapshot, SnapshotError};

type Validator<E> = Box<dyn Fn(&E) -> Result<(), String> + Send + Sync>;

/// Keeps a binary snapshot of every accepted save.
///
/// A validator, when set, runs before each save unless the save asks to skip
/// validation. A store can also be told to fail every save, as a backend
/// outage would.
///
/// # Example
///
/// ```rust
/// use machinist::core::EntityState;
/// use machinist::machine::{Persistence, SaveOptions};
/// use machinist::store::MemoryStore;
///
/// let mut store = MemoryStore::new()
///     .with_validator(|state: &EntityState| {
///         if state.current == "towed" {
///             Err("cannot save a towed vehicle".to_string())
///         } else {
///             Ok(())
///         }
///     });
///
/// let mut vehicle = EntityState::new("towed");
/// assert!(store.save(&mut vehicle, SaveOptions::default()).is_err());
/// assert!(store.save(&mut vehicle, SaveOptions { validate: false }).is_ok());
/// assert_eq!(store.saves(), 1);
/// ```
pub struct MemoryStore<E> {
    label: String,
    records: Vec<Vec<u8>>,
    validator: Option<Validator<E>>,
    outage: Option<String>,
}

impl<E> MemoryStore<E> {
    pub fn new() -> Self {
        Self::labeled("memory")
    }

    /// A store whose snapshots are tagged with `label`.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            records: Vec::new(),
            validator: None,
            outage: None,
        }
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&E) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Make every following save fail with `reason`.
    pub fn fail_with(&mut self, reason: impl Into<String>) {
        self.outage = Some(reason.into());
    }

    /// Accept saves again.
    pub fn recover(&mut self) {
        self.outage = None;
    }

    /// Number of accepted saves.
    pub fn saves(&self) -> usize {
        self.records.len()
    }

    /// The most recent accepted save.
    pub fn last(&self) -> Option<Result<Snapshot, SnapshotError>> {
        self.records.last().map(|bytes| Snapshot::from_binary(bytes))
    }

    /// Every accepted save, oldest first.
    pub fn snapshots(&self) -> Result<Vec<Snapshot>, SnapshotError> {
        self.records
            .iter()
            .map(|bytes| Snapshot::from_binary(bytes))
            .collect()
    }
}

impl<E> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: StatefulEntity> Persistence<E> for MemoryStore<E> {
    fn save(&mut self, entity: &mut E, options: SaveOptions) -> Result<(), SaveError> {
        if let Some(reason) = &self.outage {
            return Err(SaveError::Backend(reason.clone()));
        }

        if options.validate {
            if let Some(validator) = &self.validator {
                validator(&*entity).map_err(SaveError::Validation)?;
            }
        }

        let bytes = Snapshot::capture(self.label.as_str(), entity.state())
            .to_binary()
            .map_err(|e| SaveError::Backend(e.to_string()))?;
        self.records.push(bytes);

        tracing::trace!(store = %self.label, state = entity.current_state(), "entity saved");
        Ok(())
    }
}

impl<E> fmt::Debug for MemoryStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("label", &self.label)
            .field("saves", &self.records.len())
            .field("validator", &self.validator.is_some())
            .field("outage", &self.outage)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityState;

    #[test]
    fn accepted_saves_are_kept_in_order() {
        let mut store = MemoryStore::labeled("vehicle");
        let mut entity = EntityState::new("parked");

        store.save(&mut entity, SaveOptions::default()).unwrap();
        entity.current = "idling".to_string();
        store.save(&mut entity, SaveOptions::default()).unwrap();

        let states: Vec<_> = store
            .snapshots()
            .unwrap()
            .into_iter()
            .map(|snapshot| snapshot.state.current)
            .collect();
        assert_eq!(states, ["parked", "idling"]);
        assert_eq!(store.last().unwrap().unwrap().machine, "vehicle");
    }

    #[test]
    fn outage_fails_every_save_until_recovered() {
        let mut store = MemoryStore::new();
        let mut entity = EntityState::new("parked");

        store.fail_with("disk full");
        assert_eq!(
            store.save(&mut entity, SaveOptions { validate: false }),
            Err(SaveError::Backend("disk full".to_string()))
        );

        store.recover();
        assert!(store.save(&mut entity, SaveOptions::default()).is_ok());
        assert_eq!(store.saves(), 1);
    }

    #[test]
    fn validator_errors_are_reported() {
        let mut store = MemoryStore::new().with_validator(|_: &EntityState| Err("no title".to_string()));
        let mut entity = EntityState::new("parked");

        assert_eq!(
            store.save(&mut entity, SaveOptions::default()),
            Err(SaveError::Validation("no title".to_string()))
        );
        assert!(store.last().is_none());
    }
}
