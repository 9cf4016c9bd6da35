//! The persistence seam: how a machine asks for an entity to be saved.

use thiserror::Error;

/// Options passed along with a save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveOptions {
    /// Run the store's validation before writing
    pub validate: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

/// Why a save did not happen.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SaveError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage backend failed: {0}")]
    Backend(String),
}

/// Saves entities of type `E`.
///
/// Implementations own the storage; the machine only decides what the
/// state fields should be and asks for them to be written.
pub trait Persistence<E> {
    fn save(&mut self, entity: &mut E, options: SaveOptions) -> Result<(), SaveError>;
}

impl<E, P: Persistence<E> + ?Sized> Persistence<E> for &mut P {
    fn save(&mut self, entity: &mut E, options: SaveOptions) -> Result<(), SaveError> {
        (**self).save(entity, options)
    }
}
