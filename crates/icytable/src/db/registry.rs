use crate::{
    db::backend::{Backend, ReadBackend, StoreBackend},
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use std::{cell::RefCell, collections::HashMap, thread::LocalKey};
use thiserror::Error as ThisError;

///
/// BackendRegistryError
///

#[derive(Debug, ThisError)]
pub enum BackendRegistryError {
    #[error("backend '{0}' not found")]
    BackendNotFound(String),

    #[error("backend '{0}' already registered")]
    BackendAlreadyRegistered(String),

    #[error("backend '{0}' is borrowed for writing")]
    BackendBusy(String),
}

impl From<BackendRegistryError> for InternalError {
    fn from(err: BackendRegistryError) -> Self {
        match &err {
            BackendRegistryError::BackendAlreadyRegistered(_) => Self::new(
                ErrorClass::InvariantViolation,
                ErrorOrigin::Backend,
                err.to_string(),
            ),
            BackendRegistryError::BackendNotFound(_) | BackendRegistryError::BackendBusy(_) => {
                Self::backend_unavailable(err.to_string())
            }
        }
    }
}

///
/// BackendRegistry
///
/// Resolves a static path to a thread-local backend. This is the only place
/// a resolution error can originate: an unknown path, or a backend that is
/// already borrowed in a conflicting way.
///

#[derive(Default)]
pub struct BackendRegistry(HashMap<&'static str, &'static LocalKey<RefCell<StoreBackend>>>);

impl BackendRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Register a thread-local backend under a path.
    pub fn register(
        &mut self,
        path: &'static str,
        accessor: &'static LocalKey<RefCell<StoreBackend>>,
    ) -> Result<(), InternalError> {
        if self.0.contains_key(path) {
            return Err(BackendRegistryError::BackendAlreadyRegistered(path.to_string()).into());
        }
        self.0.insert(path, accessor);

        Ok(())
    }

    /// Iterate registered paths.
    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn try_get_backend(
        &self,
        path: &str,
    ) -> Result<&'static LocalKey<RefCell<StoreBackend>>, InternalError> {
        self.0
            .get(path)
            .copied()
            .ok_or_else(|| BackendRegistryError::BackendNotFound(path.to_string()).into())
    }

    /// Borrow a backend for reading.
    pub fn with_read_backend<R>(
        &self,
        path: &str,
        f: impl FnOnce(&dyn ReadBackend) -> R,
    ) -> Result<R, InternalError> {
        let accessor = self.try_get_backend(path)?;

        accessor.with(|cell| {
            let backend = cell
                .try_borrow()
                .map_err(|_| BackendRegistryError::BackendBusy(path.to_string()))?;

            Ok(f(&*backend))
        })
    }

    /// Borrow a backend for writing.
    pub fn with_backend<R>(
        &self,
        path: &str,
        f: impl FnOnce(&mut dyn Backend) -> R,
    ) -> Result<R, InternalError> {
        let accessor = self.try_get_backend(path)?;

        accessor.with(|cell| {
            let mut backend = cell
                .try_borrow_mut()
                .map_err(|_| BackendRegistryError::BackendBusy(path.to_string()))?;

            Ok(f(&mut *backend))
        })
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::table::Table,
        test_support::{Listing, test_backend},
    };

    thread_local! {
        static LISTINGS: RefCell<StoreBackend> = RefCell::new(test_backend());
    }

    fn registry() -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        registry.register("shop::listings", &LISTINGS).unwrap();

        registry
    }

    #[test]
    fn registered_backend_serves_reads_and_writes() {
        let registry = registry();
        let table = Table::<Listing>::new().unwrap();
        let record = Listing::new(1, 1, "a", "alice");

        registry
            .with_backend("shop::listings", |backend| table.save(backend, &record))
            .unwrap()
            .unwrap();
        let loaded = registry
            .with_read_backend("shop::listings", |backend| {
                table.get(backend, &Listing::pk(1, 1))
            })
            .unwrap()
            .unwrap();

        assert_eq!(loaded, Some(record));
        assert_eq!(registry.paths().collect::<Vec<_>>(), ["shop::listings"]);
    }

    #[test]
    fn unknown_path_is_unavailable() {
        let err = registry()
            .with_read_backend("shop::missing", |_| ())
            .unwrap_err();

        assert_eq!(err.class, ErrorClass::Unavailable);
        assert_eq!(err.origin, ErrorOrigin::Backend);
    }

    #[test]
    fn borrowing_a_backend_that_is_being_written_is_unavailable() {
        let registry = registry();

        let inner = registry
            .with_backend("shop::listings", |_| {
                registry.with_read_backend("shop::listings", |_| ())
            })
            .unwrap();

        assert_eq!(inner.unwrap_err().class, ErrorClass::Unavailable);
    }

    #[test]
    fn nested_reads_are_allowed() {
        let registry = registry();

        let inner = registry
            .with_read_backend("shop::listings", |_| {
                registry.with_read_backend("shop::listings", |_| ())
            })
            .unwrap();

        assert!(inner.is_ok());
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let mut registry = registry();

        let err = registry.register("shop::listings", &LISTINGS).unwrap_err();

        assert_eq!(err.class, ErrorClass::InvariantViolation);
    }
}
