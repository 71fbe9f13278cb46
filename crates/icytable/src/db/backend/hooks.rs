use crate::{error::InternalError, traits::RecordView};

///
/// Hooks
///
/// Backend-level veto points invoked by the primary-key index before a
/// batch is opened. Returning an error aborts the mutation with both stores
/// untouched. Every method defaults to a no-op.
///

pub trait Hooks {
    fn on_insert(&self, record: &dyn RecordView) -> Result<(), InternalError> {
        let _ = record;
        Ok(())
    }

    fn on_update(
        &self,
        new: &dyn RecordView,
        existing: &dyn RecordView,
    ) -> Result<(), InternalError> {
        let _ = (new, existing);
        Ok(())
    }

    fn on_delete(&self, record: &dyn RecordView) -> Result<(), InternalError> {
        let _ = record;
        Ok(())
    }
}
