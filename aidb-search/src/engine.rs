//! Trait for anything the ranking engine can score.
//!
//! The scorer only ever looks at two fields: the record identifier and the
//! provider identifier. [`Rankable`] exposes exactly those, so the engine can
//! rank canonical [`ModelRecord`]s as well as lighter views over the index.

use crate::types::ModelRecord;

/// A searchable catalog entry.
pub trait Rankable {
    /// The record identifier (`id`).
    fn record_id(&self) -> &str;

    /// The owning provider's identifier (`provider_id`).
    fn provider_id(&self) -> &str;
}

impl Rankable for ModelRecord {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn provider_id(&self) -> &str {
        &self.provider_id
    }
}

impl<T: Rankable + ?Sized> Rankable for &T {
    fn record_id(&self) -> &str {
        (**self).record_id()
    }

    fn provider_id(&self) -> &str {
        (**self).provider_id()
    }
}
