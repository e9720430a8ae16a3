//! Generic `Service<K, V>` / `Connector<V>` / `ServiceListener<V>` traits.

use crate::error::PipelineError;

/// A keyed in-memory store with a listener list.
///
/// `on_message` upserts by the value's natural key and fans out `process_add` to
/// every registered listener, in registration order, stopping at the first listener
/// that returns `Err` (a failing listener aborts the process: its caches and
/// journals would otherwise drift out of sync with the ones that already ran).
/// `get_data` returns `None` when the key has no data yet — callers treat an absent
/// entry as "no data yet", never as an error.
pub trait Service<K, V> {
    fn get_data(&self, key: &K) -> Option<&V>;

    fn on_message(&mut self, value: V) -> Result<(), PipelineError>;

    fn add_listener(&mut self, listener: Box<dyn ServiceListener<V>>);
}

/// Sink for add/remove/update events from a [`Service`].
///
/// Only `process_add` is required: this pipeline never removes an entity, and every
/// "update" is modeled as a fresh `process_add` carrying the replaced value, matching
/// the upsert-by-key semantics of every service below. Listeners hold a mutable
/// reference to their downstream service but never take ownership of the value they
/// are handed.
pub trait ServiceListener<V> {
    fn process_add(&mut self, value: &V) -> Result<(), PipelineError>;

    fn process_remove(&mut self, _value: &V) -> Result<(), PipelineError> {
        Ok(())
    }

    fn process_update(&mut self, _value: &V) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// A boundary adapter. Subscribe-only connectors parse lines of external input and
/// call `on_message` on a service; publish-only connectors accept service values and
/// write them outward. Each connector is uni-directional: implement only the method
/// your direction needs, the other is a no-op.
pub trait Connector<V> {
    fn subscribe(&mut self, _lines: &mut dyn Iterator<Item = String>) -> Result<(), PipelineError> {
        Ok(())
    }

    fn publish(&mut self, _value: &V) -> Result<(), PipelineError> {
        Ok(())
    }
}
