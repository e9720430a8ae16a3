//! Shared-ownership glue for wiring the service graph's listener edges, including
//! the pipeline's one back-edge.
//!
//! A service that sits in the middle of the graph is both a [`ServiceListener`]
//! (reacting to its upstream producer) and a [`Service`](crate::Service) in its own
//! right (owning its store and fanning out to its own listeners). [`Forward`] lets
//! one `Rc<RefCell<S>>` be registered as a listener on any number of upstream
//! services while the driver keeps its own handle to wire further edges or read
//! final state, without giving any edge ownership of the service it targets.

use crate::error::PipelineError;
use crate::service::ServiceListener;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Forwards `process_add`/`process_remove`/`process_update` into a shared,
/// `RefCell`-guarded service. Clone and register as a listener on every upstream
/// producer the wrapped service needs to observe.
pub struct Forward<S>(Rc<RefCell<S>>);

impl<S> Forward<S> {
    pub fn new(inner: Rc<RefCell<S>>) -> Self {
        Self(inner)
    }
}

impl<S> Clone for Forward<S> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<S> fmt::Debug for Forward<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Forward").finish()
    }
}

impl<S, V> ServiceListener<V> for Forward<S>
where
    S: ServiceListener<V>,
{
    fn process_add(&mut self, value: &V) -> Result<(), PipelineError> {
        self.0.borrow_mut().process_add(value)
    }

    fn process_remove(&mut self, value: &V) -> Result<(), PipelineError> {
        self.0.borrow_mut().process_remove(value)
    }

    fn process_update(&mut self, value: &V) -> Result<(), PipelineError> {
        self.0.borrow_mut().process_update(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter(Rc<Cell<u32>>);

    impl ServiceListener<()> for Counter {
        fn process_add(&mut self, _value: &()) -> Result<(), PipelineError> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn forward_shares_ownership_across_multiple_registrations() {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::new(RefCell::new(Counter(count.clone())));
        let mut a = Forward::new(inner.clone());
        let mut b = Forward::new(inner);

        a.process_add(&()).unwrap();
        b.process_add(&()).unwrap();

        assert_eq!(count.get(), 2);
    }
}
