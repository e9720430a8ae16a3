//! `ExecutionService`: stores the latest `ExecutionOrder` per product and fans it out
//! to the trade-booking back-edge and the executions journal.

use crate::{AlgoExecution, ExecutionOrder};
use bondwire_core::{PipelineError, Service, ServiceListener};
use indexmap::IndexMap;
use std::fmt;

#[derive(Default)]
pub struct ExecutionService {
    store: IndexMap<String, ExecutionOrder>,
    listeners: Vec<Box<dyn ServiceListener<ExecutionOrder>>>,
}

impl fmt::Debug for ExecutionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionService")
            .field("orders", &self.store.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ExecutionService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<String, ExecutionOrder> for ExecutionService {
    fn get_data(&self, key: &String) -> Option<&ExecutionOrder> {
        self.store.get(key)
    }

    fn on_message(&mut self, value: ExecutionOrder) -> Result<(), PipelineError> {
        let key = value.product_id().to_string();
        self.store.insert(key, value.clone());
        for listener in &mut self.listeners {
            listener.process_add(&value)?;
        }
        Ok(())
    }

    fn add_listener(&mut self, listener: Box<dyn ServiceListener<ExecutionOrder>>) {
        self.listeners.push(listener);
    }
}

impl ServiceListener<AlgoExecution> for ExecutionService {
    fn process_add(&mut self, value: &AlgoExecution) -> Result<(), PipelineError> {
        self.on_message(value.execution_order.clone())
    }
}
