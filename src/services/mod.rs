pub mod product_service;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;
use tokio::sync::Mutex;

use self::product_service::ProductStore;

/// Shared handle to the injected store; all database operations serialize
/// on this lock.
pub type SharedProductStore = Arc<Mutex<dyn ProductStore + Send>>;
