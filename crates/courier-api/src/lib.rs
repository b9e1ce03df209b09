pub mod error;
pub mod inbox;
pub mod send;
pub mod trash;

use std::sync::Arc;

use courier_db::{Database, DbStore};
use courier_delivery::adapter::SimulatedAdapter;
use courier_delivery::orchestrator::Orchestrator;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub orchestrator: Orchestrator<SimulatedAdapter, DbStore>,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>) -> Self {
        let orchestrator = Orchestrator::new(SimulatedAdapter::default(), DbStore::new(db.clone()));
        Self { db, orchestrator }
    }
}
