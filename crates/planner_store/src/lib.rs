pub mod config;
pub mod datastore;
mod db;
pub mod migration;
pub mod shift;
pub mod store;

pub use chronocat_planner_core::*;
pub use config::{DatabaseConfig, PlannerConfig, PoolConfig};
pub use datastore::open_store;
pub use db::{PlannerActivities, PlannerDays};
pub use store::PlannerStore;
