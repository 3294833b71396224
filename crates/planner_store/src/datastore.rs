use std::path::Path;

use chronocat_planner_core::PlannerResult;

use crate::{PlannerConfig, PlannerStore};

/// Loads (or initializes) `planner.json` in `base` and connects to the store it
/// names, running pending migrations.
pub async fn open_store(base: &Path) -> PlannerResult<PlannerStore> {
    let config = PlannerConfig::load_or_init(base)?;
    PlannerStore::connect(&config, base).await
}
