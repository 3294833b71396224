use async_trait::async_trait;

use crate::{
    Activity, ActivityId, CreateActivityInput, CreateDayInput, Day, DayDate, DayId, PlannerResult,
    Scope, UpdateActivityInput,
};

/// Activity CRUD that keeps every scope's indices dense (`0..n`).
///
/// Each mutating call runs in a single transaction: either the index shift
/// and the row change both land, or neither does.
#[async_trait]
pub trait ActivityApi {
    /// Activities of `scope` by ascending index, or every activity when `scope` is `None`.
    async fn list_activities(&self, scope: Option<Scope>) -> PlannerResult<Vec<Activity>>;

    async fn get_activity(&self, id: ActivityId) -> PlannerResult<Option<Activity>>;

    async fn count_activities(&self, scope: Scope) -> PlannerResult<u32>;

    /// Inserts at `input.index`, shifting later siblings back, or appends when absent.
    async fn create_activity(&self, input: CreateActivityInput) -> PlannerResult<Activity>;

    /// Removes the activity and closes the gap. Missing ids are a no-op.
    async fn delete_activity(&self, id: ActivityId) -> PlannerResult<()>;

    /// Applies a partial edit; a new index moves the activity within its scope.
    async fn update_activity(
        &self,
        id: ActivityId,
        input: UpdateActivityInput,
    ) -> PlannerResult<Activity>;

    async fn move_activity(&self, id: ActivityId, new_index: u32) -> PlannerResult<Activity> {
        self.update_activity(id, UpdateActivityInput::move_to(new_index))
            .await
    }

    /// Fails with a conflict when the scope's indices are not exactly `0..n`.
    async fn verify_density(&self, scope: Scope) -> PlannerResult<()>;
}

#[async_trait]
pub trait DayApi {
    async fn list_days(&self) -> PlannerResult<Vec<Day>>;
    async fn create_day(&self, input: CreateDayInput) -> PlannerResult<Day>;
    async fn get_day_by_date(&self, date: DayDate) -> PlannerResult<Option<Day>>;
    /// Returns the day for `date`, creating it first when missing.
    async fn ensure_day(&self, date: DayDate) -> PlannerResult<Day>;
    /// Deletes the day together with its activities. Missing ids are a no-op.
    async fn delete_day(&self, id: DayId) -> PlannerResult<()>;
    async fn list_day_activities(&self, id: DayId) -> PlannerResult<Vec<Activity>>;
}
