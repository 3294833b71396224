//! Range-shift primitives over activity indices.
//!
//! Each primitive is a single `UPDATE` on the caller's connection or
//! transaction, so the shift is atomic and costs one round trip regardless of
//! how many siblings move. Callers run them inside the same transaction as the
//! row write that relies on them.

use sea_orm::ConnectionTrait;
use sea_orm::sea_query::{Expr, Query};

use chronocat_planner_core::{PlannerError, PlannerResult, Scope};

use crate::db::{PlannerActivities, exec, scope_condition};

/// `index += 1` for every activity of `scope` with `index >= from_index`.
pub async fn push_back<C>(conn: &C, scope: Scope, from_index: u32) -> PlannerResult<u64>
where
    C: ConnectionTrait,
{
    let update = Query::update()
        .table(PlannerActivities::Table)
        .value(
            PlannerActivities::Index,
            Expr::col(PlannerActivities::Index).add(1),
        )
        .and_where(scope_condition(scope))
        .and_where(Expr::col(PlannerActivities::Index).gte(i64::from(from_index)))
        .to_owned();
    let moved = exec(conn, &update).await?;
    log::debug!("push_back {scope} from {from_index}: {moved} rows");
    Ok(moved)
}

/// `index -= 1` for every activity of `scope` with `index > from_index`.
pub async fn pull_forward<C>(conn: &C, scope: Scope, from_index: u32) -> PlannerResult<u64>
where
    C: ConnectionTrait,
{
    let update = Query::update()
        .table(PlannerActivities::Table)
        .value(
            PlannerActivities::Index,
            Expr::col(PlannerActivities::Index).sub(1),
        )
        .and_where(scope_condition(scope))
        .and_where(Expr::col(PlannerActivities::Index).gt(i64::from(from_index)))
        .to_owned();
    let moved = exec(conn, &update).await?;
    log::debug!("pull_forward {scope} after {from_index}: {moved} rows");
    Ok(moved)
}

/// `index += amount` for every activity of `scope` with
/// `start_index <= index <= end_index`.
pub async fn shift_range<C>(
    conn: &C,
    scope: Scope,
    amount: i64,
    start_index: u32,
    end_index: u32,
) -> PlannerResult<u64>
where
    C: ConnectionTrait,
{
    if amount == 0 || start_index > end_index {
        return Ok(0);
    }
    if amount < 0 && i64::from(start_index) + amount < 0 {
        return Err(PlannerError::invalid(format!(
            "shifting {start_index}..={end_index} by {amount} would produce a negative index"
        )));
    }
    let update = Query::update()
        .table(PlannerActivities::Table)
        .value(
            PlannerActivities::Index,
            Expr::col(PlannerActivities::Index).add(amount),
        )
        .and_where(scope_condition(scope))
        .and_where(
            Expr::col(PlannerActivities::Index)
                .between(i64::from(start_index), i64::from(end_index)),
        )
        .to_owned();
    let moved = exec(conn, &update).await?;
    log::debug!("shift_range {scope} {start_index}..={end_index} by {amount}: {moved} rows");
    Ok(moved)
}
