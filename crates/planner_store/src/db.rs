use sea_orm::sea_query::{
    self, Expr, Iden, MysqlQueryBuilder, PostgresQueryBuilder, QueryStatementWriter, SimpleExpr,
    SqliteQueryBuilder,
};
use sea_orm::{ConnectionTrait, DatabaseBackend, DeriveIden, QueryResult, Statement};

use chronocat_planner_core::{
    Activity, ActivityId, Day, DayDate, DayId, PlannerError, PlannerResult, Scope,
};

#[derive(DeriveIden, Clone, Copy)]
pub enum PlannerDays {
    Table,
    Id,
    Date,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum PlannerActivities {
    Table,
    Id,
    DayId,
    Name,
    Time,
    Index,
}

pub(crate) const ACTIVITY_COLUMNS: [PlannerActivities; 5] = [
    PlannerActivities::Id,
    PlannerActivities::DayId,
    PlannerActivities::Name,
    PlannerActivities::Time,
    PlannerActivities::Index,
];

/// Predicate selecting the rows of one scope; the global scope is `day_id IS NULL`.
pub(crate) fn scope_condition(scope: Scope) -> SimpleExpr {
    match scope {
        Scope::Global => Expr::col(PlannerActivities::DayId).is_null(),
        Scope::Day(day) => Expr::col(PlannerActivities::DayId).eq(day.0),
    }
}

pub(crate) fn read_activity(row: &QueryResult) -> PlannerResult<Activity> {
    let id: i64 = row.try_get("", &col_name(PlannerActivities::Id))?;
    let day_id: Option<i64> = row.try_get("", &col_name(PlannerActivities::DayId))?;
    let index: i64 = row.try_get("", &col_name(PlannerActivities::Index))?;
    let index = u32::try_from(index)
        .map_err(|_| PlannerError::storage(format!("activity {id} has invalid index {index}")))?;
    Ok(Activity {
        id: ActivityId(id),
        scope: Scope::from_day(day_id.map(DayId)),
        index,
        name: row.try_get("", &col_name(PlannerActivities::Name))?,
        time: row.try_get("", &col_name(PlannerActivities::Time))?,
    })
}

pub(crate) fn read_day(row: &QueryResult) -> PlannerResult<Day> {
    let id: i64 = row.try_get("", &col_name(PlannerDays::Id))?;
    let date: i32 = row.try_get("", &col_name(PlannerDays::Date))?;
    Ok(Day {
        id: DayId(id),
        date: DayDate::from_julian_day(date)?,
    })
}

pub(crate) fn read_count(row: Option<QueryResult>) -> PlannerResult<u32> {
    let Some(row) = row else {
        return Ok(0);
    };
    let count: i64 = row.try_get("", "count")?;
    u32::try_from(count).map_err(|_| PlannerError::storage(format!("row count {count} overflows")))
}

pub(crate) fn col_name(column: impl Iden) -> String {
    column.to_string()
}

fn build_stmt<S: QueryStatementWriter>(
    backend: DatabaseBackend,
    stmt: &S,
) -> (String, sea_query::Values) {
    match backend {
        DatabaseBackend::Sqlite => stmt.build(SqliteQueryBuilder),
        DatabaseBackend::Postgres => stmt.build(PostgresQueryBuilder),
        DatabaseBackend::MySql => stmt.build(MysqlQueryBuilder),
    }
}

/// Executes `stmt` and returns the number of affected rows.
pub(crate) async fn exec<C, S>(conn: &C, stmt: &S) -> PlannerResult<u64>
where
    C: ConnectionTrait,
    S: QueryStatementWriter,
{
    let backend = conn.get_database_backend();
    let (sql, values) = build_stmt(backend, stmt);
    let result = conn
        .execute(Statement::from_sql_and_values(backend, sql, values))
        .await?;
    Ok(result.rows_affected())
}

/// Executes an insert and returns the generated primary key.
///
/// MySQL has no `RETURNING`, so it reports the id through the exec result.
pub(crate) async fn insert_returning_id<C>(
    conn: &C,
    mut stmt: sea_query::InsertStatement,
    id_col: impl Iden + Copy + 'static,
) -> PlannerResult<i64>
where
    C: ConnectionTrait,
{
    let backend = conn.get_database_backend();
    if backend == DatabaseBackend::MySql {
        let (sql, values) = build_stmt(backend, &stmt);
        let result = conn
            .execute(Statement::from_sql_and_values(backend, sql, values))
            .await?;
        return i64::try_from(result.last_insert_id())
            .map_err(|_| PlannerError::storage("generated id overflows"));
    }
    let name = col_name(id_col);
    stmt.returning_col(id_col);
    let row = query_one(conn, &stmt)
        .await?
        .ok_or_else(|| PlannerError::storage("insert returned no id"))?;
    Ok(row.try_get("", &name)?)
}

pub(crate) async fn query_all<C, S>(conn: &C, stmt: &S) -> PlannerResult<Vec<QueryResult>>
where
    C: ConnectionTrait,
    S: QueryStatementWriter,
{
    let backend = conn.get_database_backend();
    let (sql, values) = build_stmt(backend, stmt);
    let rows = conn
        .query_all(Statement::from_sql_and_values(backend, sql, values))
        .await?;
    Ok(rows)
}

pub(crate) async fn query_one<C, S>(conn: &C, stmt: &S) -> PlannerResult<Option<QueryResult>>
where
    C: ConnectionTrait,
    S: QueryStatementWriter,
{
    let backend = conn.get_database_backend();
    let (sql, values) = build_stmt(backend, stmt);
    let row = conn
        .query_one(Statement::from_sql_and_values(backend, sql, values))
        .await?;
    Ok(row)
}
