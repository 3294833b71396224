use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Expr, Func, OnConflict, Order, Query};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use chronocat_planner_core::{
    Activity, ActivityApi, ActivityId, CreateActivityInput, CreateDayInput, Day, DayApi, DayDate,
    DayId, PlannerError, PlannerResult, Scope, UpdateActivityInput,
};

use crate::db::*;
use crate::migration::Migrator;
use crate::shift;
use crate::PlannerConfig;

pub const FAILPOINT_CREATE_AFTER_SHIFT: &str = "activity.create.after_shift";
pub const FAILPOINT_DELETE_AFTER_SHIFT: &str = "activity.delete.after_shift";
pub const FAILPOINT_UPDATE_AFTER_SHIFT: &str = "activity.update.after_shift";

#[derive(Clone)]
pub struct PlannerStore {
    conn: DatabaseConnection,
    backend: DatabaseBackend,
    default_day: DayDate,
    failpoints: HashSet<String>,
}

impl PlannerStore {
    pub async fn connect(config: &PlannerConfig, base_dir: &Path) -> PlannerResult<Self> {
        let default_day = config.default_day_date()?;
        let url = build_connection_url(config, base_dir)?;
        let mut options = ConnectOptions::new(url);
        options.sqlx_logging(false);
        if let Some(pool) = &config.pool {
            if let Some(max) = pool.max_connections {
                options.max_connections(max);
            }
            if let Some(min) = pool.min_connections {
                options.min_connections(min);
            }
            if let Some(timeout_ms) = pool.connect_timeout_ms {
                options.connect_timeout(Duration::from_millis(timeout_ms));
            }
            if let Some(timeout_ms) = pool.acquire_timeout_ms {
                options.acquire_timeout(Duration::from_millis(timeout_ms));
            }
            if let Some(timeout_ms) = pool.idle_timeout_ms {
                options.idle_timeout(Duration::from_millis(timeout_ms));
            }
        }
        let conn = Database::connect(options).await?;
        let backend = conn.get_database_backend();
        let failpoints = config
            .failpoints
            .clone()
            .unwrap_or_default()
            .into_iter()
            .collect::<HashSet<_>>();
        Migrator::up(&conn, None).await?;
        log::info!("planner store connected ({})", config.backend_name());
        Ok(Self {
            conn,
            backend,
            default_day,
            failpoints,
        })
    }

    pub async fn connect_sqlite(path: &Path) -> PlannerResult<Self> {
        let config = PlannerConfig::default_sqlite(path.to_string_lossy());
        Self::connect(&config, path.parent().unwrap_or_else(|| Path::new("."))).await
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn default_day(&self) -> DayDate {
        self.default_day
    }

    fn maybe_failpoint(&self, key: &str) -> PlannerResult<()> {
        if self.failpoints.contains(key) {
            Err(PlannerError::storage(format!("failpoint {key}")))
        } else {
            Ok(())
        }
    }

    /// Opens a write transaction. SQLite serializes writers itself and ignores
    /// isolation levels, so only the server backends ask for `SERIALIZABLE`.
    ///
    /// SQLite transactions begin deferred: when two of them race to write, the
    /// loser fails at once with "database is locked" (busy_timeout does not
    /// apply to the upgrade). That surfaces as `PlannerError::Storage` with
    /// everything rolled back, and the caller decides whether to retry.
    async fn begin(&self) -> PlannerResult<DatabaseTransaction> {
        let isolation = match self.backend {
            DatabaseBackend::Sqlite => None,
            DatabaseBackend::Postgres | DatabaseBackend::MySql => {
                Some(IsolationLevel::Serializable)
            }
        };
        Ok(self.conn.begin_with_config(isolation, None).await?)
    }

    async fn resolve_scope(
        &self,
        tx: &DatabaseTransaction,
        scope: Option<Scope>,
    ) -> PlannerResult<Scope> {
        match scope {
            None => Ok(ensure_day_in(tx, self.default_day).await?.scope()),
            Some(Scope::Global) => Ok(Scope::Global),
            Some(Scope::Day(day_id)) => {
                if fetch_day(tx, day_id).await?.is_none() {
                    return Err(PlannerError::not_found(format!("day {day_id}")));
                }
                Ok(Scope::Day(day_id))
            }
        }
    }
}

#[async_trait]
impl ActivityApi for PlannerStore {
    async fn list_activities(&self, scope: Option<Scope>) -> PlannerResult<Vec<Activity>> {
        let mut select = Query::select()
            .from(PlannerActivities::Table)
            .columns(ACTIVITY_COLUMNS)
            .order_by(PlannerActivities::Index, Order::Asc)
            .to_owned();
        match scope {
            Some(scope) => {
                select.and_where(scope_condition(scope));
            }
            None => {
                select.order_by(PlannerActivities::DayId, Order::Asc);
            }
        }
        select.order_by(PlannerActivities::Id, Order::Asc);
        let rows = query_all(&self.conn, &select).await?;
        rows.iter().map(read_activity).collect()
    }

    async fn get_activity(&self, id: ActivityId) -> PlannerResult<Option<Activity>> {
        fetch_activity(&self.conn, id).await
    }

    async fn count_activities(&self, scope: Scope) -> PlannerResult<u32> {
        count_in_scope(&self.conn, scope).await
    }

    async fn create_activity(&self, input: CreateActivityInput) -> PlannerResult<Activity> {
        let tx = self.begin().await?;
        let scope = self.resolve_scope(&tx, input.scope).await?;
        let count = count_in_scope(&tx, scope).await?;
        let index = match input.index {
            None => count,
            Some(index) if index > count => {
                return Err(PlannerError::invalid_index(index, count));
            }
            Some(index) => {
                shift::push_back(&tx, scope, index).await?;
                index
            }
        };
        self.maybe_failpoint(FAILPOINT_CREATE_AFTER_SHIFT)?;
        let insert = Query::insert()
            .into_table(PlannerActivities::Table)
            .columns([
                PlannerActivities::DayId,
                PlannerActivities::Name,
                PlannerActivities::Time,
                PlannerActivities::Index,
            ])
            .values_panic([
                scope.day_id().map(|day| day.0).into(),
                input.name.clone().into(),
                input.time.clone().into(),
                i64::from(index).into(),
            ])
            .to_owned();
        let id = insert_returning_id(&tx, insert, PlannerActivities::Id).await?;
        tx.commit().await?;
        log::info!("created activity {id} in {scope} at index {index}");
        Ok(Activity {
            id: ActivityId(id),
            scope,
            index,
            name: input.name,
            time: input.time,
        })
    }

    async fn delete_activity(&self, id: ActivityId) -> PlannerResult<()> {
        let tx = self.begin().await?;
        let Some(activity) = fetch_activity(&tx, id).await? else {
            log::debug!("delete of missing activity {id} ignored");
            return Ok(());
        };
        // Scope and index are captured before the row disappears.
        shift::pull_forward(&tx, activity.scope, activity.index).await?;
        self.maybe_failpoint(FAILPOINT_DELETE_AFTER_SHIFT)?;
        let delete = Query::delete()
            .from_table(PlannerActivities::Table)
            .and_where(Expr::col(PlannerActivities::Id).eq(id.0))
            .to_owned();
        exec(&tx, &delete).await?;
        tx.commit().await?;
        log::info!(
            "deleted activity {id} from {} at index {}",
            activity.scope,
            activity.index
        );
        Ok(())
    }

    async fn update_activity(
        &self,
        id: ActivityId,
        input: UpdateActivityInput,
    ) -> PlannerResult<Activity> {
        let tx = self.begin().await?;
        let current = fetch_activity(&tx, id)
            .await?
            .ok_or_else(|| PlannerError::not_found(format!("activity {id}")))?;
        if input.is_empty() {
            return Ok(current);
        }
        let scope = current.scope;
        let mut updated = current.clone();
        if let Some(new_index) = input.index {
            let count = count_in_scope(&tx, scope).await?;
            let max = count.saturating_sub(1);
            if new_index > max {
                return Err(PlannerError::invalid_index(new_index, max));
            }
            match new_index.cmp(&current.index) {
                Ordering::Greater => {
                    shift::shift_range(&tx, scope, -1, current.index + 1, new_index).await?;
                }
                Ordering::Less => {
                    shift::shift_range(&tx, scope, 1, new_index, current.index - 1).await?;
                }
                Ordering::Equal => {}
            }
            updated.index = new_index;
        }
        if let Some(name) = input.name {
            updated.name = name;
        }
        if let Some(time) = input.time {
            updated.time = time;
        }
        self.maybe_failpoint(FAILPOINT_UPDATE_AFTER_SHIFT)?;
        let update = Query::update()
            .table(PlannerActivities::Table)
            .values([
                (PlannerActivities::Name, updated.name.clone().into()),
                (PlannerActivities::Time, updated.time.clone().into()),
                (PlannerActivities::Index, i64::from(updated.index).into()),
            ])
            .and_where(Expr::col(PlannerActivities::Id).eq(id.0))
            .to_owned();
        exec(&tx, &update).await?;
        tx.commit().await?;
        if updated.index != current.index {
            log::info!(
                "moved activity {id} in {scope} from {} to {}",
                current.index,
                updated.index
            );
        }
        Ok(updated)
    }

    async fn verify_density(&self, scope: Scope) -> PlannerResult<()> {
        let select = Query::select()
            .from(PlannerActivities::Table)
            .column(PlannerActivities::Index)
            .and_where(scope_condition(scope))
            .order_by(PlannerActivities::Index, Order::Asc)
            .to_owned();
        let rows = query_all(&self.conn, &select).await?;
        let index_col = col_name(PlannerActivities::Index);
        for (expected, row) in rows.iter().enumerate() {
            let index: i64 = row.try_get("", &index_col)?;
            if index != expected as i64 {
                return Err(PlannerError::conflict(format!(
                    "{scope} is not dense: position {expected} holds index {index}"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DayApi for PlannerStore {
    async fn list_days(&self) -> PlannerResult<Vec<Day>> {
        let select = Query::select()
            .from(PlannerDays::Table)
            .columns([PlannerDays::Id, PlannerDays::Date])
            .order_by(PlannerDays::Date, Order::Asc)
            .to_owned();
        let rows = query_all(&self.conn, &select).await?;
        rows.iter().map(read_day).collect()
    }

    async fn create_day(&self, input: CreateDayInput) -> PlannerResult<Day> {
        let tx = self.begin().await?;
        if fetch_day_by_date(&tx, input.date).await?.is_some() {
            return Err(PlannerError::conflict(format!(
                "day {} already exists",
                input.date
            )));
        }
        let insert = Query::insert()
            .into_table(PlannerDays::Table)
            .columns([PlannerDays::Date])
            .values_panic([input.date.to_julian_day().into()])
            .to_owned();
        let id = insert_returning_id(&tx, insert, PlannerDays::Id).await?;
        tx.commit().await?;
        log::info!("created day {id} for {}", input.date);
        Ok(Day {
            id: DayId(id),
            date: input.date,
        })
    }

    async fn get_day_by_date(&self, date: DayDate) -> PlannerResult<Option<Day>> {
        fetch_day_by_date(&self.conn, date).await
    }

    async fn ensure_day(&self, date: DayDate) -> PlannerResult<Day> {
        let tx = self.begin().await?;
        let day = ensure_day_in(&tx, date).await?;
        tx.commit().await?;
        Ok(day)
    }

    async fn delete_day(&self, id: DayId) -> PlannerResult<()> {
        let tx = self.begin().await?;
        let delete_activities = Query::delete()
            .from_table(PlannerActivities::Table)
            .and_where(Expr::col(PlannerActivities::DayId).eq(id.0))
            .to_owned();
        let removed = exec(&tx, &delete_activities).await?;
        let delete_day = Query::delete()
            .from_table(PlannerDays::Table)
            .and_where(Expr::col(PlannerDays::Id).eq(id.0))
            .to_owned();
        let deleted = exec(&tx, &delete_day).await?;
        tx.commit().await?;
        if deleted > 0 {
            log::info!("deleted day {id} with {removed} activities");
        }
        Ok(())
    }

    async fn list_day_activities(&self, id: DayId) -> PlannerResult<Vec<Activity>> {
        if fetch_day(&self.conn, id).await?.is_none() {
            return Err(PlannerError::not_found(format!("day {id}")));
        }
        self.list_activities(Some(Scope::Day(id))).await
    }
}

async fn fetch_activity<C>(conn: &C, id: ActivityId) -> PlannerResult<Option<Activity>>
where
    C: ConnectionTrait,
{
    let select = Query::select()
        .from(PlannerActivities::Table)
        .columns(ACTIVITY_COLUMNS)
        .and_where(Expr::col(PlannerActivities::Id).eq(id.0))
        .limit(1)
        .to_owned();
    query_one(conn, &select)
        .await?
        .as_ref()
        .map(read_activity)
        .transpose()
}

async fn count_in_scope<C>(conn: &C, scope: Scope) -> PlannerResult<u32>
where
    C: ConnectionTrait,
{
    let select = Query::select()
        .from(PlannerActivities::Table)
        .expr_as(
            Func::count(Expr::col(PlannerActivities::Id)),
            Alias::new("count"),
        )
        .and_where(scope_condition(scope))
        .to_owned();
    read_count(query_one(conn, &select).await?)
}

async fn fetch_day<C>(conn: &C, id: DayId) -> PlannerResult<Option<Day>>
where
    C: ConnectionTrait,
{
    let select = Query::select()
        .from(PlannerDays::Table)
        .columns([PlannerDays::Id, PlannerDays::Date])
        .and_where(Expr::col(PlannerDays::Id).eq(id.0))
        .limit(1)
        .to_owned();
    query_one(conn, &select)
        .await?
        .as_ref()
        .map(read_day)
        .transpose()
}

async fn fetch_day_by_date<C>(conn: &C, date: DayDate) -> PlannerResult<Option<Day>>
where
    C: ConnectionTrait,
{
    let select = Query::select()
        .from(PlannerDays::Table)
        .columns([PlannerDays::Id, PlannerDays::Date])
        .and_where(Expr::col(PlannerDays::Date).eq(date.to_julian_day()))
        .limit(1)
        .to_owned();
    query_one(conn, &select)
        .await?
        .as_ref()
        .map(read_day)
        .transpose()
}

/// Get-or-create for the day of `date`, run on the caller's transaction.
async fn ensure_day_in<C>(conn: &C, date: DayDate) -> PlannerResult<Day>
where
    C: ConnectionTrait,
{
    if let Some(day) = fetch_day_by_date(conn, date).await? {
        return Ok(day);
    }
    let insert = Query::insert()
        .into_table(PlannerDays::Table)
        .columns([PlannerDays::Date])
        .values_panic([date.to_julian_day().into()])
        .on_conflict(
            OnConflict::column(PlannerDays::Date)
                .do_nothing_on([PlannerDays::Date])
                .to_owned(),
        )
        .to_owned();
    exec(conn, &insert).await?;
    let day = fetch_day_by_date(conn, date)
        .await?
        .ok_or_else(|| PlannerError::storage(format!("day {date} missing after insert")))?;
    log::info!("ensured day {} for {date}", day.id);
    Ok(day)
}

fn build_connection_url(config: &PlannerConfig, base_dir: &Path) -> PlannerResult<String> {
    if let Some(url) = config.connection_url() {
        return Ok(url.to_string());
    }
    let path = config.sqlite_path(base_dir)?;
    Ok(format!("sqlite://{}?mode=rwc", path.display()))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::build_connection_url;
    use crate::{DatabaseConfig, PlannerConfig};

    #[test]
    fn sqlite_url_resolves_relative_paths() {
        let config = PlannerConfig::default_sqlite("planner.sqlite");
        let url = build_connection_url(&config, Path::new("/data")).expect("url");
        assert_eq!(url, "sqlite:///data/planner.sqlite?mode=rwc");
    }

    #[test]
    fn server_urls_pass_through() {
        let mut config = PlannerConfig::default_sqlite("unused");
        config.database = DatabaseConfig::Postgres {
            url: "postgres://localhost/planner".to_string(),
        };
        let url = build_connection_url(&config, Path::new("/data")).expect("url");
        assert_eq!(url, "postgres://localhost/planner");
    }
}
