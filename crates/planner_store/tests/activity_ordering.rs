use std::path::Path;

use chronocat_planner_store::{
    Activity, ActivityApi, ActivityId, CreateActivityInput, DayApi, DayDate, PlannerConfig,
    PlannerError, PlannerResult, PlannerStore, Scope, UpdateActivityInput,
};
use tempfile::tempdir;

async fn open_store(base: &Path) -> PlannerResult<PlannerStore> {
    let config = PlannerConfig::default_sqlite(base.join("planner.sqlite").to_string_lossy());
    PlannerStore::connect(&config, base).await
}

async fn seed(
    store: &PlannerStore,
    scope: Scope,
    names: &[&str],
) -> PlannerResult<Vec<Activity>> {
    let mut created = Vec::new();
    for name in names {
        let activity = store
            .create_activity(CreateActivityInput::new(*name, "09:00").in_scope(scope))
            .await?;
        created.push(activity);
    }
    Ok(created)
}

async fn order(store: &PlannerStore, scope: Scope) -> PlannerResult<Vec<(String, u32)>> {
    Ok(store
        .list_activities(Some(scope))
        .await?
        .into_iter()
        .map(|activity| (activity.name, activity.index))
        .collect())
}

fn expected(names: &[&str]) -> Vec<(String, u32)> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| (name.to_string(), index as u32))
        .collect()
}

#[tokio::test]
async fn append_into_empty_scope_gets_index_zero() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let activity = store
        .create_activity(CreateActivityInput::new("a", "08:00").in_scope(Scope::Global))
        .await?;
    assert_eq!(activity.index, 0);
    assert_eq!(activity.scope, Scope::Global);
    assert_eq!(store.count_activities(Scope::Global).await?, 1);
    Ok(())
}

#[tokio::test]
async fn insert_at_index_pushes_later_siblings_back() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    seed(&store, Scope::Global, &["a", "b", "c"]).await?;

    let inserted = store
        .create_activity(
            CreateActivityInput::new("new", "10:00")
                .in_scope(Scope::Global)
                .at_index(1),
        )
        .await?;
    assert_eq!(inserted.index, 1);
    assert_eq!(
        order(&store, Scope::Global).await?,
        expected(&["a", "new", "b", "c"])
    );
    store.verify_density(Scope::Global).await?;
    Ok(())
}

#[tokio::test]
async fn insert_at_count_appends() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    seed(&store, Scope::Global, &["a", "b"]).await?;
    let inserted = store
        .create_activity(
            CreateActivityInput::new("c", "10:00")
                .in_scope(Scope::Global)
                .at_index(2),
        )
        .await?;
    assert_eq!(inserted.index, 2);
    assert_eq!(order(&store, Scope::Global).await?, expected(&["a", "b", "c"]));
    Ok(())
}

#[tokio::test]
async fn delete_pulls_later_siblings_forward() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let created = seed(&store, Scope::Global, &["a", "b", "c"]).await?;

    store.delete_activity(created[1].id).await?;
    assert_eq!(order(&store, Scope::Global).await?, expected(&["a", "c"]));
    assert!(store.get_activity(created[1].id).await?.is_none());
    store.verify_density(Scope::Global).await?;
    Ok(())
}

#[tokio::test]
async fn deleting_missing_activity_is_a_noop() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    seed(&store, Scope::Global, &["a", "b"]).await?;
    let before = store.list_activities(None).await?;

    store.delete_activity(ActivityId(9_999)).await?;
    store.delete_activity(ActivityId(9_999)).await?;

    assert_eq!(store.list_activities(None).await?, before);
    Ok(())
}

#[tokio::test]
async fn moving_forward_closes_gap_behind() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let created = seed(&store, Scope::Global, &["a", "b", "c", "d"]).await?;

    let moved = store.move_activity(created[0].id, 2).await?;
    assert_eq!(moved.index, 2);
    assert_eq!(
        order(&store, Scope::Global).await?,
        expected(&["b", "c", "a", "d"])
    );
    Ok(())
}

#[tokio::test]
async fn moving_backward_opens_slot() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let created = seed(&store, Scope::Global, &["a", "b", "c", "d"]).await?;

    let moved = store.move_activity(created[3].id, 1).await?;
    assert_eq!(moved.index, 1);
    assert_eq!(
        order(&store, Scope::Global).await?,
        expected(&["a", "d", "b", "c"])
    );
    Ok(())
}

#[tokio::test]
async fn moving_to_current_index_changes_nothing() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let created = seed(&store, Scope::Global, &["a", "b", "c"]).await?;
    let before = store.list_activities(Some(Scope::Global)).await?;

    let moved = store.move_activity(created[1].id, 1).await?;
    assert_eq!(moved, created[1]);
    assert_eq!(store.list_activities(Some(Scope::Global)).await?, before);
    Ok(())
}

#[tokio::test]
async fn moving_missing_activity_reports_not_found() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let err = store
        .move_activity(ActivityId(42), 0)
        .await
        .expect_err("missing activity");
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn out_of_range_indices_are_rejected_without_changes() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let created = seed(&store, Scope::Global, &["a", "b", "c"]).await?;
    let before = store.list_activities(Some(Scope::Global)).await?;

    let err = store
        .create_activity(
            CreateActivityInput::new("gap", "12:00")
                .in_scope(Scope::Global)
                .at_index(4),
        )
        .await
        .expect_err("gap-creating insert");
    assert!(matches!(err, PlannerError::InvalidIndex { index: 4, max: 3 }));

    let err = store
        .move_activity(created[0].id, 3)
        .await
        .expect_err("move past end");
    assert!(matches!(err, PlannerError::InvalidIndex { index: 3, max: 2 }));

    assert_eq!(store.list_activities(Some(Scope::Global)).await?, before);
    Ok(())
}

#[tokio::test]
async fn update_edits_payload_and_index_together() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let created = seed(&store, Scope::Global, &["a", "b", "c"]).await?;

    let updated = store
        .update_activity(
            created[2].id,
            UpdateActivityInput {
                name: Some("lunch".to_string()),
                time: Some("12:30".to_string()),
                index: Some(0),
            },
        )
        .await?;
    assert_eq!(updated.name, "lunch");
    assert_eq!(updated.time, "12:30");
    assert_eq!(updated.index, 0);
    assert_eq!(
        order(&store, Scope::Global).await?,
        expected(&["lunch", "a", "b"])
    );

    let renamed = store
        .update_activity(
            created[0].id,
            UpdateActivityInput {
                name: Some("breakfast".to_string()),
                ..UpdateActivityInput::default()
            },
        )
        .await?;
    assert_eq!(renamed.index, 1);
    assert_eq!(renamed.time, "09:00");
    let stored = store.get_activity(created[0].id).await?.expect("stored");
    assert_eq!(stored, renamed);
    Ok(())
}

#[tokio::test]
async fn empty_update_returns_stored_activity() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let created = seed(&store, Scope::Global, &["a", "b"]).await?;

    let unchanged = store
        .update_activity(created[1].id, UpdateActivityInput::default())
        .await?;
    assert_eq!(unchanged, created[1]);
    assert_eq!(order(&store, Scope::Global).await?, expected(&["a", "b"]));

    let err = store
        .update_activity(ActivityId(999), UpdateActivityInput::default())
        .await
        .expect_err("missing activity");
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn scopes_keep_independent_orderings() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let monday = store
        .ensure_day(DayDate::parse("2025-06-02").expect("date"))
        .await?;
    let tuesday = store
        .ensure_day(DayDate::parse("2025-06-03").expect("date"))
        .await?;
    let mon = seed(&store, monday.scope(), &["m0", "m1", "m2"]).await?;
    seed(&store, tuesday.scope(), &["t0", "t1"]).await?;
    seed(&store, Scope::Global, &["g0"]).await?;

    store.move_activity(mon[0].id, 2).await?;
    store.delete_activity(mon[1].id).await?;
    store
        .create_activity(
            CreateActivityInput::new("t-new", "07:00")
                .in_scope(tuesday.scope())
                .at_index(0),
        )
        .await?;

    assert_eq!(order(&store, monday.scope()).await?, expected(&["m2", "m0"]));
    assert_eq!(
        order(&store, tuesday.scope()).await?,
        expected(&["t-new", "t0", "t1"])
    );
    assert_eq!(order(&store, Scope::Global).await?, expected(&["g0"]));
    for scope in [monday.scope(), tuesday.scope(), Scope::Global] {
        store.verify_density(scope).await?;
    }

    let all = store.list_activities(None).await?;
    assert_eq!(all.len(), 6);
    assert!(all.windows(2).all(|pair| pair[0].index <= pair[1].index));
    Ok(())
}

#[tokio::test]
async fn creating_in_unknown_day_is_rejected() -> PlannerResult<()> {
    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let err = store
        .create_activity(
            CreateActivityInput::new("orphan", "09:00")
                .in_scope(Scope::Day(chronocat_planner_store::DayId(77))),
        )
        .await
        .expect_err("unknown day");
    assert!(err.is_not_found());
    assert_eq!(store.list_activities(None).await?.len(), 0);
    Ok(())
}

#[tokio::test]
async fn mixed_operations_match_reference_model() -> PlannerResult<()> {
    enum Step {
        Append(&'static str),
        Insert(&'static str, u32),
        Delete(usize),
        Move(usize, u32),
    }

    let dir = tempdir().expect("tempdir");
    let store = open_store(dir.path()).await?;
    let scope = Scope::Global;
    let mut model: Vec<Activity> = Vec::new();
    let steps = [
        Step::Append("a"),
        Step::Append("b"),
        Step::Insert("c", 0),
        Step::Append("d"),
        Step::Move(0, 3),
        Step::Insert("e", 2),
        Step::Delete(1),
        Step::Move(3, 0),
        Step::Append("f"),
        Step::Delete(0),
        Step::Move(2, 2),
        Step::Insert("g", 4),
        Step::Move(4, 1),
        Step::Delete(3),
    ];

    for step in steps {
        match step {
            Step::Append(name) => {
                let created = store
                    .create_activity(CreateActivityInput::new(name, "").in_scope(scope))
                    .await?;
                model.push(created);
            }
            Step::Insert(name, index) => {
                let created = store
                    .create_activity(
                        CreateActivityInput::new(name, "")
                            .in_scope(scope)
                            .at_index(index),
                    )
                    .await?;
                model.insert(index as usize, created);
            }
            Step::Delete(position) => {
                let removed = model.remove(position);
                store.delete_activity(removed.id).await?;
            }
            Step::Move(position, index) => {
                let moving = model.remove(position);
                store.move_activity(moving.id, index).await?;
                model.insert(index as usize, moving);
            }
        }
        store.verify_density(scope).await?;
        let stored: Vec<ActivityId> = store
            .list_activities(Some(scope))
            .await?
            .into_iter()
            .map(|activity| activity.id)
            .collect();
        let modeled: Vec<ActivityId> = model.iter().map(|activity| activity.id).collect();
        assert_eq!(stored, modeled);
    }
    Ok(())
}
