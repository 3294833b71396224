use sea_orm_migration::prelude::*;

use crate::db::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlannerDays::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlannerDays::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlannerDays::Date)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlannerActivities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlannerActivities::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlannerActivities::DayId).big_integer().null())
                    .col(ColumnDef::new(PlannerActivities::Name).text().not_null())
                    .col(ColumnDef::new(PlannerActivities::Time).text().not_null())
                    .col(
                        ColumnDef::new(PlannerActivities::Index)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Not unique: range shifts pass through transient duplicates mid-statement.
        manager
            .create_index(
                Index::create()
                    .name("planner_activities_scope_index_idx")
                    .table(PlannerActivities::Table)
                    .col(PlannerActivities::DayId)
                    .col(PlannerActivities::Index)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(PlannerActivities::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(PlannerDays::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
