use anyhow::Result;
use async_trait::async_trait;
use diesel::{
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::plans::{InsertPlanEntity, PlanEntity, UpdatePlanEntity},
        repositories::plans::PlanRepository,
        value_objects::plans::PlanDeleteOutcome,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::plans},
};

pub struct PlanPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlanPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PlanRepository for PlanPostgres {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<PlanEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<PlanEntity>> {
            let mut conn = db_pool.get()?;

            let plan = plans::table
                .find(plan_id)
                .select(PlanEntity::as_select())
                .first::<PlanEntity>(&mut conn)
                .optional()?;

            Ok(plan)
        })
        .await??)
    }

    async fn list_plans(&self) -> Result<Vec<PlanEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<PlanEntity>> {
            let mut conn = db_pool.get()?;

            let plans = plans::table
                .select(PlanEntity::as_select())
                .order(plans::created_at.asc())
                .load::<PlanEntity>(&mut conn)?;

            Ok(plans)
        })
        .await??)
    }

    async fn create_plan(&self, insert_plan_entity: InsertPlanEntity) -> Result<PlanEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<PlanEntity> {
            let mut conn = db_pool.get()?;

            let plan = diesel::insert_into(plans::table)
                .values(&insert_plan_entity)
                .returning(PlanEntity::as_returning())
                .get_result::<PlanEntity>(&mut conn)?;

            Ok(plan)
        })
        .await??)
    }

    async fn update_plan(
        &self,
        plan_id: Uuid,
        update_plan_entity: UpdatePlanEntity,
    ) -> Result<Option<PlanEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<PlanEntity>> {
            let mut conn = db_pool.get()?;

            let plan = diesel::update(plans::table.find(plan_id))
                .set(&update_plan_entity)
                .returning(PlanEntity::as_returning())
                .get_result::<PlanEntity>(&mut conn)
                .optional()?;

            Ok(plan)
        })
        .await??)
    }

    async fn delete_plan(&self, plan_id: Uuid) -> Result<PlanDeleteOutcome> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<PlanDeleteOutcome> {
            let mut conn = db_pool.get()?;

            match diesel::delete(plans::table.find(plan_id)).execute(&mut conn) {
                Ok(0) => Ok(PlanDeleteOutcome::NotFound),
                Ok(_) => Ok(PlanDeleteOutcome::Deleted),
                Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                    Ok(PlanDeleteOutcome::InUse)
                }
                Err(err) => Err(err.into()),
            }
        })
        .await??)
    }
}
