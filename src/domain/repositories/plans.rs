use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::plans::{InsertPlanEntity, PlanEntity, UpdatePlanEntity},
    value_objects::plans::PlanDeleteOutcome,
};

#[async_trait]
#[automock]
pub trait PlanRepository {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<PlanEntity>>;
    async fn list_plans(&self) -> Result<Vec<PlanEntity>>;
    async fn create_plan(&self, insert_plan_entity: InsertPlanEntity) -> Result<PlanEntity>;
    async fn update_plan(
        &self,
        plan_id: Uuid,
        update_plan_entity: UpdatePlanEntity,
    ) -> Result<Option<PlanEntity>>;
    async fn delete_plan(&self, plan_id: Uuid) -> Result<PlanDeleteOutcome>;
}
