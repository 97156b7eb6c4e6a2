use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    repositories::plans::PlanRepository,
    value_objects::{
        iam::Requester,
        plans::{InsertPlanModel, PlanDeleteOutcome, PlanDto, UpdatePlanModel},
    },
};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan not found")]
    NotFound,
    #[error("plan is still referenced by subscriptions")]
    InUse,
    #[error("{0}")]
    Validation(String),
    #[error("access denied")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PlanError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PlanError::NotFound => StatusCode::NOT_FOUND,
            PlanError::InUse => StatusCode::CONFLICT,
            PlanError::Validation(_) => StatusCode::BAD_REQUEST,
            PlanError::Forbidden => StatusCode::FORBIDDEN,
            PlanError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PlanError::NotFound => "not_found",
            PlanError::InUse => "conflict",
            PlanError::Validation(_) => "validation_failure",
            PlanError::Forbidden => "forbidden",
            PlanError::Internal(_) => "internal",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PlanError>;

pub struct PlanUseCase<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
}

impl<P> PlanUseCase<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    pub fn new(plan_repo: Arc<P>) -> Self {
        Self { plan_repo }
    }

    pub async fn create_plan(
        &self,
        requester: &Requester,
        model: InsertPlanModel,
    ) -> UseCaseResult<PlanDto> {
        Self::ensure_admin(requester)?;
        model.validate().map_err(PlanError::Validation)?;

        let plan = self
            .plan_repo
            .create_plan(model.to_entity())
            .await
            .map_err(|err| {
                error!(plan_name = %model.plan_name, db_error = ?err, "plans: failed to create plan");
                PlanError::Internal(err)
            })?;

        info!(
            plan_id = %plan.id,
            plan_name = %plan.name,
            credit_allowance = plan.credit_allowance,
            "plans: plan created"
        );
        Ok(plan.into())
    }

    pub async fn list_plans(&self) -> UseCaseResult<Vec<PlanDto>> {
        let plans = self.plan_repo.list_plans().await.map_err(|err| {
            error!(db_error = ?err, "plans: failed to list plans");
            PlanError::Internal(err)
        })?;

        Ok(plans.into_iter().map(PlanDto::from).collect())
    }

    pub async fn get_plan(&self, plan_id: Uuid) -> UseCaseResult<PlanDto> {
        self.plan_repo
            .find_by_id(plan_id)
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "plans: failed to load plan");
                PlanError::Internal(err)
            })?
            .map(PlanDto::from)
            .ok_or(PlanError::NotFound)
    }

    /// Changes apply to future purchases only; existing subscriptions keep their snapshot.
    pub async fn update_plan(
        &self,
        requester: &Requester,
        plan_id: Uuid,
        model: UpdatePlanModel,
    ) -> UseCaseResult<PlanDto> {
        Self::ensure_admin(requester)?;
        model.validate().map_err(PlanError::Validation)?;

        let plan = self
            .plan_repo
            .update_plan(plan_id, model.to_entity())
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "plans: failed to update plan");
                PlanError::Internal(err)
            })?
            .ok_or(PlanError::NotFound)?;

        info!(%plan_id, "plans: plan updated");
        Ok(plan.into())
    }

    pub async fn delete_plan(&self, requester: &Requester, plan_id: Uuid) -> UseCaseResult<()> {
        Self::ensure_admin(requester)?;

        let outcome = self.plan_repo.delete_plan(plan_id).await.map_err(|err| {
            error!(%plan_id, db_error = ?err, "plans: failed to delete plan");
            PlanError::Internal(err)
        })?;

        match outcome {
            PlanDeleteOutcome::Deleted => {
                info!(%plan_id, "plans: plan deleted");
                Ok(())
            }
            PlanDeleteOutcome::NotFound => Err(PlanError::NotFound),
            PlanDeleteOutcome::InUse => {
                warn!(%plan_id, "plans: plan still referenced by subscriptions");
                Err(PlanError::InUse)
            }
        }
    }

    fn ensure_admin(requester: &Requester) -> UseCaseResult<()> {
        if !requester.is_admin() {
            warn!(requester_id = %requester.user_id, "plans: admin role required");
            return Err(PlanError::Forbidden);
        }
        Ok(())
    }
}
