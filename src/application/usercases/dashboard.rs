use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::{
    repositories::dashboard::DashboardRepository,
    value_objects::{dashboard::DashboardSummary, iam::Requester},
};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("access denied")]
    Forbidden,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DashboardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::Forbidden => StatusCode::FORBIDDEN,
            DashboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::Forbidden => "forbidden",
            DashboardError::Internal(_) => "internal",
        }
    }
}

pub struct DashboardUseCase<D>
where
    D: DashboardRepository + Send + Sync + 'static,
{
    dashboard_repo: Arc<D>,
}

impl<D> DashboardUseCase<D>
where
    D: DashboardRepository + Send + Sync + 'static,
{
    pub fn new(dashboard_repo: Arc<D>) -> Self {
        Self { dashboard_repo }
    }

    pub async fn summary(
        &self,
        requester: &Requester,
    ) -> Result<DashboardSummary, DashboardError> {
        if !requester.is_admin() {
            warn!(requester_id = %requester.user_id, "dashboard: admin role required");
            return Err(DashboardError::Forbidden);
        }

        let summary = self.dashboard_repo.summary().await.map_err(|err| {
            error!(db_error = ?err, "dashboard: failed to aggregate summary");
            DashboardError::Internal(err)
        })?;

        info!(
            total_users = summary.total_users,
            total_purchases = summary.total_purchases,
            active_subscriptions = summary.active_subscriptions,
            "dashboard: summary computed"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::domain::{
        repositories::dashboard::MockDashboardRepository,
        value_objects::{
            dashboard::{MonthlyRevenue, MonthlyUserCount},
            enums::roles::Role,
        },
    };

    #[tokio::test]
    async fn admin_receives_summary() {
        let mut dashboard_repo = MockDashboardRepository::new();
        dashboard_repo.expect_summary().times(1).returning(|| {
            Box::pin(async {
                Ok(DashboardSummary {
                    total_users: 4,
                    total_purchases: 3,
                    subscribed_users: 2,
                    active_subscriptions: 1,
                    total_revenue_minor: 30_000,
                    plans: vec![],
                    monthly_revenue: vec![MonthlyRevenue {
                        month: "2026-10".to_string(),
                        revenue_minor: 30_000,
                    }],
                    monthly_new_users: vec![MonthlyUserCount {
                        month: "2026-10".to_string(),
                        user_count: 4,
                    }],
                })
            })
        });

        let usecase = DashboardUseCase::new(Arc::new(dashboard_repo));
        let summary = usecase
            .summary(&Requester::new(Uuid::new_v4(), Role::Admin))
            .await
            .unwrap();

        assert_eq!(summary.total_users, 4);
        assert_eq!(summary.total_purchases, 3);
        assert_eq!(summary.total_revenue_minor, 30_000);
        assert_eq!(summary.monthly_revenue[0].revenue_minor, 30_000);
    }

    #[tokio::test]
    async fn users_are_denied() {
        let mut dashboard_repo = MockDashboardRepository::new();
        dashboard_repo.expect_summary().never();

        let usecase = DashboardUseCase::new(Arc::new(dashboard_repo));
        let err = usecase
            .summary(&Requester::new(Uuid::new_v4(), Role::User))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
