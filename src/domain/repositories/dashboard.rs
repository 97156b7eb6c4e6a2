use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::dashboard::DashboardSummary;

#[async_trait]
#[automock]
pub trait DashboardRepository {
    async fn summary(&self) -> Result<DashboardSummary>;
}
