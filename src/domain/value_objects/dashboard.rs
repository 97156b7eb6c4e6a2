use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    /// Accounts with the `user` role; admins are not counted.
    pub total_users: i64,
    pub total_purchases: i64,
    pub subscribed_users: i64,
    pub active_subscriptions: i64,
    pub total_revenue_minor: i64,
    pub plans: Vec<PlanPurchaseCount>,
    /// The current month and the twelve before it, oldest first. Months without activity
    /// are reported as zero.
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub monthly_new_users: Vec<MonthlyUserCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanPurchaseCount {
    pub plan_id: Uuid,
    pub plan_name: String,
    pub purchase_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`, UTC.
    pub month: String,
    pub revenue_minor: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyUserCount {
    pub month: String,
    pub user_count: i64,
}
