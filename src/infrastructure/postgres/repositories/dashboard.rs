use anyhow::Result;
use async_trait::async_trait;
use diesel::{
    prelude::*,
    sql_query,
    sql_types::{BigInt, Text, Uuid as SqlUuid},
};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        repositories::dashboard::DashboardRepository,
        value_objects::dashboard::{
            DashboardSummary, MonthlyRevenue, MonthlyUserCount, PlanPurchaseCount,
        },
    },
    infrastructure::postgres::postgres_connection::PgPoolSquad,
};

// SUM over BIGINT yields NUMERIC in Postgres, hence the casts.
const LEDGER_TOTALS_SQL: &str = "\
SELECT (SELECT COUNT(*) FROM users WHERE role = 'user')::BIGINT AS total_users, \
       COUNT(*)::BIGINT AS total_purchases, \
       COUNT(DISTINCT user_id)::BIGINT AS subscribed_users, \
       COUNT(*) FILTER (WHERE is_active)::BIGINT AS active_subscriptions, \
       COALESCE(SUM(payment_amount_minor), 0)::BIGINT AS total_revenue_minor \
FROM subscriptions";

const PLAN_PURCHASES_SQL: &str = "\
SELECT p.id AS plan_id, p.name AS plan_name, COUNT(s.id)::BIGINT AS purchase_count \
FROM plans p \
LEFT JOIN subscriptions s ON s.plan_id = p.id \
GROUP BY p.id, p.name \
ORDER BY purchase_count DESC, p.name ASC";

// Thirteen UTC month buckets ending with the current month; empty months join to zero.
const MONTHLY_REVENUE_SQL: &str = "\
WITH months AS ( \
    SELECT generate_series( \
        date_trunc('month', now() AT TIME ZONE 'UTC') - interval '12 months', \
        date_trunc('month', now() AT TIME ZONE 'UTC'), \
        interval '1 month' \
    ) AS month_start \
) \
SELECT to_char(m.month_start, 'YYYY-MM') AS month, \
       COALESCE(SUM(s.payment_amount_minor), 0)::BIGINT AS amount \
FROM months m \
LEFT JOIN subscriptions s \
    ON date_trunc('month', s.created_at AT TIME ZONE 'UTC') = m.month_start \
GROUP BY m.month_start \
ORDER BY m.month_start ASC";

const MONTHLY_NEW_USERS_SQL: &str = "\
WITH months AS ( \
    SELECT generate_series( \
        date_trunc('month', now() AT TIME ZONE 'UTC') - interval '12 months', \
        date_trunc('month', now() AT TIME ZONE 'UTC'), \
        interval '1 month' \
    ) AS month_start \
) \
SELECT to_char(m.month_start, 'YYYY-MM') AS month, \
       COUNT(u.id)::BIGINT AS amount \
FROM months m \
LEFT JOIN users u \
    ON date_trunc('month', u.created_at AT TIME ZONE 'UTC') = m.month_start \
   AND u.role = 'user' \
GROUP BY m.month_start \
ORDER BY m.month_start ASC";

#[derive(QueryableByName)]
struct LedgerTotalsRow {
    #[diesel(sql_type = BigInt)]
    total_users: i64,
    #[diesel(sql_type = BigInt)]
    total_purchases: i64,
    #[diesel(sql_type = BigInt)]
    subscribed_users: i64,
    #[diesel(sql_type = BigInt)]
    active_subscriptions: i64,
    #[diesel(sql_type = BigInt)]
    total_revenue_minor: i64,
}

#[derive(QueryableByName)]
struct PlanPurchaseRow {
    #[diesel(sql_type = SqlUuid)]
    plan_id: Uuid,
    #[diesel(sql_type = Text)]
    plan_name: String,
    #[diesel(sql_type = BigInt)]
    purchase_count: i64,
}

#[derive(QueryableByName)]
struct MonthBucketRow {
    #[diesel(sql_type = Text)]
    month: String,
    #[diesel(sql_type = BigInt)]
    amount: i64,
}

pub struct DashboardPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl DashboardPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl DashboardRepository for DashboardPostgres {
    async fn summary(&self) -> Result<DashboardSummary> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<DashboardSummary> {
            let mut conn = db_pool.get()?;

            let totals = sql_query(LEDGER_TOTALS_SQL).get_result::<LedgerTotalsRow>(&mut conn)?;
            let plans = sql_query(PLAN_PURCHASES_SQL)
                .load::<PlanPurchaseRow>(&mut conn)?
                .into_iter()
                .map(|row| PlanPurchaseCount {
                    plan_id: row.plan_id,
                    plan_name: row.plan_name,
                    purchase_count: row.purchase_count,
                })
                .collect();

            let monthly_revenue = sql_query(MONTHLY_REVENUE_SQL)
                .load::<MonthBucketRow>(&mut conn)?
                .into_iter()
                .map(|row| MonthlyRevenue {
                    month: row.month,
                    revenue_minor: row.amount,
                })
                .collect();
            let monthly_new_users = sql_query(MONTHLY_NEW_USERS_SQL)
                .load::<MonthBucketRow>(&mut conn)?
                .into_iter()
                .map(|row| MonthlyUserCount {
                    month: row.month,
                    user_count: row.amount,
                })
                .collect();

            Ok(DashboardSummary {
                total_users: totals.total_users,
                total_purchases: totals.total_purchases,
                subscribed_users: totals.subscribed_users,
                active_subscriptions: totals.active_subscriptions,
                total_revenue_minor: totals.total_revenue_minor,
                plans,
                monthly_revenue,
                monthly_new_users,
            })
        })
        .await??)
    }
}
