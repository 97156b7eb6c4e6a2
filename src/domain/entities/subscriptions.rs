use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::subscriptions;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub plan_name: String,
    pub payment_amount_minor: i64,
    pub payment_gateway_id: Option<String>,
    pub payment_on: DateTime<Utc>,
    pub is_active: bool,
    pub total_credits: i32,
    pub current_credits: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct InsertSubscriptionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub plan_name: String,
    pub payment_amount_minor: i64,
    pub payment_gateway_id: Option<String>,
    pub payment_on: DateTime<Utc>,
    pub is_active: bool,
    pub total_credits: i32,
    pub current_credits: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Replaces the plan and resets the balance of an existing row.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = subscriptions, treat_none_as_null = true)]
pub struct UpgradeSubscriptionEntity {
    pub plan_id: Uuid,
    pub plan_name: String,
    pub payment_amount_minor: i64,
    pub payment_gateway_id: Option<String>,
    pub payment_on: DateTime<Utc>,
    pub is_active: bool,
    pub total_credits: i32,
    pub current_credits: i32,
    pub updated_at: DateTime<Utc>,
}
