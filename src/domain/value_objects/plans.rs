use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::plans::{InsertPlanEntity, PlanEntity, UpdatePlanEntity};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsertPlanModel {
    pub plan_name: String,
    pub plan_rate: i64,
    pub credit_allowance: i32,
    pub description: Option<String>,
}

impl InsertPlanModel {
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.plan_name)?;
        validate_rate(self.plan_rate)?;
        validate_allowance(self.credit_allowance)
    }

    pub fn to_entity(&self) -> InsertPlanEntity {
        let now = Utc::now();
        InsertPlanEntity {
            id: Uuid::new_v4(),
            name: self.plan_name.trim().to_string(),
            rate_minor: self.plan_rate,
            credit_allowance: self.credit_allowance,
            description: self.description.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdatePlanModel {
    pub plan_name: Option<String>,
    pub plan_rate: Option<i64>,
    pub credit_allowance: Option<i32>,
    pub description: Option<String>,
}

impl UpdatePlanModel {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.plan_name {
            validate_name(name)?;
        }
        if let Some(rate) = self.plan_rate {
            validate_rate(rate)?;
        }
        if let Some(allowance) = self.credit_allowance {
            validate_allowance(allowance)?;
        }
        Ok(())
    }

    pub fn to_entity(&self) -> UpdatePlanEntity {
        UpdatePlanEntity {
            name: self.plan_name.as_ref().map(|name| name.trim().to_string()),
            rate_minor: self.plan_rate,
            credit_allowance: self.credit_allowance,
            description: self.description.clone(),
            updated_at: Utc::now(),
        }
    }
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("plan_name must not be empty".to_string());
    }
    Ok(())
}

fn validate_rate(rate: i64) -> Result<(), String> {
    if rate <= 0 {
        return Err("plan_rate must be a positive number".to_string());
    }
    Ok(())
}

fn validate_allowance(allowance: i32) -> Result<(), String> {
    if allowance < 1 {
        return Err("credit_allowance must be a positive integer".to_string());
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanDto {
    pub plan_id: Uuid,
    pub plan_name: String,
    pub plan_rate: i64,
    pub credit_allowance: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlanEntity> for PlanDto {
    fn from(value: PlanEntity) -> Self {
        Self {
            plan_id: value.id,
            plan_name: value.name,
            plan_rate: value.rate_minor,
            credit_allowance: value.credit_allowance,
            description: value.description,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Result of an attempt to remove a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanDeleteOutcome {
    Deleted,
    NotFound,
    /// Subscriptions still reference the plan.
    InUse,
}
