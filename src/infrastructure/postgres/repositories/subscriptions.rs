use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{
    dsl::{exists, select},
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
    sql_query,
    sql_types::Text,
};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::subscriptions::{
            InsertSubscriptionEntity, SubscriptionEntity, UpgradeSubscriptionEntity,
        },
        repositories::subscriptions::SubscriptionRepository,
        value_objects::subscriptions::{
            DecrementOutcome, ListSubscriptionsFilter, PurchaseOutcome, UpgradeOutcome,
        },
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::subscriptions},
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

/// Serializes every ledger write for one user until the surrounding transaction ends.
fn lock_user_ledger(conn: &mut PgConnection, user_id: Uuid) -> QueryResult<()> {
    sql_query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind::<Text, _>(user_id.to_string())
        .execute(conn)?;
    Ok(())
}

fn is_unique_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_by_id(&self, subscription_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(
            task::spawn_blocking(move || -> Result<Option<SubscriptionEntity>> {
                let mut conn = db_pool.get()?;

                let subscription = subscriptions::table
                    .find(subscription_id)
                    .select(SubscriptionEntity::as_select())
                    .first::<SubscriptionEntity>(&mut conn)
                    .optional()?;

                Ok(subscription)
            })
            .await??,
        )
    }

    async fn find_active_by_user(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(
            task::spawn_blocking(move || -> Result<Option<SubscriptionEntity>> {
                let mut conn = db_pool.get()?;

                let subscription = subscriptions::table
                    .filter(subscriptions::user_id.eq(user_id))
                    .filter(subscriptions::is_active.eq(true))
                    .order(subscriptions::created_at.desc())
                    .select(SubscriptionEntity::as_select())
                    .first::<SubscriptionEntity>(&mut conn)
                    .optional()?;

                Ok(subscription)
            })
            .await??,
        )
    }

    async fn list_subscriptions(
        &self,
        filter: ListSubscriptionsFilter,
    ) -> Result<Vec<SubscriptionEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(
            task::spawn_blocking(move || -> Result<Vec<SubscriptionEntity>> {
                let mut conn = db_pool.get()?;

                let mut query = subscriptions::table
                    .select(SubscriptionEntity::as_select())
                    .order(subscriptions::created_at.desc())
                    .into_boxed();

                if let Some(user_id) = filter.user_id {
                    query = query.filter(subscriptions::user_id.eq(user_id));
                }

                Ok(query.load::<SubscriptionEntity>(&mut conn)?)
            })
            .await??,
        )
    }

    async fn create_if_no_active(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<PurchaseOutcome> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<PurchaseOutcome> {
            let mut conn = db_pool.get()?;
            let user_id = insert_subscription_entity.user_id;

            let result = conn.transaction::<PurchaseOutcome, DieselError, _>(|conn| {
                lock_user_ledger(conn, user_id)?;

                let has_active = select(exists(
                    subscriptions::table
                        .filter(subscriptions::user_id.eq(user_id))
                        .filter(subscriptions::is_active.eq(true)),
                ))
                .get_result::<bool>(conn)?;

                if has_active {
                    return Ok(PurchaseOutcome::AlreadySubscribed);
                }

                let created = diesel::insert_into(subscriptions::table)
                    .values(&insert_subscription_entity)
                    .returning(SubscriptionEntity::as_returning())
                    .get_result::<SubscriptionEntity>(conn)?;

                Ok(PurchaseOutcome::Created(created))
            });

            match result {
                Ok(outcome) => Ok(outcome),
                // subscriptions_one_active_per_user
                Err(err) if is_unique_violation(&err) => Ok(PurchaseOutcome::AlreadySubscribed),
                Err(err) => Err(err.into()),
            }
        })
        .await??)
    }

    async fn apply_upgrade(
        &self,
        subscription_id: Uuid,
        upgrade_subscription_entity: UpgradeSubscriptionEntity,
    ) -> Result<UpgradeOutcome> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<UpgradeOutcome> {
            let mut conn = db_pool.get()?;

            let result = conn.transaction::<UpgradeOutcome, DieselError, _>(|conn| {
                let current = subscriptions::table
                    .find(subscription_id)
                    .select(SubscriptionEntity::as_select())
                    .for_update()
                    .first::<SubscriptionEntity>(conn)
                    .optional()?;

                let Some(current) = current else {
                    return Ok(UpgradeOutcome::NotFound);
                };

                lock_user_ledger(conn, current.user_id)?;

                if upgrade_subscription_entity.is_active {
                    let other_active = select(exists(
                        subscriptions::table
                            .filter(subscriptions::user_id.eq(current.user_id))
                            .filter(subscriptions::id.ne(subscription_id))
                            .filter(subscriptions::is_active.eq(true)),
                    ))
                    .get_result::<bool>(conn)?;

                    if other_active {
                        return Ok(UpgradeOutcome::AlreadySubscribed);
                    }
                }

                let upgraded = diesel::update(subscriptions::table.find(subscription_id))
                    .set(&upgrade_subscription_entity)
                    .returning(SubscriptionEntity::as_returning())
                    .get_result::<SubscriptionEntity>(conn)?;

                Ok(UpgradeOutcome::Upgraded(upgraded))
            });

            match result {
                Ok(outcome) => Ok(outcome),
                Err(err) if is_unique_violation(&err) => Ok(UpgradeOutcome::AlreadySubscribed),
                Err(err) => Err(err.into()),
            }
        })
        .await??)
    }

    async fn decrement_credit(&self, subscription_id: Uuid) -> Result<DecrementOutcome> {
        let db_pool = Arc::clone(&self.db_pool);
        let now = Utc::now();

        Ok(task::spawn_blocking(move || -> Result<DecrementOutcome> {
            let mut conn = db_pool.get()?;

            // Both SET expressions read the pre-update row.
            let decremented = diesel::update(
                subscriptions::table
                    .filter(subscriptions::id.eq(subscription_id))
                    .filter(subscriptions::current_credits.gt(0)),
            )
            .set((
                subscriptions::current_credits.eq(subscriptions::current_credits - 1),
                subscriptions::is_active
                    .eq(subscriptions::is_active.and(subscriptions::current_credits.gt(1))),
                subscriptions::updated_at.eq(now),
            ))
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)
            .optional()?;

            if let Some(subscription) = decremented {
                return Ok(DecrementOutcome::Decremented(subscription));
            }

            let exists_row = select(exists(subscriptions::table.find(subscription_id)))
                .get_result::<bool>(&mut conn)?;

            if exists_row {
                Ok(DecrementOutcome::NoCreditsRemaining)
            } else {
                Ok(DecrementOutcome::NotFound)
            }
        })
        .await??)
    }

    async fn delete_subscription(&self, subscription_id: Uuid) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let deleted = diesel::delete(subscriptions::table.find(subscription_id))
                .execute(&mut conn)?;

            Ok(deleted > 0)
        })
        .await??)
    }
}
