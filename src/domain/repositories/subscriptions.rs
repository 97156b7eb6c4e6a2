use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::{
        InsertSubscriptionEntity, SubscriptionEntity, UpgradeSubscriptionEntity,
    },
    value_objects::subscriptions::{
        DecrementOutcome, ListSubscriptionsFilter, PurchaseOutcome, UpgradeOutcome,
    },
};

/// Write access to subscription rows. Every mutating method is a single atomic unit
/// against the store.
#[async_trait]
#[automock]
pub trait SubscriptionRepository {
    async fn find_by_id(&self, subscription_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    async fn find_active_by_user(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    async fn list_subscriptions(
        &self,
        filter: ListSubscriptionsFilter,
    ) -> Result<Vec<SubscriptionEntity>>;

    /// Inserts the row unless the user already holds an active subscription. The check and
    /// the insert are serialized per user.
    async fn create_if_no_active(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<PurchaseOutcome>;

    async fn apply_upgrade(
        &self,
        subscription_id: Uuid,
        upgrade_subscription_entity: UpgradeSubscriptionEntity,
    ) -> Result<UpgradeOutcome>;

    /// Takes one credit if any remain, deactivating the row when the balance reaches zero.
    async fn decrement_credit(&self, subscription_id: Uuid) -> Result<DecrementOutcome>;

    async fn delete_subscription(&self, subscription_id: Uuid) -> Result<bool>;
}
