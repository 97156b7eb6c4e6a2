use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use mockall::predicate::eq;

use super::*;
use crate::{
    domain::{
        entities::plans::{InsertPlanEntity, UpdatePlanEntity},
        repositories::{plans::MockPlanRepository, subscriptions::MockSubscriptionRepository},
        value_objects::{enums::roles::Role, plans::PlanDeleteOutcome},
    },
    payments::{MockPaymentGateway, placeholder::PlaceholderGateway, signature::order_signature},
};

const GATEWAY_SECRET: &str = "test_secret";
const CURRENCY: &str = "INR";

/// Plan catalog double backed by a fixed list.
struct InMemoryPlans {
    plans: Vec<PlanEntity>,
}

#[async_trait]
impl PlanRepository for InMemoryPlans {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<PlanEntity>> {
        Ok(self.plans.iter().find(|plan| plan.id == plan_id).cloned())
    }

    async fn list_plans(&self) -> Result<Vec<PlanEntity>> {
        Ok(self.plans.clone())
    }

    async fn create_plan(&self, _insert_plan_entity: InsertPlanEntity) -> Result<PlanEntity> {
        Err(anyhow!("read-only catalog"))
    }

    async fn update_plan(
        &self,
        _plan_id: Uuid,
        _update_plan_entity: UpdatePlanEntity,
    ) -> Result<Option<PlanEntity>> {
        Err(anyhow!("read-only catalog"))
    }

    async fn delete_plan(&self, _plan_id: Uuid) -> Result<PlanDeleteOutcome> {
        Err(anyhow!("read-only catalog"))
    }
}

/// Subscription store double. Each method holds the lock for its whole check-and-write, which
/// gives the same atomicity the Postgres repository gets from its transactions.
#[derive(Default)]
struct InMemoryLedger {
    rows: Mutex<Vec<SubscriptionEntity>>,
}

impl InMemoryLedger {
    fn insert(&self, row: SubscriptionEntity) {
        self.rows.lock().unwrap().push(row);
    }

    fn get(&self, subscription_id: Uuid) -> Option<SubscriptionEntity> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == subscription_id)
            .cloned()
    }

    fn rows_for(&self, user_id: Uuid) -> Vec<SubscriptionEntity> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect()
    }

    fn active_for(&self, user_id: Uuid) -> Vec<SubscriptionEntity> {
        self.rows_for(user_id)
            .into_iter()
            .filter(|row| row.is_active)
            .collect()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryLedger {
    async fn find_by_id(&self, subscription_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        Ok(self.get(subscription_id))
    }

    async fn find_active_by_user(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        Ok(self.active_for(user_id).into_iter().next())
    }

    async fn list_subscriptions(
        &self,
        filter: ListSubscriptionsFilter,
    ) -> Result<Vec<SubscriptionEntity>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| filter.user_id.is_none_or(|user_id| row.user_id == user_id))
            .cloned()
            .collect())
    }

    async fn create_if_no_active(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<PurchaseOutcome> {
        let mut rows = self.rows.lock().unwrap();
        let user_id = insert_subscription_entity.user_id;
        if rows.iter().any(|row| row.user_id == user_id && row.is_active) {
            return Ok(PurchaseOutcome::AlreadySubscribed);
        }

        let e = insert_subscription_entity;
        let row = SubscriptionEntity {
            id: e.id,
            user_id: e.user_id,
            plan_id: e.plan_id,
            plan_name: e.plan_name,
            payment_amount_minor: e.payment_amount_minor,
            payment_gateway_id: e.payment_gateway_id,
            payment_on: e.payment_on,
            is_active: e.is_active,
            total_credits: e.total_credits,
            current_credits: e.current_credits,
            created_at: e.created_at,
            updated_at: e.updated_at,
        };
        rows.push(row.clone());
        Ok(PurchaseOutcome::Created(row))
    }

    async fn apply_upgrade(
        &self,
        subscription_id: Uuid,
        upgrade_subscription_entity: UpgradeSubscriptionEntity,
    ) -> Result<UpgradeOutcome> {
        let mut rows = self.rows.lock().unwrap();
        let Some(index) = rows.iter().position(|row| row.id == subscription_id) else {
            return Ok(UpgradeOutcome::NotFound);
        };

        let user_id = rows[index].user_id;
        let other_active = rows
            .iter()
            .any(|row| row.user_id == user_id && row.id != subscription_id && row.is_active);
        if upgrade_subscription_entity.is_active && other_active {
            return Ok(UpgradeOutcome::AlreadySubscribed);
        }

        let u = upgrade_subscription_entity;
        let row = &mut rows[index];
        row.plan_id = u.plan_id;
        row.plan_name = u.plan_name;
        row.payment_amount_minor = u.payment_amount_minor;
        row.payment_gateway_id = u.payment_gateway_id;
        row.payment_on = u.payment_on;
        row.is_active = u.is_active;
        row.total_credits = u.total_credits;
        row.current_credits = u.current_credits;
        row.updated_at = u.updated_at;
        Ok(UpgradeOutcome::Upgraded(row.clone()))
    }

    async fn decrement_credit(&self, subscription_id: Uuid) -> Result<DecrementOutcome> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|row| row.id == subscription_id) else {
            return Ok(DecrementOutcome::NotFound);
        };
        if row.current_credits == 0 {
            return Ok(DecrementOutcome::NoCreditsRemaining);
        }

        row.current_credits -= 1;
        row.is_active = row.is_active && row.current_credits > 0;
        row.updated_at = Utc::now();
        Ok(DecrementOutcome::Decremented(row.clone()))
    }

    async fn delete_subscription(&self, subscription_id: Uuid) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id != subscription_id);
        Ok(rows.len() != before)
    }
}

fn sample_plan(name: &str, credit_allowance: i32) -> PlanEntity {
    let now = Utc::now();
    PlanEntity {
        id: Uuid::new_v4(),
        name: name.to_string(),
        rate_minor: 10_000,
        credit_allowance,
        description: None,
        created_at: now,
        updated_at: now,
    }
}

fn seeded_subscription(
    user_id: Uuid,
    plan: &PlanEntity,
    current_credits: i32,
    is_active: bool,
) -> SubscriptionEntity {
    let now = Utc::now();
    SubscriptionEntity {
        id: Uuid::new_v4(),
        user_id,
        plan_id: plan.id,
        plan_name: plan.name.clone(),
        payment_amount_minor: plan.rate_minor,
        payment_gateway_id: Some("order_seed".to_string()),
        payment_on: now,
        is_active,
        total_credits: plan.credit_allowance,
        current_credits,
        created_at: now,
        updated_at: now,
    }
}

fn purchase_model(user_id: Uuid, plan_id: Uuid) -> CreateSubscriptionModel {
    CreateSubscriptionModel {
        user_id,
        plan_id,
        payment_amount_minor: 10_000,
        is_active: true,
    }
}

fn gateway_order(request: OrderRequest) -> PaymentOrder {
    PaymentOrder {
        id: "order_test".to_string(),
        amount_minor: request.amount_minor,
        currency: request.currency,
        receipt: Some(request.receipt),
        status: "created".to_string(),
    }
}

fn ledger_with<G: PaymentGateway + 'static>(
    plans: Vec<PlanEntity>,
    gateway: G,
) -> (
    SubscriptionUseCase<InMemoryPlans, InMemoryLedger, G>,
    Arc<InMemoryLedger>,
) {
    let store = Arc::new(InMemoryLedger::default());
    let usecase = SubscriptionUseCase::new(
        Arc::new(InMemoryPlans { plans }),
        Arc::clone(&store),
        Arc::new(gateway),
        CURRENCY.to_string(),
        GATEWAY_SECRET.to_string(),
    );
    (usecase, store)
}

#[tokio::test]
async fn full_credit_lifecycle_from_purchase_to_exhaustion_and_repurchase() {
    let plan = sample_plan("Starter", 5);
    let (usecase, store) = ledger_with(vec![plan.clone()], PlaceholderGateway);
    let user_id = Uuid::new_v4();
    let requester = Requester::new(user_id, Role::User);

    let purchased = usecase
        .purchase(&requester, purchase_model(user_id, plan.id))
        .await
        .unwrap();
    let subscription_id = purchased.subscription.subscription_id;
    assert_eq!(purchased.subscription.plan_name, "Starter");
    assert_eq!(purchased.subscription.total_credits, 5);
    assert_eq!(purchased.subscription.current_credits, 5);
    assert!(purchased.subscription.is_active);
    assert_eq!(
        purchased.subscription.payment_gateway_id.as_deref(),
        Some(purchased.order.id.as_str())
    );

    for expected in (1..=4).rev() {
        let after = usecase
            .decrement_credit(&requester, subscription_id)
            .await
            .unwrap();
        assert_eq!(after.current_credits, expected);
        assert!(after.is_active);
    }

    let second = usecase
        .purchase(&requester, purchase_model(user_id, plan.id))
        .await;
    assert!(matches!(second, Err(SubscriptionError::AlreadySubscribed)));

    let last = usecase
        .decrement_credit(&requester, subscription_id)
        .await
        .unwrap();
    assert_eq!(last.current_credits, 0);
    assert!(!last.is_active);

    let before = store.get(subscription_id).unwrap();
    let exhausted = usecase.decrement_credit(&requester, subscription_id).await;
    assert!(matches!(
        exhausted,
        Err(SubscriptionError::NoCreditsRemaining)
    ));
    assert_eq!(store.get(subscription_id).unwrap(), before);

    let repurchased = usecase
        .purchase(&requester, purchase_model(user_id, plan.id))
        .await
        .unwrap();
    assert_ne!(repurchased.subscription.subscription_id, subscription_id);
    assert_eq!(store.rows_for(user_id).len(), 2);
    assert_eq!(store.active_for(user_id).len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_purchases_leave_exactly_one_active_subscription() {
    let plan = sample_plan("Starter", 3);
    let (usecase, store) = ledger_with(vec![plan.clone()], PlaceholderGateway);
    let usecase = Arc::new(usecase);
    let user_id = Uuid::new_v4();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let usecase = Arc::clone(&usecase);
            let model = purchase_model(user_id, plan.id);
            tokio::spawn(async move {
                usecase
                    .purchase(&Requester::new(user_id, Role::User), model)
                    .await
            })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(SubscriptionError::AlreadySubscribed) => conflicts += 1,
            Err(other) => panic!("unexpected purchase error: {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(store.active_for(user_id).len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_decrements_on_last_credit_succeed_once() {
    let plan = sample_plan("Starter", 5);
    let (usecase, store) = ledger_with(vec![plan.clone()], PlaceholderGateway);
    let usecase = Arc::new(usecase);
    let user_id = Uuid::new_v4();
    let row = seeded_subscription(user_id, &plan, 1, true);
    let subscription_id = row.id;
    store.insert(row);

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let usecase = Arc::clone(&usecase);
            tokio::spawn(async move {
                usecase
                    .decrement_credit(&Requester::new(user_id, Role::User), subscription_id)
                    .await
            })
        })
        .collect();

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    let succeeded = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let exhausted = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Err(SubscriptionError::NoCreditsRemaining)))
        .count();
    assert_eq!(succeeded, 1);
    assert_eq!(exhausted, 1);

    let final_row = store.get(subscription_id).unwrap();
    assert_eq!(final_row.current_credits, 0);
    assert!(!final_row.is_active);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_decrements_never_overdraw_the_balance() {
    let plan = sample_plan("Bulk", 10);
    let (usecase, store) = ledger_with(vec![plan.clone()], PlaceholderGateway);
    let usecase = Arc::new(usecase);
    let user_id = Uuid::new_v4();
    let row = seeded_subscription(user_id, &plan, 10, true);
    let subscription_id = row.id;
    store.insert(row);

    let handles: Vec<_> = (0..25)
        .map(|_| {
            let usecase = Arc::clone(&usecase);
            tokio::spawn(async move {
                usecase
                    .decrement_credit(&Requester::new(user_id, Role::User), subscription_id)
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 10);
    assert_eq!(store.get(subscription_id).unwrap().current_credits, 0);
}

#[tokio::test]
async fn upgrade_resets_balance_and_reactivates_exhausted_subscription() {
    let starter = sample_plan("Starter", 5);
    let pro = sample_plan("Pro", 20);
    let (usecase, store) = ledger_with(vec![starter.clone(), pro.clone()], PlaceholderGateway);
    let user_id = Uuid::new_v4();
    let row = seeded_subscription(user_id, &starter, 0, false);
    let subscription_id = row.id;
    store.insert(row);

    let upgraded = usecase
        .upgrade(
            &Requester::new(user_id, Role::User),
            subscription_id,
            UpgradeSubscriptionModel {
                plan_id: pro.id,
                payment_amount_minor: 25_000,
            },
        )
        .await
        .unwrap();

    assert_eq!(upgraded.subscription.subscription_id, subscription_id);
    assert_eq!(upgraded.subscription.plan_id, pro.id);
    assert_eq!(upgraded.subscription.plan_name, "Pro");
    assert_eq!(upgraded.subscription.total_credits, 20);
    assert_eq!(upgraded.subscription.current_credits, 20);
    assert_eq!(upgraded.subscription.payment_amount_minor, 25_000);
    assert!(upgraded.subscription.is_active);
    assert_eq!(store.rows_for(user_id).len(), 1);
}

#[tokio::test]
async fn upgrade_discards_remaining_balance() {
    let starter = sample_plan("Starter", 5);
    let pro = sample_plan("Pro", 20);
    let (usecase, store) = ledger_with(vec![starter.clone(), pro.clone()], PlaceholderGateway);
    let user_id = Uuid::new_v4();
    let row = seeded_subscription(user_id, &starter, 3, true);
    let subscription_id = row.id;
    store.insert(row);

    let upgraded = usecase
        .upgrade(
            &Requester::new(user_id, Role::User),
            subscription_id,
            UpgradeSubscriptionModel {
                plan_id: pro.id,
                payment_amount_minor: 25_000,
            },
        )
        .await
        .unwrap();

    assert_eq!(upgraded.subscription.current_credits, 20);
}

#[tokio::test]
async fn upgrade_refuses_to_reactivate_alongside_another_active_subscription() {
    let starter = sample_plan("Starter", 5);
    let (usecase, store) = ledger_with(vec![starter.clone()], PlaceholderGateway);
    let user_id = Uuid::new_v4();
    let exhausted = seeded_subscription(user_id, &starter, 0, false);
    let exhausted_id = exhausted.id;
    store.insert(exhausted.clone());
    store.insert(seeded_subscription(user_id, &starter, 5, true));

    let result = usecase
        .upgrade(
            &Requester::new(user_id, Role::User),
            exhausted_id,
            UpgradeSubscriptionModel {
                plan_id: starter.id,
                payment_amount_minor: 10_000,
            },
        )
        .await;

    assert!(matches!(result, Err(SubscriptionError::AlreadySubscribed)));
    assert_eq!(store.get(exhausted_id).unwrap(), exhausted);
    assert_eq!(store.active_for(user_id).len(), 1);
}

#[tokio::test]
async fn upgrade_of_missing_subscription_is_not_found() {
    let pro = sample_plan("Pro", 20);
    let (usecase, _store) = ledger_with(vec![pro.clone()], PlaceholderGateway);

    let result = usecase
        .upgrade(
            &Requester::new(Uuid::new_v4(), Role::Admin),
            Uuid::new_v4(),
            UpgradeSubscriptionModel {
                plan_id: pro.id,
                payment_amount_minor: 25_000,
            },
        )
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, SubscriptionError::SubscriptionNotFound));
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upgrade_to_unknown_plan_leaves_row_untouched() {
    let starter = sample_plan("Starter", 5);
    let (usecase, store) = ledger_with(vec![starter.clone()], PlaceholderGateway);
    let user_id = Uuid::new_v4();
    let row = seeded_subscription(user_id, &starter, 2, true);
    store.insert(row.clone());

    let result = usecase
        .upgrade(
            &Requester::new(user_id, Role::User),
            row.id,
            UpgradeSubscriptionModel {
                plan_id: Uuid::new_v4(),
                payment_amount_minor: 25_000,
            },
        )
        .await;

    assert!(matches!(result, Err(SubscriptionError::PlanNotFound)));
    assert_eq!(store.get(row.id).unwrap(), row);
}

#[tokio::test]
async fn gateway_failure_during_upgrade_leaves_row_untouched() {
    let starter = sample_plan("Starter", 5);
    let pro = sample_plan("Pro", 20);
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_create_order()
        .times(1)
        .returning(|_| Err(anyhow!("gateway unavailable")));

    let (usecase, store) = ledger_with(vec![starter.clone(), pro.clone()], gateway);
    let user_id = Uuid::new_v4();
    let row = seeded_subscription(user_id, &starter, 1, true);
    store.insert(row.clone());

    let result = usecase
        .upgrade(
            &Requester::new(user_id, Role::User),
            row.id,
            UpgradeSubscriptionModel {
                plan_id: pro.id,
                payment_amount_minor: 25_000,
            },
        )
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, SubscriptionError::Gateway(_)));
    assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(store.get(row.id).unwrap(), row);
}

#[tokio::test]
async fn gateway_failure_during_purchase_creates_nothing() {
    let plan = sample_plan("Starter", 5);
    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_create_order()
        .times(1)
        .returning(|_| Err(anyhow!("gateway unavailable")));

    let (usecase, store) = ledger_with(vec![plan.clone()], gateway);
    let user_id = Uuid::new_v4();

    let result = usecase
        .purchase(
            &Requester::new(user_id, Role::User),
            purchase_model(user_id, plan.id),
        )
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, SubscriptionError::Gateway(_)));
    assert_eq!(err.kind(), "upstream_failure");
    assert!(store.rows_for(user_id).is_empty());
}

#[tokio::test]
async fn purchase_sends_plan_and_user_to_the_gateway() {
    let plan = sample_plan("Starter", 5);
    let user_id = Uuid::new_v4();
    let plan_id = plan.id;

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_create_order()
        .withf(move |request| {
            request.amount_minor == 10_000
                && request.currency == CURRENCY
                && request.receipt.len() <= 40
                && request.notes.get("plan_id") == Some(&plan_id.to_string())
                && request.notes.get("user_id") == Some(&user_id.to_string())
        })
        .times(1)
        .returning(|request| Ok(gateway_order(request)));

    let (usecase, _store) = ledger_with(vec![plan], gateway);

    let purchased = usecase
        .purchase(
            &Requester::new(user_id, Role::User),
            purchase_model(user_id, plan_id),
        )
        .await
        .unwrap();

    assert_eq!(purchased.order.id, "order_test");
    assert_eq!(
        purchased.subscription.payment_gateway_id.as_deref(),
        Some("order_test")
    );
}

#[tokio::test]
async fn purchase_with_inactive_flag_stores_an_inactive_row() {
    let plan = sample_plan("Starter", 5);
    let (usecase, store) = ledger_with(vec![plan.clone()], PlaceholderGateway);
    let user_id = Uuid::new_v4();

    let purchased = usecase
        .purchase(
            &Requester::new(user_id, Role::User),
            CreateSubscriptionModel {
                is_active: false,
                ..purchase_model(user_id, plan.id)
            },
        )
        .await
        .unwrap();

    assert!(!purchased.subscription.is_active);
    assert_eq!(purchased.subscription.current_credits, 5);
    assert!(store.active_for(user_id).is_empty());
}

#[tokio::test]
async fn purchase_of_unknown_plan_never_reaches_the_gateway() {
    let plan_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    let mut plan_repo = MockPlanRepository::new();
    plan_repo
        .expect_find_by_id()
        .with(eq(plan_id))
        .returning(|_| Box::pin(async { Ok(None) }));

    let subscription_repo = MockSubscriptionRepository::new();
    let mut gateway = MockPaymentGateway::new();
    gateway.expect_create_order().never();

    let usecase = SubscriptionUseCase::new(
        Arc::new(plan_repo),
        Arc::new(subscription_repo),
        Arc::new(gateway),
        CURRENCY.to_string(),
        GATEWAY_SECRET.to_string(),
    );

    let result = usecase
        .purchase(
            &Requester::new(user_id, Role::User),
            purchase_model(user_id, plan_id),
        )
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, SubscriptionError::PlanNotFound));
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn purchase_that_loses_the_insert_race_reports_conflict() {
    let plan = sample_plan("Starter", 5);
    let plan_id = plan.id;
    let user_id = Uuid::new_v4();

    let mut plan_repo = MockPlanRepository::new();
    plan_repo.expect_find_by_id().returning(move |_| {
        let plan = plan.clone();
        Box::pin(async move { Ok(Some(plan)) })
    });

    let mut subscription_repo = MockSubscriptionRepository::new();
    subscription_repo
        .expect_find_active_by_user()
        .with(eq(user_id))
        .returning(|_| Box::pin(async { Ok(None) }));
    subscription_repo
        .expect_create_if_no_active()
        .times(1)
        .returning(|_| Box::pin(async { Ok(PurchaseOutcome::AlreadySubscribed) }));

    let mut gateway = MockPaymentGateway::new();
    gateway
        .expect_create_order()
        .times(1)
        .returning(|request| Ok(gateway_order(request)));

    let usecase = SubscriptionUseCase::new(
        Arc::new(plan_repo),
        Arc::new(subscription_repo),
        Arc::new(gateway),
        CURRENCY.to_string(),
        GATEWAY_SECRET.to_string(),
    );

    let result = usecase
        .purchase(
            &Requester::new(user_id, Role::User),
            purchase_model(user_id, plan_id),
        )
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, SubscriptionError::AlreadySubscribed));
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn storage_failure_surfaces_as_internal_error() {
    let plan = sample_plan("Starter", 5);
    let plan_id = plan.id;
    let user_id = Uuid::new_v4();

    let mut plan_repo = MockPlanRepository::new();
    plan_repo.expect_find_by_id().returning(move |_| {
        let plan = plan.clone();
        Box::pin(async move { Ok(Some(plan)) })
    });

    let mut subscription_repo = MockSubscriptionRepository::new();
    subscription_repo
        .expect_find_active_by_user()
        .returning(|_| Box::pin(async { Err(anyhow!("connection reset")) }));

    let mut gateway = MockPaymentGateway::new();
    gateway.expect_create_order().never();

    let usecase = SubscriptionUseCase::new(
        Arc::new(plan_repo),
        Arc::new(subscription_repo),
        Arc::new(gateway),
        CURRENCY.to_string(),
        GATEWAY_SECRET.to_string(),
    );

    let err = usecase
        .purchase(
            &Requester::new(user_id, Role::User),
            purchase_model(user_id, plan_id),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SubscriptionError::Internal(_)));
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn purchase_rejects_non_positive_amount() {
    let plan = sample_plan("Starter", 5);
    let (usecase, store) = ledger_with(vec![plan.clone()], PlaceholderGateway);
    let user_id = Uuid::new_v4();

    let result = usecase
        .purchase(
            &Requester::new(user_id, Role::User),
            CreateSubscriptionModel {
                payment_amount_minor: 0,
                ..purchase_model(user_id, plan.id)
            },
        )
        .await;

    assert!(matches!(result, Err(SubscriptionError::Validation(_))));
    assert!(store.rows_for(user_id).is_empty());
}

#[tokio::test]
async fn users_cannot_purchase_or_spend_for_someone_else() {
    let plan = sample_plan("Starter", 5);
    let (usecase, store) = ledger_with(vec![plan.clone()], PlaceholderGateway);
    let owner = Uuid::new_v4();
    let intruder = Requester::new(Uuid::new_v4(), Role::User);
    let row = seeded_subscription(owner, &plan, 5, true);
    store.insert(row.clone());

    let purchase = usecase
        .purchase(&intruder, purchase_model(owner, plan.id))
        .await;
    assert!(matches!(purchase, Err(SubscriptionError::Forbidden)));

    let decrement = usecase.decrement_credit(&intruder, row.id).await;
    assert!(matches!(decrement, Err(SubscriptionError::Forbidden)));
    assert_eq!(store.get(row.id).unwrap().current_credits, 5);

    let admin = Requester::new(Uuid::new_v4(), Role::Admin);
    let spent = usecase.decrement_credit(&admin, row.id).await.unwrap();
    assert_eq!(spent.current_credits, 4);
}

#[tokio::test]
async fn decrement_of_missing_subscription_is_not_found() {
    let (usecase, _store) = ledger_with(vec![], PlaceholderGateway);

    let result = usecase
        .decrement_credit(&Requester::new(Uuid::new_v4(), Role::Admin), Uuid::new_v4())
        .await;

    assert!(matches!(
        result,
        Err(SubscriptionError::SubscriptionNotFound)
    ));
}

#[tokio::test]
async fn listing_is_scoped_to_the_requester_unless_admin() {
    let plan = sample_plan("Starter", 5);
    let (usecase, store) = ledger_with(vec![plan.clone()], PlaceholderGateway);
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    store.insert(seeded_subscription(alice, &plan, 5, true));
    store.insert(seeded_subscription(bob, &plan, 2, true));
    store.insert(seeded_subscription(bob, &plan, 0, false));

    let own = usecase
        .list_subscriptions(&Requester::new(bob, Role::User))
        .await
        .unwrap();
    assert_eq!(own.len(), 2);
    assert!(own.iter().all(|subscription| subscription.user_id == bob));

    let all = usecase
        .list_subscriptions(&Requester::new(Uuid::new_v4(), Role::Admin))
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn only_admins_delete_subscriptions() {
    let plan = sample_plan("Starter", 5);
    let (usecase, store) = ledger_with(vec![plan.clone()], PlaceholderGateway);
    let user_id = Uuid::new_v4();
    let row = seeded_subscription(user_id, &plan, 5, true);
    store.insert(row.clone());

    let denied = usecase
        .delete_subscription(&Requester::new(user_id, Role::User), row.id)
        .await;
    assert!(matches!(denied, Err(SubscriptionError::Forbidden)));
    assert!(store.get(row.id).is_some());

    let admin = Requester::new(Uuid::new_v4(), Role::Admin);
    usecase.delete_subscription(&admin, row.id).await.unwrap();
    assert!(store.get(row.id).is_none());

    let again = usecase.delete_subscription(&admin, row.id).await;
    assert!(matches!(again, Err(SubscriptionError::SubscriptionNotFound)));
}

#[tokio::test]
async fn get_subscription_returns_the_snapshot() {
    let plan = sample_plan("Starter", 5);
    let (usecase, store) = ledger_with(vec![plan.clone()], PlaceholderGateway);
    let user_id = Uuid::new_v4();
    let row = seeded_subscription(user_id, &plan, 3, true);
    store.insert(row.clone());

    let found = usecase
        .get_subscription(&Requester::new(user_id, Role::User), row.id)
        .await
        .unwrap();

    assert_eq!(found, SubscriptionDto::from(row));
}

#[test]
fn validates_gateway_signatures_with_the_configured_secret() {
    let (usecase, _store) = ledger_with(vec![], PlaceholderGateway);
    let signature = order_signature(GATEWAY_SECRET, "order_1", "pay_1").unwrap();

    let valid = ValidateSignatureModel {
        order_id: "order_1".to_string(),
        payment_id: "pay_1".to_string(),
        signature: signature.clone(),
    };
    assert!(usecase.validate_gateway_signature(&valid).is_ok());

    let swapped = ValidateSignatureModel {
        payment_id: "pay_2".to_string(),
        ..valid
    };
    let err = usecase.validate_gateway_signature(&swapped).unwrap_err();
    assert!(matches!(err, SubscriptionError::InvalidSignature));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.kind(), "validation_failure");
    assert_eq!(err.to_string(), "Transaction is not valid");
}
