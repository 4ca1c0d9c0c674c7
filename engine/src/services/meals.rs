//! Meal actions - add and delete meals without reloading the ledger
//!
//! Both operations persist first and then apply the same change to the
//! ledger bucket and the running totals, so the totals stay equal to the sum
//! over all buckets.

use crate::error::EngineError;
use crate::services::ledger::MealLedgerStore;
use anyhow::anyhow;
use nutrition_tracker_shared::{FoodInput, MealEntryDraft, MealType};
use tracing::{debug, warn};
use uuid::Uuid;

const DEFAULT_SERVING_SIZE: &str = "1 serving";

/// Result of an add or delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Persisted; the local ledger reflects the change where applicable
    Committed,
    /// Invalid input; nothing was sent to the store
    Rejected,
    /// The store request failed; ledger and totals are untouched
    Failed,
}

impl MealLedgerStore {
    /// Log `food` under `meal_type` for the current date
    pub async fn add_food(&self, meal_type: MealType, food: FoodInput) -> MutationOutcome {
        let food_name = food.food_name.trim();
        if food_name.is_empty() {
            let err = EngineError::Validation("Food name cannot be empty".to_string());
            self.notifier.notify(err.to_notice("Adding food"));
            return MutationOutcome::Rejected;
        }

        let nutrients = food.sanitized();
        let draft = MealEntryDraft {
            food_name: food_name.to_string(),
            calories: nutrients.calories,
            protein: nutrients.protein,
            carbs: nutrients.carbs,
            fat: nutrients.fat,
            meal_type,
            serving_size: food
                .serving_size
                .clone()
                .unwrap_or_else(|| DEFAULT_SERVING_SIZE.to_string()),
            date: self.date(),
        };

        let entry = match self.repo.insert_meal(draft).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                let err = EngineError::from(anyhow!("store returned no meal record"));
                self.notifier.notify(err.to_notice("Adding food"));
                return MutationOutcome::Failed;
            }
            Err(e) => {
                self.notifier
                    .notify(EngineError::from(e).to_notice("Adding food"));
                return MutationOutcome::Failed;
            }
        };

        let appended = self.state.send_if_modified(|snap| {
            // A date switch or a reload that already picked the row up wins
            if snap.ledger.date != entry.date || snap.ledger.contains(entry.id) {
                return false;
            }
            snap.totals.add_entry(&entry);
            snap.ledger.bucket_mut(entry.meal_type).push(entry.clone());
            true
        });
        if appended {
            debug!(
                id = %entry.id,
                meal = %entry.meal_type,
                calories = entry.calories,
                "Meal added"
            );
        } else {
            debug!(id = %entry.id, "Meal persisted but not appended to the current ledger");
        }
        MutationOutcome::Committed
    }

    /// Delete the meal `meal_id` from the `meal_type` bucket
    ///
    /// The remote delete is issued even when the entry is not in the local
    /// ledger; totals then stay as they are.
    pub async fn delete_food(&self, meal_type: MealType, meal_id: Uuid) -> MutationOutcome {
        let known = self
            .state
            .borrow()
            .ledger
            .bucket(meal_type)
            .iter()
            .find(|entry| entry.id == meal_id)
            .cloned();
        if known.is_none() {
            warn!(
                id = %meal_id,
                meal = %meal_type,
                "Deleting meal that is not in the local ledger"
            );
        }

        if let Err(e) = self.repo.delete_meal(meal_id).await {
            self.notifier
                .notify(EngineError::from(e).to_notice("Deleting food"));
            return MutationOutcome::Failed;
        }

        let removed = self.state.send_if_modified(|snap| {
            let bucket = snap.ledger.bucket_mut(meal_type);
            match bucket.iter().position(|entry| entry.id == meal_id) {
                Some(index) => {
                    let entry = bucket.remove(index);
                    snap.totals.subtract_entry(&entry);
                    true
                }
                None => false,
            }
        });
        if removed {
            if let Some(entry) = known {
                debug!(id = %meal_id, food = %entry.food_name, "Meal deleted");
            }
        }
        MutationOutcome::Committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notices::{NoticeKind, Notifier};
    use crate::repositories::InMemoryRepository;
    use crate::services::nutrition::ledger_totals;
    use chrono::NaiveDate;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()
    }

    fn store() -> (MealLedgerStore, Arc<InMemoryRepository>, Notifier) {
        let repo = Arc::new(InMemoryRepository::new());
        let notifier = Notifier::new(16);
        let store = MealLedgerStore::new(day(), repo.clone(), notifier.clone());
        (store, repo, notifier)
    }

    fn lunch() -> FoodInput {
        FoodInput::new("Chicken salad", 500.0, 30.0, 50.0, 10.0)
    }

    #[tokio::test]
    async fn test_add_food_updates_bucket_and_totals() {
        let (store, repo, _) = store();

        let outcome = store.add_food(MealType::Lunch, lunch()).await;

        assert_eq!(outcome, MutationOutcome::Committed);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.ledger.bucket(MealType::Lunch).len(), 1);
        assert_eq!(snapshot.totals.calories, 500.0);
        assert_eq!(snapshot.totals.protein, 30.0);
        assert_eq!(snapshot.totals.carbs, 50.0);
        assert_eq!(snapshot.totals.fat, 10.0);
        assert_eq!(repo.meal_count().await, 1);
    }

    #[tokio::test]
    async fn test_delete_food_reverses_add() {
        let (store, repo, _) = store();
        store.add_food(MealType::Lunch, lunch()).await;
        let id = store.ledger().bucket(MealType::Lunch)[0].id;

        let outcome = store.delete_food(MealType::Lunch, id).await;

        assert_eq!(outcome, MutationOutcome::Committed);
        assert!(store.ledger().bucket(MealType::Lunch).is_empty());
        assert!(store.totals().is_zero());
        assert_eq!(repo.meal_count().await, 0);
    }

    #[tokio::test]
    async fn test_fractional_meals_delete_back_to_exact_zero() {
        let (store, _, _) = store();
        store
            .add_food(MealType::Lunch, FoodInput::new("Lettuce", 5.0, 0.1, 0.1, 0.1))
            .await;
        store
            .add_food(MealType::Lunch, FoodInput::new("Tomato", 6.0, 0.2, 0.2, 0.2))
            .await;
        assert_eq!(store.totals().protein, 0.3);

        for entry in store.ledger().bucket(MealType::Lunch).to_vec() {
            store.delete_food(MealType::Lunch, entry.id).await;
        }

        assert!(store.ledger().is_empty());
        assert!(store.totals().is_zero());
        assert_eq!(store.totals(), ledger_totals(&store.ledger()));
    }

    #[tokio::test]
    async fn test_add_food_sanitizes_numbers() {
        let (store, _, _) = store();
        let food = FoodInput::new("Unknown bar", 199.6, f64::NAN, 20.0, -1.0);

        store.add_food(MealType::Snack, food).await;

        let entry = store.ledger().bucket(MealType::Snack)[0].clone();
        assert_eq!(entry.calories, 200);
        assert_eq!(entry.protein, 0.0);
        assert_eq!(entry.fat, 0.0);
        assert_eq!(entry.serving_size, DEFAULT_SERVING_SIZE);
    }

    #[tokio::test]
    async fn test_add_food_failure_leaves_ledger_untouched() {
        let (store, repo, notifier) = store();
        let mut notices = notifier.subscribe();
        repo.failures.insert_meal.store(true, Ordering::SeqCst);

        let outcome = store.add_food(MealType::Dinner, lunch()).await;

        assert_eq!(outcome, MutationOutcome::Failed);
        assert!(store.ledger().is_empty());
        assert!(store.totals().is_zero());
        assert_eq!(notices.recv().await.unwrap().kind, NoticeKind::Failure);
    }

    #[tokio::test]
    async fn test_add_food_null_record_is_a_failure() {
        let (store, repo, notifier) = store();
        let mut notices = notifier.subscribe();
        repo.failures.insert_returns_none.store(true, Ordering::SeqCst);

        assert_eq!(
            store.add_food(MealType::Dinner, lunch()).await,
            MutationOutcome::Failed
        );
        assert!(store.ledger().is_empty());
        assert_eq!(notices.recv().await.unwrap().kind, NoticeKind::Failure);
    }

    #[tokio::test]
    async fn test_add_food_requires_a_name() {
        let (store, repo, _) = store();
        let outcome = store
            .add_food(MealType::Lunch, FoodInput::new("   ", 100.0, 1.0, 1.0, 1.0))
            .await;
        assert_eq!(outcome, MutationOutcome::Rejected);
        assert_eq!(repo.meal_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_ledger_untouched() {
        let (store, repo, _) = store();
        store.add_food(MealType::Lunch, lunch()).await;
        let id = store.ledger().bucket(MealType::Lunch)[0].id;
        repo.failures.delete_meal.store(true, Ordering::SeqCst);

        let outcome = store.delete_food(MealType::Lunch, id).await;

        assert_eq!(outcome, MutationOutcome::Failed);
        assert_eq!(store.ledger().bucket(MealType::Lunch).len(), 1);
        assert_eq!(store.totals().calories, 500.0);
    }

    #[tokio::test]
    async fn test_delete_unknown_entry_still_deletes_remotely() {
        let (store, repo, _) = store();
        let other = MealLedgerStore::new(day(), repo.clone(), Notifier::default());
        other.add_food(MealType::Lunch, lunch()).await;
        let id = other.ledger().bucket(MealType::Lunch)[0].id;
        store.add_food(MealType::Breakfast, FoodInput::new("Toast", 120.0, 4.0, 20.0, 2.0)).await;

        let outcome = store.delete_food(MealType::Lunch, id).await;

        assert_eq!(outcome, MutationOutcome::Committed);
        assert_eq!(store.totals().calories, 120.0);
        assert_eq!(repo.meal_count().await, 1);
    }

    #[tokio::test]
    async fn test_delete_from_wrong_bucket_is_not_subtracted() {
        let (store, _, _) = store();
        store.add_food(MealType::Lunch, lunch()).await;
        let id = store.ledger().bucket(MealType::Lunch)[0].id;

        store.delete_food(MealType::Dinner, id).await;

        // The row is gone remotely but stays visible until the next reload
        assert_eq!(store.ledger().bucket(MealType::Lunch).len(), 1);
        assert_eq!(store.totals(), ledger_totals(&store.ledger()));
    }
}
