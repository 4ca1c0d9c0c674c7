//! In-memory repository
//!
//! Backs the binary and the tests. Each operation can be switched to fail so
//! error paths can be exercised without a real backend.

use super::NutritionRepository;
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use nutrition_tracker_shared::{
    MealEntry, MealEntryDraft, MetricRecord, MetricType, MetricValue, MetricWrite, StoredMeal,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Failure switches for each repository operation
#[derive(Debug, Default)]
pub struct FailureSwitches {
    pub fetch_meals: AtomicBool,
    pub insert_meal: AtomicBool,
    /// Insert succeeds at the transport level but yields no record
    pub insert_returns_none: AtomicBool,
    pub delete_meal: AtomicBool,
    pub read_metric: AtomicBool,
    pub write_metric: AtomicBool,
}

impl FailureSwitches {
    fn is_set(flag: &AtomicBool) -> bool {
        flag.load(Ordering::SeqCst)
    }
}

/// Repository holding meals and metrics in process memory
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    meals: RwLock<Vec<StoredMeal>>,
    /// Oldest first; reads reverse the order
    metrics: RwLock<HashMap<MetricType, Vec<MetricRecord>>>,
    pub failures: FailureSwitches,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw row as-is, including rows with unrecognized meal types
    pub async fn seed_meal(&self, meal: StoredMeal) {
        self.meals.write().await.push(meal);
    }

    /// Record a metric value as the newest point of its series
    pub async fn seed_metric(&self, metric_type: MetricType, value: impl Into<MetricValue>) {
        self.metrics
            .write()
            .await
            .entry(metric_type)
            .or_default()
            .push(MetricRecord {
                value: value.into(),
                recorded_at: Utc::now(),
            });
    }

    /// Number of stored meals across all dates
    pub async fn meal_count(&self) -> usize {
        self.meals.read().await.len()
    }

    /// Newest value of a metric series
    pub async fn latest_metric(&self, metric_type: MetricType) -> Option<MetricValue> {
        self.metrics
            .read()
            .await
            .get(&metric_type)
            .and_then(|series| series.last())
            .map(|record| record.value.clone())
    }
}

#[async_trait]
impl NutritionRepository for InMemoryRepository {
    async fn fetch_meals_for_date(&self, date: NaiveDate) -> Result<Vec<StoredMeal>> {
        if FailureSwitches::is_set(&self.failures.fetch_meals) {
            bail!("meal fetch failed for {}", date);
        }
        let meals = self.meals.read().await;
        Ok(meals.iter().filter(|m| m.date == date).cloned().collect())
    }

    async fn insert_meal(&self, draft: MealEntryDraft) -> Result<Option<MealEntry>> {
        if FailureSwitches::is_set(&self.failures.insert_meal) {
            bail!("meal insert failed");
        }
        if FailureSwitches::is_set(&self.failures.insert_returns_none) {
            return Ok(None);
        }

        let entry = MealEntry {
            id: Uuid::new_v4(),
            food_name: draft.food_name,
            calories: draft.calories,
            protein: draft.protein,
            carbs: draft.carbs,
            fat: draft.fat,
            meal_type: draft.meal_type,
            serving_size: draft.serving_size,
            date: draft.date,
            created_at: Utc::now(),
        };
        self.meals.write().await.push(StoredMeal::from(entry.clone()));
        Ok(Some(entry))
    }

    async fn delete_meal(&self, id: Uuid) -> Result<()> {
        if FailureSwitches::is_set(&self.failures.delete_meal) {
            bail!("meal delete failed for {}", id);
        }
        self.meals.write().await.retain(|m| m.id != id);
        Ok(())
    }

    async fn read_metric_series(&self, metric_type: MetricType) -> Result<Vec<MetricRecord>> {
        if FailureSwitches::is_set(&self.failures.read_metric) {
            bail!("metric read failed for {}", metric_type);
        }
        let metrics = self.metrics.read().await;
        Ok(metrics
            .get(&metric_type)
            .map(|series| series.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn write_metric(&self, write: MetricWrite) -> Result<()> {
        if FailureSwitches::is_set(&self.failures.write_metric) {
            bail!("metric write failed for {}", write.metric_type);
        }
        self.seed_metric(write.metric_type, write.value).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutrition_tracker_shared::MealType;

    fn draft(date: NaiveDate) -> MealEntryDraft {
        MealEntryDraft {
            food_name: "Rice".to_string(),
            calories: 200,
            protein: 4.0,
            carbs: 45.0,
            fat: 0.5,
            meal_type: MealType::Dinner,
            serving_size: "1 cup".to_string(),
            date,
        }
    }

    #[tokio::test]
    async fn test_insert_then_fetch_by_date() {
        let repo = InMemoryRepository::new();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let other = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

        let entry = repo.insert_meal(draft(day)).await.unwrap().unwrap();
        repo.insert_meal(draft(other)).await.unwrap();

        let meals = repo.fetch_meals_for_date(day).await.unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].id, entry.id);
        assert_eq!(meals[0].meal_type, "dinner");
    }

    #[tokio::test]
    async fn test_delete_removes_meal() {
        let repo = InMemoryRepository::new();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let entry = repo.insert_meal(draft(day)).await.unwrap().unwrap();

        repo.delete_meal(entry.id).await.unwrap();
        assert_eq!(repo.meal_count().await, 0);
    }

    #[tokio::test]
    async fn test_metric_series_most_recent_first() {
        let repo = InMemoryRepository::new();
        repo.seed_metric(MetricType::Weight, 80.0).await;
        repo.seed_metric(MetricType::Weight, 78.5).await;

        let series = repo.read_metric_series(MetricType::Weight).await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].value, MetricValue::Number(78.5));
        assert!(repo.read_metric_series(MetricType::Height).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let repo = InMemoryRepository::new();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        repo.failures.fetch_meals.store(true, Ordering::SeqCst);
        assert!(repo.fetch_meals_for_date(day).await.is_err());

        repo.failures.insert_returns_none.store(true, Ordering::SeqCst);
        assert!(repo.insert_meal(draft(day)).await.unwrap().is_none());
        assert_eq!(repo.meal_count().await, 0);
    }
}
