//! Common test utilities for integration tests
//!
//! [`GatedRepository`] wraps the in-memory repository so meal fetches for a
//! chosen date can be held and released, reproducing loads that resolve out
//! of order.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use nutrition_tracker_engine::{
    config::EngineConfig,
    notices::Notifier,
    repositories::{InMemoryRepository, NutritionRepository},
    services::MealLedgerStore,
    state::NutritionEngine,
};
use nutrition_tracker_shared::{
    MealEntry, MealEntryDraft, MealType, MetricRecord, MetricType, MetricWrite, StoredMeal,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Semaphore};
use uuid::Uuid;

/// In-memory repository whose meal fetches can be held per date
pub struct GatedRepository {
    pub inner: InMemoryRepository,
    gates: Mutex<HashMap<NaiveDate, Arc<Semaphore>>>,
    started: watch::Sender<Vec<NaiveDate>>,
}

impl GatedRepository {
    pub fn new() -> Self {
        let (started, _) = watch::channel(Vec::new());
        Self {
            inner: InMemoryRepository::new(),
            gates: Mutex::new(HashMap::new()),
            started,
        }
    }

    /// Block fetches for `date` until [`release`](Self::release) is called
    pub fn hold(&self, date: NaiveDate) {
        self.gates
            .lock()
            .unwrap()
            .insert(date, Arc::new(Semaphore::new(0)));
    }

    /// Let held and future fetches for `date` resolve
    pub fn release(&self, date: NaiveDate) {
        if let Some(gate) = self.gates.lock().unwrap().get(&date) {
            gate.add_permits(1);
        }
    }

    /// Wait until a fetch for `date` has reached the repository
    pub async fn wait_for_fetch(&self, date: NaiveDate) {
        let mut rx = self.started.subscribe();
        rx.wait_for(|dates| dates.contains(&date)).await.unwrap();
    }

    fn gate(&self, date: NaiveDate) -> Option<Arc<Semaphore>> {
        self.gates.lock().unwrap().get(&date).cloned()
    }
}

#[async_trait]
impl NutritionRepository for GatedRepository {
    async fn fetch_meals_for_date(&self, date: NaiveDate) -> Result<Vec<StoredMeal>> {
        self.started.send_modify(|dates| dates.push(date));
        if let Some(gate) = self.gate(date) {
            // The permit goes back on drop, so the gate stays open
            let _permit = gate.acquire().await?;
        }
        self.inner.fetch_meals_for_date(date).await
    }

    async fn insert_meal(&self, draft: MealEntryDraft) -> Result<Option<MealEntry>> {
        self.inner.insert_meal(draft).await
    }

    async fn delete_meal(&self, id: Uuid) -> Result<()> {
        self.inner.delete_meal(id).await
    }

    async fn read_metric_series(&self, metric_type: MetricType) -> Result<Vec<MetricRecord>> {
        self.inner.read_metric_series(metric_type).await
    }

    async fn write_metric(&self, write: MetricWrite) -> Result<()> {
        self.inner.write_metric(write).await
    }
}

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, day).unwrap()
}

/// A stored row as the backend would return it
pub fn stored_meal(date: NaiveDate, meal_type: MealType, food_name: &str, calories: u32) -> StoredMeal {
    StoredMeal {
        id: Uuid::new_v4(),
        food_name: food_name.to_string(),
        calories,
        protein: 10.0,
        carbs: 20.0,
        fat: 5.0,
        meal_type: meal_type.as_str().to_string(),
        serving_size: "1 serving".to_string(),
        date,
        created_at: chrono::Utc::now(),
    }
}

/// Ledger store over a gated repository, viewing `day`
pub fn gated_store(day: NaiveDate) -> (Arc<MealLedgerStore>, Arc<GatedRepository>, Notifier) {
    let repo = Arc::new(GatedRepository::new());
    let notifier = Notifier::new(32);
    let store = Arc::new(MealLedgerStore::new(day, repo.clone(), notifier.clone()));
    (store, repo, notifier)
}

/// Engine over a fresh in-memory repository
pub fn test_engine(config: EngineConfig) -> (NutritionEngine, Arc<InMemoryRepository>) {
    let repo = Arc::new(InMemoryRepository::new());
    let engine = NutritionEngine::with_date(config, repo.clone(), date(1));
    (engine, repo)
}

pub fn premium_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.account.premium = true;
    config
}
