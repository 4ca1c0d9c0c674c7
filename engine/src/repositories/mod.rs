//! Storage collaborator
//!
//! The engine never talks to a backend directly; it goes through
//! [`NutritionRepository`]. Any concrete binding (HTTP client, SDK, database)
//! lives behind this trait.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use nutrition_tracker_shared::{
    MealEntry, MealEntryDraft, MetricRecord, MetricType, MetricWrite, StoredMeal,
};
use uuid::Uuid;

pub use memory::InMemoryRepository;

/// Operations the engine needs from the persistence layer
///
/// Every call is a suspension point where other engine operations may
/// interleave.
#[async_trait]
pub trait NutritionRepository: Send + Sync {
    /// All meals logged on `date`, in insertion order
    async fn fetch_meals_for_date(&self, date: NaiveDate) -> Result<Vec<StoredMeal>>;

    /// Persist a meal; `Ok(None)` means the store declined without raising
    async fn insert_meal(&self, draft: MealEntryDraft) -> Result<Option<MealEntry>>;

    async fn delete_meal(&self, id: Uuid) -> Result<()>;

    /// Values of one metric series, most recent first; empty if none recorded
    async fn read_metric_series(&self, metric_type: MetricType) -> Result<Vec<MetricRecord>>;

    async fn write_metric(&self, write: MetricWrite) -> Result<()>;
}
