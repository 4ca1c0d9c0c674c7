//! Engine state
//!
//! [`NutritionEngine`] wires one repository and one notice channel to the
//! settings store, the calculator following it and the meal ledger store.
//! Presentation code holds the engine and subscribes to the pieces it shows.

use crate::config::EngineConfig;
use crate::notices::{Notice, Notifier};
use crate::repositories::NutritionRepository;
use crate::services::{
    remaining_against_target, MealLedgerStore, NutritionCalculator, RemainingNutrients,
    SettingsStore,
};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Shared engine handle
///
/// All fields are `Arc`'d so clones can move into tasks.
#[derive(Clone)]
pub struct NutritionEngine {
    pub settings: Arc<SettingsStore>,
    pub calculator: Arc<NutritionCalculator>,
    pub ledger: Arc<MealLedgerStore>,
    pub notifier: Notifier,
    config: Arc<EngineConfig>,
    calculator_task: Arc<JoinHandle<()>>,
}

impl NutritionEngine {
    /// Build an engine showing today's date
    ///
    /// Must be called inside a Tokio runtime; the calculator runs as a task.
    pub fn new(config: EngineConfig, repo: Arc<dyn NutritionRepository>) -> Self {
        Self::with_date(config, repo, Local::now().date_naive())
    }

    pub fn with_date(
        config: EngineConfig,
        repo: Arc<dyn NutritionRepository>,
        date: NaiveDate,
    ) -> Self {
        let notifier = Notifier::new(config.notices.capacity);
        let settings = Arc::new(SettingsStore::new(
            config.profile.clone(),
            Arc::clone(&repo),
            notifier.clone(),
            config.account.premium,
        ));
        let (calculator, calculator_task) = NutritionCalculator::track(settings.subscribe());
        let ledger = Arc::new(MealLedgerStore::new(date, repo, notifier.clone()));

        Self {
            settings,
            calculator,
            ledger,
            notifier,
            config: Arc::new(config),
            calculator_task: Arc::new(calculator_task),
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notifier.subscribe()
    }

    /// Today's progress against the current targets
    ///
    /// `None` until valid targets have been calculated.
    pub fn remaining(&self) -> Option<RemainingNutrients> {
        let calculations = self.calculator.current()?;
        Some(remaining_against_target(&self.ledger.totals(), &calculations))
    }

    /// Load stored health metrics, then the ledger for the current date
    pub async fn start(&self) {
        self.settings.load_health_metrics().await;
        self.ledger.refresh().await;
    }

    /// Cancel in-flight work
    pub fn shutdown(&self) {
        self.ledger.teardown();
        self.calculator_task.abort();
    }
}
