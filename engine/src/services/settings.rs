//! Settings store - owns the user's [`NutritionSettings`]
//!
//! Provides:
//! - Validated, optimistic single-field updates persisted as metrics
//! - Premium-gated custom macro ratios
//! - Loading the profile back from stored metric series
//!
//! In-memory changes are applied before persistence and are not rolled back
//! when the store rejects a write.

use crate::error::{EngineError, EngineResult};
use crate::notices::Notifier;
use crate::repositories::NutritionRepository;
use nutrition_tracker_shared::validation::{
    validate_age, validate_height_cm, validate_macro_ratio, validate_weight, ValidationError,
};
use nutrition_tracker_shared::{
    ActivityLevel, FitnessGoal, Gender, MacroRatio, MetricRecord, MetricType, MetricValue,
    MetricWrite, NutritionSettings,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// A single settings field and its new value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingUpdate {
    Age(u32),
    Weight(f64),
    Height(f64),
    Gender(Gender),
    ActivityLevel(ActivityLevel),
    FitnessGoal(FitnessGoal),
}

impl SettingUpdate {
    /// Settings field name, as used for display labels
    pub fn field(&self) -> &'static str {
        self.metric_type().as_str()
    }

    /// Metric series this field is persisted to
    pub fn metric_type(&self) -> MetricType {
        match self {
            SettingUpdate::Age(_) => MetricType::Age,
            SettingUpdate::Weight(_) => MetricType::Weight,
            SettingUpdate::Height(_) => MetricType::Height,
            SettingUpdate::Gender(_) => MetricType::Gender,
            SettingUpdate::ActivityLevel(_) => MetricType::ActivityLevel,
            SettingUpdate::FitnessGoal(_) => MetricType::FitnessGoal,
        }
    }

    fn metric_value(&self) -> MetricValue {
        match self {
            SettingUpdate::Age(age) => MetricValue::Number(*age as f64),
            SettingUpdate::Weight(kg) => MetricValue::Number(*kg),
            SettingUpdate::Height(cm) => MetricValue::Number(*cm),
            SettingUpdate::Gender(g) => g.as_str().into(),
            SettingUpdate::ActivityLevel(a) => a.as_str().into(),
            SettingUpdate::FitnessGoal(g) => g.as_str().into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            SettingUpdate::Age(age) => validate_age(*age),
            SettingUpdate::Weight(kg) => validate_weight(*kg),
            SettingUpdate::Height(cm) => validate_height_cm(*cm),
            SettingUpdate::Gender(_)
            | SettingUpdate::ActivityLevel(_)
            | SettingUpdate::FitnessGoal(_) => Ok(()),
        }
    }

    fn apply_to(&self, settings: &mut NutritionSettings) {
        match *self {
            SettingUpdate::Age(age) => settings.age = age,
            SettingUpdate::Weight(kg) => settings.weight = kg,
            SettingUpdate::Height(cm) => settings.height = cm,
            SettingUpdate::Gender(g) => settings.gender = g,
            SettingUpdate::ActivityLevel(a) => settings.activity_level = a,
            SettingUpdate::FitnessGoal(g) => settings.fitness_goal = g,
        }
    }

    /// Parse the newest value of a profile series; `None` if it does not fit
    fn from_metric(metric_type: MetricType, value: &MetricValue) -> Option<Self> {
        let update = match metric_type {
            MetricType::Weight => SettingUpdate::Weight(value.as_f64()?),
            MetricType::Height => SettingUpdate::Height(value.as_f64()?),
            MetricType::Age => {
                let years = value.as_f64()?;
                if !years.is_finite() || years < 0.0 || years > u32::MAX as f64 {
                    return None;
                }
                SettingUpdate::Age(years.round() as u32)
            }
            MetricType::Gender => SettingUpdate::Gender(value.as_text()?.parse().ok()?),
            MetricType::ActivityLevel => {
                SettingUpdate::ActivityLevel(value.as_text()?.parse().ok()?)
            }
            MetricType::FitnessGoal => SettingUpdate::FitnessGoal(value.as_text()?.parse().ok()?),
            MetricType::MacroProtein | MetricType::MacroCarbs | MetricType::MacroFats => {
                return None
            }
        };
        update.validate().ok().map(|_| update)
    }
}

/// Result of a settings mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Applied in memory and persisted
    Saved,
    /// Applied in memory; persisting failed and was reported
    SavedLocally,
    /// Invalid input; nothing changed
    Rejected,
    /// Premium-only feature requested by a non-premium user; nothing changed
    PremiumRequired,
}

/// Owner of the current [`NutritionSettings`]
pub struct SettingsStore {
    settings: watch::Sender<NutritionSettings>,
    repo: Arc<dyn NutritionRepository>,
    notifier: Notifier,
    premium: AtomicBool,
}

impl SettingsStore {
    pub fn new(
        initial: NutritionSettings,
        repo: Arc<dyn NutritionRepository>,
        notifier: Notifier,
        premium: bool,
    ) -> Self {
        let (settings, _) = watch::channel(initial);
        Self {
            settings,
            repo,
            notifier,
            premium: AtomicBool::new(premium),
        }
    }

    /// Snapshot of the current settings
    pub fn settings(&self) -> NutritionSettings {
        self.settings.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<NutritionSettings> {
        self.settings.subscribe()
    }

    pub fn is_premium(&self) -> bool {
        self.premium.load(Ordering::SeqCst)
    }

    pub fn set_premium(&self, premium: bool) {
        self.premium.store(premium, Ordering::SeqCst);
    }

    /// Update one field, then persist it as its metric
    pub async fn update_setting(&self, update: SettingUpdate) -> UpdateOutcome {
        if let Err(msg) = update.validate() {
            warn!(field = update.field(), %msg, "Rejected settings update");
            let err =
                EngineError::Validation(ValidationError::new(update.field(), &msg).user_message());
            self.notifier.notify(err.to_notice("Updating settings"));
            return UpdateOutcome::Rejected;
        }

        self.settings.send_modify(|s| update.apply_to(s));
        debug!(?update, "Settings updated");

        let write = MetricWrite {
            metric_type: update.metric_type(),
            value: update.metric_value(),
        };
        match self.persist(write).await {
            Ok(()) => UpdateOutcome::Saved,
            Err(e) => {
                self.notifier
                    .notify(e.to_notice(&format!("Saving {}", update.field())));
                UpdateOutcome::SavedLocally
            }
        }
    }

    /// Set a custom macro split (premium only)
    ///
    /// The three percentages are persisted as independent metrics; if some of
    /// them fail the ratio stays applied in memory and the failure is reported.
    pub async fn update_custom_macro_ratio(&self, ratio: MacroRatio) -> UpdateOutcome {
        if !self.is_premium() {
            info!("Custom macro ratio requested without premium");
            self.notifier
                .info("Custom macro ratios are available with a premium subscription");
            return UpdateOutcome::PremiumRequired;
        }

        if let Err(msg) = validate_macro_ratio(&ratio) {
            warn!(?ratio, %msg, "Rejected custom macro ratio");
            let err = EngineError::Validation(
                ValidationError::new("custom_macro_ratio", &msg).user_message(),
            );
            self.notifier.notify(err.to_notice("Updating macro split"));
            return UpdateOutcome::Rejected;
        }

        self.settings
            .send_modify(|s| s.custom_macro_ratio = Some(ratio));

        let writes = [
            (MetricType::MacroProtein, ratio.protein),
            (MetricType::MacroCarbs, ratio.carbs),
            (MetricType::MacroFats, ratio.fats),
        ];
        let mut failed = Vec::new();
        for (metric_type, value) in writes {
            let write = MetricWrite {
                metric_type,
                value: MetricValue::Number(value),
            };
            if let Err(e) = self.persist(write).await {
                warn!(metric = %metric_type, error = %e, "Failed to save macro percentage");
                failed.push(metric_type.as_str());
            }
        }

        if failed.is_empty() {
            UpdateOutcome::Saved
        } else {
            self.notifier.failure(format!(
                "Saving macro split failed for: {}. Please try again.",
                failed.join(", ")
            ));
            UpdateOutcome::SavedLocally
        }
    }

    /// Drop the custom split so the goal's default applies again
    pub fn clear_custom_macro_ratio(&self) -> bool {
        self.settings.send_if_modified(|s| s.custom_macro_ratio.take().is_some())
    }

    /// Overwrite settings fields from the newest value of each stored series
    ///
    /// Series with no values are skipped; values that fail type or range
    /// checks are discarded. This replaces fields wholesale, so callers must
    /// not run it concurrently with edits. Returns the number of fields
    /// applied.
    pub async fn load_health_metrics(&self) -> usize {
        let mut updates = Vec::new();
        let mut unreadable = Vec::new();

        for metric_type in MetricType::PROFILE {
            let Some(value) = self.newest_value(metric_type, &mut unreadable).await else {
                continue;
            };
            match SettingUpdate::from_metric(metric_type, &value) {
                Some(update) => updates.push(update),
                None => debug!(metric = %metric_type, ?value, "Discarding invalid stored value"),
            }
        }

        let mut custom_ratio = None;
        if self.is_premium() {
            let mut parts = Vec::with_capacity(3);
            for metric_type in MetricType::MACROS {
                let part = self
                    .newest_value(metric_type, &mut unreadable)
                    .await
                    .and_then(|v| v.as_f64());
                parts.push(part);
            }
            if let [Some(protein), Some(carbs), Some(fats)] = parts[..] {
                let ratio = MacroRatio::new(protein, carbs, fats);
                if validate_macro_ratio(&ratio).is_ok() {
                    custom_ratio = Some(ratio);
                } else {
                    debug!(?ratio, "Discarding invalid stored macro ratio");
                }
            }
        }

        if !unreadable.is_empty() {
            self.notifier.failure(format!(
                "Could not load some health metrics ({}). Showing what is available.",
                unreadable.join(", ")
            ));
        }

        let applied = updates.len() + usize::from(custom_ratio.is_some());
        if applied > 0 {
            self.settings.send_modify(|s| {
                for update in &updates {
                    update.apply_to(s);
                }
                if custom_ratio.is_some() {
                    s.custom_macro_ratio = custom_ratio;
                }
            });
        }
        info!(applied, "Health metrics loaded");
        applied
    }

    async fn newest_value(
        &self,
        metric_type: MetricType,
        unreadable: &mut Vec<&'static str>,
    ) -> Option<MetricValue> {
        match self.repo.read_metric_series(metric_type).await {
            Ok(series) => series.into_iter().next().map(|r: MetricRecord| r.value),
            Err(e) => {
                warn!(metric = %metric_type, error = %e, "Failed to read metric series");
                unreadable.push(metric_type.as_str());
                None
            }
        }
    }

    async fn persist(&self, write: MetricWrite) -> EngineResult<()> {
        self.repo.write_metric(write).await?;
        Ok(())
    }
}
