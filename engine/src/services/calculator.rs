//! Nutrition calculator - derives daily targets from settings
//!
//! The pure pipeline lives in the shared crate so the WASM module runs the
//! same code. [`NutritionCalculator`] keeps the latest valid result in a
//! watch channel and recomputes whenever the settings it tracks change.

pub use nutrition_tracker_shared::calculate_nutrition;
use nutrition_tracker_shared::{NutritionCalculations, NutritionSettings};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Reactive holder of the latest [`NutritionCalculations`]
///
/// Starts empty when the initial settings are invalid; afterwards an invalid
/// settings value leaves the previous result in place.
#[derive(Debug)]
pub struct NutritionCalculator {
    tx: watch::Sender<Option<NutritionCalculations>>,
}

impl NutritionCalculator {
    pub fn new(initial: &NutritionSettings) -> Self {
        let (tx, _) = watch::channel(None);
        let calculator = Self { tx };
        calculator.apply(initial);
        calculator
    }

    /// Recompute from `settings`; returns whether a new value was published
    ///
    /// Publishing an identical result does not wake subscribers.
    pub fn apply(&self, settings: &NutritionSettings) -> bool {
        match calculate_nutrition(settings) {
            Ok(calculations) => {
                debug!(
                    bmr = calculations.bmr,
                    tdee = calculations.tdee,
                    calorie_target = calculations.calorie_target,
                    "Nutrition targets recalculated"
                );
                self.tx.send_if_modified(|current| {
                    if current.as_ref() == Some(&calculations) {
                        false
                    } else {
                        *current = Some(calculations);
                        true
                    }
                })
            }
            Err(e) => {
                warn!(error = %e, "Skipping recalculation, keeping previous targets");
                false
            }
        }
    }

    /// Latest valid targets, if any
    pub fn current(&self) -> Option<NutritionCalculations> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<NutritionCalculations>> {
        self.tx.subscribe()
    }

    /// Build a calculator that follows a settings channel
    ///
    /// The spawned task ends when the settings sender is dropped.
    pub fn track(
        mut settings: watch::Receiver<NutritionSettings>,
    ) -> (Arc<Self>, JoinHandle<()>) {
        let initial = settings.borrow_and_update().clone();
        let calculator = Arc::new(Self::new(&initial));

        let task_calculator = Arc::clone(&calculator);
        let handle = tokio::spawn(async move {
            while settings.changed().await.is_ok() {
                let latest = settings.borrow_and_update().clone();
                task_calculator.apply(&latest);
            }
            debug!("Settings channel closed, calculator stopped");
        });

        (calculator, handle)
    }
}
