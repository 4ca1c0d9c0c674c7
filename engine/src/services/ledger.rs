//! Meal ledger store and loader
//!
//! [`MealLedgerStore`] owns the ledger and running totals for the date being
//! viewed. Loading follows a small state machine:
//!
//! ```text
//! Idle -> Loading -> Loaded | Aborted | Failed
//! ```
//!
//! Every load gets a fresh [`LoadToken`] and cancels the previous one. Only
//! the most recently issued load may commit; a superseded load discards its
//! result even if the fetch eventually resolves.

use crate::notices::Notifier;
use crate::repositories::NutritionRepository;
use crate::services::nutrition::ledger_totals;
use chrono::NaiveDate;
use nutrition_tracker_shared::{MealLedger, NutrientTotals, StoredMeal};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, error, warn};

/// Cancellation handle tied to one load invocation
#[derive(Debug, Clone)]
pub struct LoadToken {
    tx: Arc<watch::Sender<bool>>,
}

impl LoadToken {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for LoadToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the ledger is in its load cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    /// The consumer went away while a load was in flight
    Aborted,
    Failed,
}

/// Result of one load invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// A newer load or a teardown cancelled this one; nothing was applied
    Superseded,
    Failed,
}

/// Read-only view of the ledger published to subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    /// Most recently requested date; differs from `ledger.date` while a load
    /// for another date is in flight
    pub requested: NaiveDate,
    pub ledger: MealLedger,
    pub totals: NutrientTotals,
    pub state: LoadState,
}

impl LedgerSnapshot {
    fn idle(date: NaiveDate) -> Self {
        Self {
            requested: date,
            ledger: MealLedger::empty(date),
            totals: NutrientTotals::default(),
            state: LoadState::Idle,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }
}

/// Owner of the per-date meal ledger and its running totals
pub struct MealLedgerStore {
    pub(crate) state: watch::Sender<LedgerSnapshot>,
    pub(crate) repo: Arc<dyn NutritionRepository>,
    pub(crate) notifier: Notifier,
    active: Mutex<LoadToken>,
}

impl MealLedgerStore {
    /// Create an idle store showing an empty ledger for `date`
    pub fn new(date: NaiveDate, repo: Arc<dyn NutritionRepository>, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(LedgerSnapshot::idle(date));
        Self {
            state,
            repo,
            notifier,
            active: Mutex::new(LoadToken::new()),
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LedgerSnapshot> {
        self.state.subscribe()
    }

    pub fn ledger(&self) -> MealLedger {
        self.state.borrow().ledger.clone()
    }

    /// Running totals, maintained incrementally
    pub fn totals(&self) -> NutrientTotals {
        self.state.borrow().totals
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Date most recently requested for display
    pub fn date(&self) -> NaiveDate {
        self.state.borrow().requested
    }

    /// Fetch and publish the ledger for `date`, superseding any load in flight
    pub async fn load(&self, date: NaiveDate) -> LoadOutcome {
        let token = self.begin_load(date);
        debug!(%date, "Loading meals");

        let fetched = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(%date, "Meal load superseded before fetch completed");
                return LoadOutcome::Superseded;
            }
            result = self.repo.fetch_meals_for_date(date) => result,
        };

        match fetched {
            Ok(rows) => {
                let ledger = partition_meals(date, rows);
                let totals = ledger_totals(&ledger);
                let meal_count = ledger.len();
                let committed = self.state.send_if_modified(|snap| {
                    if token.is_cancelled() {
                        return false;
                    }
                    snap.ledger = ledger;
                    snap.totals = totals;
                    snap.state = LoadState::Loaded;
                    true
                });
                if committed {
                    debug!(%date, meal_count, "Meals loaded");
                    LoadOutcome::Loaded
                } else {
                    debug!(%date, "Discarding meals from superseded load");
                    LoadOutcome::Superseded
                }
            }
            Err(e) => {
                let committed = self.state.send_if_modified(|snap| {
                    if token.is_cancelled() {
                        return false;
                    }
                    snap.ledger = MealLedger::empty(date);
                    snap.totals = NutrientTotals::default();
                    snap.state = LoadState::Failed;
                    true
                });
                if !committed {
                    debug!(%date, "Ignoring failure of superseded load");
                    return LoadOutcome::Superseded;
                }
                error!(%date, "Failed to load meals: {:?}", e);
                self.notifier
                    .failure("Could not load your meals. Pull to refresh to try again.");
                LoadOutcome::Failed
            }
        }
    }

    /// Re-run a full load for the current date
    pub async fn refresh(&self) -> LoadOutcome {
        self.load(self.date()).await
    }

    /// Switch the viewed date; same as [`load`](Self::load)
    pub async fn set_date(&self, date: NaiveDate) -> LoadOutcome {
        self.load(date).await
    }

    /// Cancel any load in flight; its result will not be applied
    pub fn teardown(&self) {
        self.state.send_if_modified(|snap| {
            self.lock_active().cancel();
            if snap.state == LoadState::Loading {
                snap.state = LoadState::Aborted;
                true
            } else {
                false
            }
        });
    }

    /// Cancel the previous load and mark a new one as in flight
    ///
    /// Runs under the snapshot lock so a commit check cannot interleave with
    /// the token swap.
    fn begin_load(&self, date: NaiveDate) -> LoadToken {
        let token = LoadToken::new();
        self.state.send_modify(|snap| {
            let mut active = self.lock_active();
            active.cancel();
            *active = token.clone();
            snap.requested = date;
            snap.state = LoadState::Loading;
        });
        token
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, LoadToken> {
        // The guarded token is replaced wholesale, so a poisoned value is still usable
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Group fetched rows into buckets for `date`
///
/// Rows with an unrecognized meal type or a different date are dropped.
pub fn partition_meals(date: NaiveDate, rows: Vec<StoredMeal>) -> MealLedger {
    let mut ledger = MealLedger::empty(date);
    for row in rows {
        if row.date != date {
            warn!(id = %row.id, row_date = %row.date, %date, "Dropping meal from another date");
            continue;
        }
        match row.into_entry() {
            Ok(entry) => ledger.bucket_mut(entry.meal_type).push(entry),
            Err(e) => warn!(error = %e, "Dropping meal with unrecognized meal type"),
        }
    }
    ledger
}
