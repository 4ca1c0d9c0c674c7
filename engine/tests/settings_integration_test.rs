//! Integration tests for settings, health metrics and recalculated targets

mod common;

use common::{premium_config, test_engine};
use nutrition_tracker_engine::config::EngineConfig;
use nutrition_tracker_engine::notices::NoticeKind;
use nutrition_tracker_engine::services::{SettingUpdate, UpdateOutcome};
use nutrition_tracker_shared::{
    ActivityLevel, FitnessGoal, Gender, MacroRatio, MetricType, MetricValue,
};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_goal_change_recalculates_targets() {
    let (engine, repo) = test_engine(EngineConfig::default());
    let mut targets = engine.calculator.subscribe();
    assert_eq!(engine.calculator.current().unwrap().calorie_target, 2507);

    let outcome = engine
        .settings
        .update_setting(SettingUpdate::FitnessGoal(FitnessGoal::WeightLoss))
        .await;
    assert_eq!(outcome, UpdateOutcome::Saved);

    targets.changed().await.unwrap();
    let calculations = engine.calculator.current().unwrap();
    assert_eq!(calculations.calorie_target, 2006);
    assert_eq!(calculations.macro_ratios, MacroRatio::new(40.0, 30.0, 30.0));
    assert_eq!(
        repo.latest_metric(MetricType::FitnessGoal).await,
        Some(MetricValue::Text("weight_loss".to_string()))
    );
}

#[tokio::test]
async fn test_failed_save_keeps_local_change() {
    let (engine, repo) = test_engine(EngineConfig::default());
    let mut notices = engine.notices();
    repo.failures.write_metric.store(true, Ordering::SeqCst);

    let outcome = engine.settings.update_setting(SettingUpdate::Age(45)).await;

    assert_eq!(outcome, UpdateOutcome::SavedLocally);
    assert_eq!(engine.settings.settings().age, 45);
    assert_eq!(notices.recv().await.unwrap().kind, NoticeKind::Failure);
    assert!(repo.latest_metric(MetricType::Age).await.is_none());
}

#[tokio::test]
async fn test_out_of_range_update_is_rejected() {
    let (engine, repo) = test_engine(EngineConfig::default());
    let mut notices = engine.notices();

    let outcome = engine
        .settings
        .update_setting(SettingUpdate::Weight(1200.0))
        .await;

    assert_eq!(outcome, UpdateOutcome::Rejected);
    assert_eq!(engine.settings.settings().weight, 70.0);
    assert_eq!(notices.recv().await.unwrap().kind, NoticeKind::Validation);
    assert!(repo.latest_metric(MetricType::Weight).await.is_none());
}

#[tokio::test]
async fn test_custom_ratio_requires_premium() {
    let (engine, repo) = test_engine(EngineConfig::default());
    let mut notices = engine.notices();

    let outcome = engine
        .settings
        .update_custom_macro_ratio(MacroRatio::new(40.0, 40.0, 20.0))
        .await;

    assert_eq!(outcome, UpdateOutcome::PremiumRequired);
    assert!(engine.settings.settings().custom_macro_ratio.is_none());
    assert_eq!(notices.recv().await.unwrap().kind, NoticeKind::Info);
    assert!(repo.latest_metric(MetricType::MacroProtein).await.is_none());
}

#[tokio::test]
async fn test_premium_custom_ratio_drives_macros() {
    let (engine, repo) = test_engine(premium_config());
    let mut targets = engine.calculator.subscribe();

    let outcome = engine
        .settings
        .update_custom_macro_ratio(MacroRatio::new(40.0, 40.0, 20.0))
        .await;
    assert_eq!(outcome, UpdateOutcome::Saved);

    targets.changed().await.unwrap();
    let calculations = engine.calculator.current().unwrap();
    assert_eq!(calculations.macro_ratios, MacroRatio::new(40.0, 40.0, 20.0));
    // 2507.125 * 0.4 / 4
    assert_eq!(calculations.macros.protein, 251.0);
    assert_eq!(
        repo.latest_metric(MetricType::MacroFats).await,
        Some(MetricValue::Number(20.0))
    );

    assert!(engine.settings.clear_custom_macro_ratio());
    targets.changed().await.unwrap();
    assert_eq!(
        engine.calculator.current().unwrap().macro_ratios,
        MacroRatio::new(30.0, 40.0, 30.0)
    );
}

#[tokio::test]
async fn test_health_metrics_overwrite_profile() {
    let (engine, repo) = test_engine(premium_config());
    repo.seed_metric(MetricType::Weight, 90.0).await;
    repo.seed_metric(MetricType::Weight, 85.0).await;
    repo.seed_metric(MetricType::Height, "182").await;
    repo.seed_metric(MetricType::Gender, "female").await;
    repo.seed_metric(MetricType::ActivityLevel, "very_active").await;
    repo.seed_metric(MetricType::Age, 900.0).await;
    repo.seed_metric(MetricType::MacroProtein, 35.0).await;
    repo.seed_metric(MetricType::MacroCarbs, 45.0).await;
    repo.seed_metric(MetricType::MacroFats, 20.0).await;

    let applied = engine.settings.load_health_metrics().await;

    let settings = engine.settings.settings();
    assert_eq!(applied, 5);
    assert_eq!(settings.weight, 85.0);
    assert_eq!(settings.height, 182.0);
    assert_eq!(settings.gender, Gender::Female);
    assert_eq!(settings.activity_level, ActivityLevel::VeryActive);
    // Out of range, default kept
    assert_eq!(settings.age, 30);
    assert_eq!(settings.custom_macro_ratio, Some(MacroRatio::new(35.0, 45.0, 20.0)));
}

#[tokio::test]
async fn test_health_metrics_read_failure_keeps_defaults() {
    let (engine, repo) = test_engine(EngineConfig::default());
    let mut notices = engine.notices();
    repo.seed_metric(MetricType::Weight, 82.0).await;
    repo.failures.read_metric.store(true, Ordering::SeqCst);

    let applied = engine.settings.load_health_metrics().await;

    assert_eq!(applied, 0);
    assert_eq!(engine.settings.settings().weight, 70.0);
    assert_eq!(notices.recv().await.unwrap().kind, NoticeKind::Failure);
    assert_eq!(engine.calculator.current().unwrap().calorie_target, 2507);
}
