#![expect(clippy::unwrap_used, reason = "tests fail loudly on bad fixtures")]

mod common;

use std::time::Duration;

use common::{Fixture, OccurrenceBuilder, date, settings, time};
use lectern_core::config::ScheduleConfig;

fn fast_settings() -> ScheduleConfig {
    ScheduleConfig {
        sweep_interval_minutes: 30,
        startup_delay_seconds: 10,
        ..settings()
    }
}

async fn seeded() -> Fixture {
    let fx = Fixture::with_settings(date(2025, 1, 20), time(18, 0), fast_settings());
    fx.store
        .seed([OccurrenceBuilder::root(date(2025, 1, 20)).build()])
        .await;
    fx
}

#[test_log::test(tokio::test(start_paused = true))]
async fn first_sweep_runs_after_startup_delay() {
    let fx = seeded().await;
    let handle = fx.sweeper.start_periodic_sweep().unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(fx.rows_on(date(2025, 1, 27)).await.is_empty());

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(fx.rows_on(date(2025, 1, 27)).await.len(), 1);

    handle.stop();
    handle.join().await.unwrap();
}

#[test_log::test(tokio::test(start_paused = true))]
async fn later_ticks_stay_idempotent() {
    let fx = seeded().await;
    let handle = fx.sweeper.start_periodic_sweep().unwrap();

    tokio::time::sleep(Duration::from_secs(3 * 30 * 60)).await;

    assert_eq!(fx.rows_on(date(2025, 1, 27)).await.len(), 1);
    handle.stop();
    handle.join().await.unwrap();
}

#[test_log::test(tokio::test(start_paused = true))]
async fn only_one_timer_per_sweeper() {
    let fx = seeded().await;
    let handle = fx.sweeper.start_periodic_sweep().unwrap();

    assert!(fx.sweeper.start_periodic_sweep().is_none());

    handle.stop();
    handle.join().await.unwrap();

    let restarted = fx.sweeper.start_periodic_sweep().unwrap();
    restarted.stop();
    restarted.join().await.unwrap();
}

#[test_log::test(tokio::test(start_paused = true))]
async fn stopping_before_the_first_tick_skips_all_sweeps() {
    let fx = seeded().await;
    let handle = fx.sweeper.start_periodic_sweep().unwrap();

    handle.stop();
    handle.join().await.unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert!(fx.rows_on(date(2025, 1, 27)).await.is_empty());
}
