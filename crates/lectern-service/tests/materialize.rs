#![expect(clippy::unwrap_used, reason = "tests fail loudly on bad fixtures")]

mod common;

use chrono::Weekday;
use common::{Fixture, OccurrenceBuilder, date, time};
use lectern_db::db::enums::{RecurrencePattern, ScheduleStatus, SessionStatus};
use lectern_db::model::reference::Subject;
use lectern_service::materialize::MaterializeOutcome;
use uuid::Uuid;

// Monday 2025-01-20, 18:00 local.
fn fixture() -> Fixture {
    Fixture::at(date(2025, 1, 20), time(18, 0))
}

#[test_log::test(tokio::test)]
async fn weekly_series_gets_next_weeks_occurrence() {
    let fx = fixture();
    let root = OccurrenceBuilder::root(date(2025, 1, 13)).build();
    let today = OccurrenceBuilder::follow(&root, date(2025, 1, 20)).build();
    fx.store.seed([root.clone(), today.clone()]).await;

    let created = fx.sweeper.materializer().materialize_next(&today).await.unwrap();

    assert_eq!(created.occurrence_date, date(2025, 1, 27));
    assert_eq!(created.day, "Monday");
    assert_eq!(created.series_id, Some(root.id));
    assert_eq!(created.schedule_status, ScheduleStatus::Scheduled);
    assert_eq!(created.session_status, SessionStatus::Pending);
    assert_eq!(created.start_time, time(16, 0));
    assert_eq!(created.created_by, root.created_by);
    assert_eq!(created.lessons, serde_json::json!([]));
    assert!(!created.has_temporary_change());
    assert!(!created.has_permanent_change());
}

#[test_log::test(tokio::test)]
async fn series_root_extends_itself() {
    let fx = fixture();
    let root = OccurrenceBuilder::root(date(2025, 1, 20)).build();
    fx.store.seed([root.clone()]).await;

    let created = fx.sweeper.materializer().materialize_next(&root).await.unwrap();

    assert_eq!(created.series_id, Some(root.id));
    assert_eq!(created.occurrence_date, date(2025, 1, 27));
}

#[test_log::test(tokio::test)]
async fn materializing_twice_creates_one_occurrence() {
    let fx = fixture();
    let root = OccurrenceBuilder::root(date(2025, 1, 20)).build();
    fx.store.seed([root.clone()]).await;
    let materializer = fx.sweeper.materializer();

    let first = materializer.materialize(&root).await;
    let second = materializer.materialize(&root).await;

    assert!(matches!(first, MaterializeOutcome::Created(_)));
    assert_eq!(
        second,
        MaterializeOutcome::AlreadyExists {
            next_date: date(2025, 1, 27)
        }
    );
    assert_eq!(fx.rows_on(date(2025, 1, 27)).await.len(), 1);
}

#[test_log::test(tokio::test)]
async fn temporary_reschedule_does_not_carry_forward() {
    let fx = fixture();
    let root = OccurrenceBuilder::root(date(2025, 1, 6)).build();
    let clean = OccurrenceBuilder::follow(&root, date(2025, 1, 13)).build();
    let moved = OccurrenceBuilder::follow(&root, date(2025, 1, 20))
        .temporary_reschedule(time(10, 0), time(11, 0))
        .build();
    fx.store.seed([root, clean, moved.clone()]).await;

    let created = fx.sweeper.materializer().materialize_next(&moved).await.unwrap();

    assert_eq!(created.start_time, time(16, 0));
    assert_eq!(created.end_time, time(17, 0));
    assert!(!created.is_temporary_change);
}

#[test_log::test(tokio::test)]
async fn substitute_teacher_does_not_carry_forward() {
    let fx = fixture();
    let root = OccurrenceBuilder::root(date(2025, 1, 13)).build();
    let covered = OccurrenceBuilder::follow(&root, date(2025, 1, 20))
        .temporary_teacher(Uuid::now_v7(), "Substitute")
        .build();
    fx.store.seed([root.clone(), covered.clone()]).await;

    let created = fx.sweeper.materializer().materialize_next(&covered).await.unwrap();

    assert_eq!(created.teacher_id, root.teacher_id);
    assert_eq!(created.teacher_name, root.teacher_name);
}

#[test_log::test(tokio::test)]
async fn permanent_teacher_change_carries_forward() {
    let fx = fixture();
    let root = OccurrenceBuilder::root(date(2025, 1, 6)).build();
    let clean = OccurrenceBuilder::follow(&root, date(2025, 1, 13)).build();
    let new_teacher = Uuid::now_v7();
    let changed = OccurrenceBuilder::follow(&root, date(2025, 1, 20))
        .permanent_teacher(new_teacher, "M. Rao")
        .build();
    fx.store.seed([root, clean, changed.clone()]).await;

    let created = fx.sweeper.materializer().materialize_next(&changed).await.unwrap();

    assert_eq!(created.teacher_id, new_teacher);
    assert_eq!(created.teacher_name, "M. Rao");
    assert_eq!(created.reschedule_type, None);
}

#[test_log::test(tokio::test)]
async fn one_off_class_is_left_alone() {
    let fx = fixture();
    let single = OccurrenceBuilder::root(date(2025, 1, 20)).one_off().build();
    fx.store.seed([single.clone()]).await;

    let outcome = fx.sweeper.materializer().materialize(&single).await;

    assert_eq!(outcome, MaterializeOutcome::NotRecurring);
    assert_eq!(fx.store.snapshot().await.len(), 1);
}

#[test_log::test(tokio::test)]
async fn custom_pattern_without_days_creates_nothing() {
    let fx = fixture();
    let broken = OccurrenceBuilder::root(date(2025, 1, 20))
        .pattern(RecurrencePattern::Custom)
        .build();
    fx.store.seed([broken.clone()]).await;

    let outcome = fx.sweeper.materializer().materialize(&broken).await;

    assert_eq!(outcome, MaterializeOutcome::NoNextDate);
    assert!(outcome.into_created().is_none());
    assert_eq!(fx.store.snapshot().await.len(), 1);
}

#[test_log::test(tokio::test)]
async fn custom_days_pick_the_next_listed_day() {
    let fx = Fixture::at(date(2025, 1, 23), time(18, 0));
    let thursday = OccurrenceBuilder::root(date(2025, 1, 23))
        .custom_days(&[Weekday::Tue, Weekday::Thu])
        .build();
    fx.store.seed([thursday.clone()]).await;

    let created = fx.sweeper.materializer().materialize_next(&thursday).await.unwrap();

    assert_eq!(created.occurrence_date, date(2025, 1, 28));
    assert_eq!(created.day, "Tuesday");
    assert_eq!(created.custom_days, vec!["Tuesday", "Thursday"]);
}

#[test_log::test(tokio::test)]
async fn unknown_custom_day_names_do_not_break_the_series() {
    let fx = Fixture::at(date(2025, 1, 23), time(18, 0));
    let thursday = OccurrenceBuilder::root(date(2025, 1, 23))
        .custom_day_names(&["tue", "Thursday", "Funday"])
        .build();
    fx.store.seed([thursday.clone()]).await;

    let outcome = fx.sweeper.materializer().materialize(&thursday).await;
    let created = outcome.into_created().unwrap();

    assert_eq!(created.occurrence_date, date(2025, 1, 28));
    assert_eq!(created.custom_days, vec!["Tuesday", "Thursday"]);
    assert!(created.validate().is_ok());

    // The normalized record extends cleanly as well.
    fx.clock.advance(chrono::TimeDelta::days(5));
    let following = fx.sweeper.materializer().materialize_next(&created).await.unwrap();
    assert_eq!(following.occurrence_date, date(2025, 1, 30));
}

#[test_log::test(tokio::test)]
async fn write_failure_is_reported_not_raised() {
    let fx = fixture();
    let root = OccurrenceBuilder::root(date(2025, 1, 20)).build();
    fx.store.seed([root.clone()]).await;
    fx.store.fail_writes(true);

    let outcome = fx.sweeper.materializer().materialize(&root).await;

    assert_eq!(
        outcome,
        MaterializeOutcome::Failed {
            next_date: date(2025, 1, 27)
        }
    );
    assert!(fx.rows_on(date(2025, 1, 27)).await.is_empty());
}

#[test_log::test(tokio::test)]
async fn names_are_refreshed_from_the_directory() {
    let fx = fixture();
    let root = OccurrenceBuilder::root(date(2025, 1, 20)).build();
    fx.store.seed([root.clone()]).await;
    fx.directory.put_user(root.teacher_id, "Ravi Iyer").await;
    fx.directory
        .put_subject(Subject {
            id: root.subject_id,
            name: "Algebra II".to_string(),
            subject_type: None,
        })
        .await;

    let created = fx.sweeper.materializer().materialize_next(&root).await.unwrap();

    assert_eq!(created.teacher_name, "Ravi Iyer");
    assert_eq!(created.subject_name, "Algebra II");
    // Unknown to the directory: template values survive.
    assert_eq!(created.student_names, root.student_names);
    assert_eq!(created.subject_type, root.subject_type);
}
