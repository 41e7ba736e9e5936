//! Shared fixtures for the schedule service integration tests.
#![expect(dead_code, reason = "each test binary uses a different subset of the fixtures")]
#![expect(clippy::unwrap_used, reason = "tests fail loudly on bad fixtures")]

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use lectern_core::config::ScheduleConfig;
use lectern_core::types::weekday_name;
use lectern_db::db::directory::MemoryNameDirectory;
use lectern_db::db::enums::{ChangeType, RecurrencePattern, ScheduleStatus, SessionStatus};
use lectern_db::db::store::MemoryOccurrenceStore;
use lectern_db::model::occurrence::{ClassOccurrence, participant_key};
use lectern_service::clock::FixedClock;
use lectern_service::sweep::ScheduleSweeper;
use uuid::Uuid;

pub const TZ: Tz = chrono_tz::Asia::Kolkata;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub struct Fixture {
    pub store: Arc<MemoryOccurrenceStore>,
    pub directory: Arc<MemoryNameDirectory>,
    pub clock: Arc<FixedClock>,
    pub sweeper: Arc<ScheduleSweeper>,
}

impl Fixture {
    /// Service wired to in-memory collaborators, with the clock reading
    /// `at` on `on` in [`TZ`].
    pub fn at(on: NaiveDate, at: NaiveTime) -> Self {
        Self::with_settings(on, at, settings())
    }

    pub fn with_settings(on: NaiveDate, at: NaiveTime, settings: ScheduleConfig) -> Self {
        let store = Arc::new(MemoryOccurrenceStore::new());
        let directory = Arc::new(MemoryNameDirectory::new());
        let clock = Arc::new(FixedClock::at_local(TZ, on.and_time(at)).unwrap());
        let sweeper = Arc::new(ScheduleSweeper::new(
            store.clone(),
            directory.clone(),
            clock.clone(),
            settings,
        ));
        Self {
            store,
            directory,
            clock,
            sweeper,
        }
    }

    pub async fn rows_on(&self, on: NaiveDate) -> Vec<ClassOccurrence> {
        self.store
            .snapshot()
            .await
            .into_iter()
            .filter(|row| row.occurrence_date == on)
            .collect()
    }
}

pub fn settings() -> ScheduleConfig {
    ScheduleConfig {
        timezone: TZ.name().to_string(),
        ..ScheduleConfig::default()
    }
}

/// Builds stored occurrences. Defaults to a weekly 16:00-17:00 series root.
#[derive(Debug, Clone)]
pub struct OccurrenceBuilder {
    occurrence: ClassOccurrence,
}

impl OccurrenceBuilder {
    pub fn root(on: NaiveDate) -> Self {
        let students = vec![Uuid::now_v7()];
        let stamp = Utc.from_utc_datetime(&on.and_time(time(6, 0)));
        Self {
            occurrence: ClassOccurrence {
                id: Uuid::now_v7(),
                series_id: None,
                participant_key: participant_key(&students),
                student_ids: students,
                student_names: vec!["Asha".to_string()],
                teacher_id: Uuid::now_v7(),
                teacher_name: "R. Iyer".to_string(),
                subject_id: Uuid::now_v7(),
                subject_name: "Algebra".to_string(),
                subject_type: Some("math".to_string()),
                day: weekday_name(on.weekday()).to_string(),
                occurrence_date: on,
                start_time: time(16, 0),
                end_time: time(17, 0),
                schedule_status: ScheduleStatus::Scheduled,
                session_status: SessionStatus::Pending,
                is_recurring: true,
                recurrence_pattern: Some(RecurrencePattern::Weekly),
                custom_days: Vec::new(),
                recurrence_end_date: None,
                is_temporary_change: false,
                reschedule_type: None,
                is_teacher_temporary_change: false,
                teacher_change_type: None,
                teacher_available_at: None,
                class_started_at: None,
                class_ended_at: None,
                start_delay_minutes: 0,
                early_end_minutes: 0,
                scheduled_duration_minutes: 60,
                actual_duration_minutes: None,
                lessons: serde_json::json!([]),
                created_by: Some(Uuid::now_v7()),
                updated_by: None,
                created_at: stamp,
                updated_at: stamp,
            },
        }
    }

    /// Next member of the same series on `on`, as it looked when created.
    pub fn follow(template: &ClassOccurrence, on: NaiveDate) -> Self {
        let mut occurrence = template.clone();
        occurrence.id = Uuid::now_v7();
        occurrence.series_id = Some(template.series_key());
        occurrence.occurrence_date = on;
        occurrence.day = weekday_name(on.weekday()).to_string();
        occurrence.is_temporary_change = false;
        occurrence.reschedule_type = None;
        occurrence.is_teacher_temporary_change = false;
        occurrence.teacher_change_type = None;
        occurrence.created_at = Utc.from_utc_datetime(&on.and_time(time(6, 0)));
        occurrence.updated_at = occurrence.created_at;
        Self { occurrence }
    }

    pub fn times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.occurrence.start_time = start;
        self.occurrence.end_time = end;
        self
    }

    pub fn subject(mut self, id: Uuid, name: &str) -> Self {
        self.occurrence.subject_id = id;
        self.occurrence.subject_name = name.to_string();
        self
    }

    pub fn pattern(mut self, pattern: RecurrencePattern) -> Self {
        self.occurrence.recurrence_pattern = Some(pattern);
        self
    }

    pub fn custom_days(mut self, days: &[Weekday]) -> Self {
        self.occurrence.recurrence_pattern = Some(RecurrencePattern::Custom);
        self.occurrence.custom_days = days
            .iter()
            .map(|day| weekday_name(*day).to_string())
            .collect();
        self
    }

    /// Custom pattern with names exactly as an admin typed them.
    pub fn custom_day_names(mut self, names: &[&str]) -> Self {
        self.occurrence.recurrence_pattern = Some(RecurrencePattern::Custom);
        self.occurrence.custom_days = names.iter().map(ToString::to_string).collect();
        self
    }

    pub fn one_off(mut self) -> Self {
        self.occurrence.is_recurring = false;
        self.occurrence.recurrence_pattern = None;
        self
    }

    /// One-off move to a different slot.
    pub fn temporary_reschedule(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.occurrence.is_temporary_change = true;
        self.occurrence.reschedule_type = Some(ChangeType::Temporary);
        self.times(start, end)
    }

    /// One-off substitute teacher.
    pub fn temporary_teacher(mut self, teacher: Uuid, name: &str) -> Self {
        self.occurrence.is_teacher_temporary_change = true;
        self.occurrence.teacher_change_type = Some(ChangeType::Temporary);
        self.occurrence.teacher_id = teacher;
        self.occurrence.teacher_name = name.to_string();
        self
    }

    /// Durable change of teacher.
    pub fn permanent_teacher(mut self, teacher: Uuid, name: &str) -> Self {
        self.occurrence.reschedule_type = Some(ChangeType::Permanent);
        self.occurrence.teacher_id = teacher;
        self.occurrence.teacher_name = name.to_string();
        self
    }

    pub fn build(self) -> ClassOccurrence {
        self.occurrence
    }
}
