//! Model for one dated class meeting.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use diesel::{pg::Pg, prelude::*};
use lectern_core::error::{CoreError, CoreResult};
use lectern_core::types::parse_weekday;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::db::enums::{ChangeType, RecurrencePattern, ScheduleStatus, SessionStatus};
use crate::db::schema;

/// One concrete scheduled meeting of a teacher with students for a subject.
///
/// `series_id` points at the first occurrence of the recurring series; it is
/// `None` on the series root itself.
#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::class_occurrence)]
#[diesel(check_for_backend(Pg))]
pub struct ClassOccurrence {
    pub id: Uuid,
    pub series_id: Option<Uuid>,

    pub student_ids: Vec<Uuid>,
    pub student_names: Vec<String>,
    /// Hash of the sorted participant set, see [`participant_key`].
    pub participant_key: String,
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub subject_id: Uuid,
    pub subject_name: String,
    pub subject_type: Option<String>,

    pub day: String,
    pub occurrence_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,

    pub schedule_status: ScheduleStatus,
    pub session_status: SessionStatus,

    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub custom_days: Vec<String>,
    /// Stored for the admin UI; the generator does not stop at this date.
    pub recurrence_end_date: Option<NaiveDate>,

    pub is_temporary_change: bool,
    pub reschedule_type: Option<ChangeType>,
    pub is_teacher_temporary_change: bool,
    pub teacher_change_type: Option<ChangeType>,

    pub teacher_available_at: Option<DateTime<Utc>>,
    pub class_started_at: Option<DateTime<Utc>>,
    pub class_ended_at: Option<DateTime<Utc>>,
    pub start_delay_minutes: i32,
    pub early_end_minutes: i32,
    pub scheduled_duration_minutes: i32,
    pub actual_duration_minutes: Option<i32>,

    pub lessons: serde_json::Value,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert struct for creating new occurrences
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = schema::class_occurrence)]
pub struct NewClassOccurrence {
    pub id: Uuid,
    pub series_id: Option<Uuid>,
    pub student_ids: Vec<Uuid>,
    pub student_names: Vec<String>,
    pub participant_key: String,
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub subject_id: Uuid,
    pub subject_name: String,
    pub subject_type: Option<String>,
    pub day: String,
    pub occurrence_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub schedule_status: ScheduleStatus,
    pub session_status: SessionStatus,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub custom_days: Vec<String>,
    pub recurrence_end_date: Option<NaiveDate>,
    pub is_temporary_change: bool,
    pub reschedule_type: Option<ChangeType>,
    pub is_teacher_temporary_change: bool,
    pub teacher_change_type: Option<ChangeType>,
    pub teacher_available_at: Option<DateTime<Utc>>,
    pub class_started_at: Option<DateTime<Utc>>,
    pub class_ended_at: Option<DateTime<Utc>>,
    pub start_delay_minutes: i32,
    pub early_end_minutes: i32,
    pub scheduled_duration_minutes: i32,
    pub actual_duration_minutes: Option<i32>,
    pub lessons: serde_json::Value,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}

/// ## Summary
/// Stable hash of a participant set.
///
/// Order and duplicates do not matter: `[a, b]`, `[b, a]` and `[a, b, a]`
/// produce the same key.
#[must_use]
pub fn participant_key(student_ids: &[Uuid]) -> String {
    let mut ids = student_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mut hasher = Sha256::new();
    for id in &ids {
        hasher.update(id.as_bytes());
    }
    hex::encode(hasher.finalize())
}

impl ClassOccurrence {
    /// Identifier shared by every occurrence of this record's series.
    #[must_use]
    pub fn series_key(&self) -> Uuid {
        self.series_id.unwrap_or(self.id)
    }

    /// ## Summary
    /// True if any part of this occurrence was declared a one-off deviation.
    ///
    /// Such an occurrence must never seed the next one in its series.
    #[must_use]
    pub fn has_temporary_change(&self) -> bool {
        self.is_temporary_change
            || self.is_teacher_temporary_change
            || self.reschedule_type == Some(ChangeType::Temporary)
            || self.teacher_change_type == Some(ChangeType::Temporary)
    }

    /// True if a time or teacher change on this occurrence was declared durable.
    #[must_use]
    pub fn has_permanent_change(&self) -> bool {
        self.reschedule_type == Some(ChangeType::Permanent)
            || self.teacher_change_type == Some(ChangeType::Permanent)
    }

    /// ## Summary
    /// Weekdays named in `custom_days`, in stored order.
    ///
    /// Unparseable names are dropped; an all-invalid list yields an empty vector.
    /// Validation applies the same rule: a custom pattern needs at least one
    /// recognised day.
    #[must_use]
    pub fn custom_weekdays(&self) -> Vec<Weekday> {
        self.custom_days
            .iter()
            .filter_map(|name| parse_weekday(name).ok())
            .collect()
    }

    /// ## Summary
    /// Checks the record-level invariants.
    ///
    /// ## Errors
    /// Returns `CoreError::ValidationError` naming the first violated rule.
    pub fn validate(&self) -> CoreResult<()> {
        validate_fields(&Fields {
            student_ids: &self.student_ids,
            start_time: self.start_time,
            end_time: self.end_time,
            is_recurring: self.is_recurring,
            recurrence_pattern: self.recurrence_pattern,
            custom_days: &self.custom_days,
        })
    }
}

impl NewClassOccurrence {
    /// ## Summary
    /// Checks the record-level invariants before insertion.
    ///
    /// ## Errors
    /// Returns `CoreError::ValidationError` naming the first violated rule.
    pub fn validate(&self) -> CoreResult<()> {
        if self.participant_key != participant_key(&self.student_ids) {
            return Err(CoreError::ValidationError(
                "participant_key does not match student_ids".to_string(),
            ));
        }
        validate_fields(&Fields {
            student_ids: &self.student_ids,
            start_time: self.start_time,
            end_time: self.end_time,
            is_recurring: self.is_recurring,
            recurrence_pattern: self.recurrence_pattern,
            custom_days: &self.custom_days,
        })
    }

    /// Identifier of the series this record will belong to.
    #[must_use]
    pub fn series_key(&self) -> Uuid {
        self.series_id.unwrap_or(self.id)
    }

    /// ## Summary
    /// Materializes the stored row, as the database would return it.
    ///
    /// Used by stores that do not round-trip through `PostgreSQL`.
    #[must_use]
    pub fn into_stored(self, now: DateTime<Utc>) -> ClassOccurrence {
        ClassOccurrence {
            id: self.id,
            series_id: self.series_id,
            student_ids: self.student_ids,
            student_names: self.student_names,
            participant_key: self.participant_key,
            teacher_id: self.teacher_id,
            teacher_name: self.teacher_name,
            subject_id: self.subject_id,
            subject_name: self.subject_name,
            subject_type: self.subject_type,
            day: self.day,
            occurrence_date: self.occurrence_date,
            start_time: self.start_time,
            end_time: self.end_time,
            schedule_status: self.schedule_status,
            session_status: self.session_status,
            is_recurring: self.is_recurring,
            recurrence_pattern: self.recurrence_pattern,
            custom_days: self.custom_days,
            recurrence_end_date: self.recurrence_end_date,
            is_temporary_change: self.is_temporary_change,
            reschedule_type: self.reschedule_type,
            is_teacher_temporary_change: self.is_teacher_temporary_change,
            teacher_change_type: self.teacher_change_type,
            teacher_available_at: self.teacher_available_at,
            class_started_at: self.class_started_at,
            class_ended_at: self.class_ended_at,
            start_delay_minutes: self.start_delay_minutes,
            early_end_minutes: self.early_end_minutes,
            scheduled_duration_minutes: self.scheduled_duration_minutes,
            actual_duration_minutes: self.actual_duration_minutes,
            lessons: self.lessons,
            created_by: self.created_by,
            updated_by: self.updated_by,
            created_at: now,
            updated_at: now,
        }
    }
}

struct Fields<'a> {
    student_ids: &'a [Uuid],
    start_time: NaiveTime,
    end_time: NaiveTime,
    is_recurring: bool,
    recurrence_pattern: Option<RecurrencePattern>,
    custom_days: &'a [String],
}

fn validate_fields(fields: &Fields<'_>) -> CoreResult<()> {
    if fields.student_ids.is_empty() {
        return Err(CoreError::ValidationError(
            "an occurrence needs at least one student".to_string(),
        ));
    }
    if fields.start_time >= fields.end_time {
        return Err(CoreError::ValidationError(format!(
            "start_time {} is not before end_time {}",
            fields.start_time, fields.end_time
        )));
    }
    if fields.is_recurring && fields.recurrence_pattern.is_none() {
        return Err(CoreError::ValidationError(
            "recurring occurrence has no recurrence_pattern".to_string(),
        ));
    }
    if fields.recurrence_pattern == Some(RecurrencePattern::Custom) {
        if fields.custom_days.is_empty() {
            return Err(CoreError::ValidationError(
                "custom recurrence requires custom_days".to_string(),
            ));
        }
        if !fields
            .custom_days
            .iter()
            .any(|name| parse_weekday(name).is_ok())
        {
            return Err(CoreError::ValidationError(format!(
                "custom_days names no known weekday: {:?}",
                fields.custom_days
            )));
        }
    }
    Ok(())
}
