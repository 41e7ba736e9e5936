//! Creates the next occurrence of a recurring series.

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};
use lectern_core::types::{format_wall_clock, weekday_name};
use lectern_db::db::directory::NameDirectory;
use lectern_db::db::enums::{ScheduleStatus, SessionStatus};
use lectern_db::db::store::{OccurrenceStore, SeriesFilter};
use lectern_db::error::DbError;
use lectern_db::model::occurrence::{ClassOccurrence, NewClassOccurrence};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{ServiceError, ServiceResult};
use crate::lineage::LineageResolver;
use crate::recurrence;

/// Result of one materialization attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterializeOutcome {
    /// A new occurrence was stored.
    Created(ClassOccurrence),
    /// The occurrence is a one-off.
    NotRecurring,
    /// The recurrence rule yields no next date (bad or empty `custom_days`).
    NoNextDate,
    /// The series already has an occurrence on the next date.
    AlreadyExists { next_date: NaiveDate },
    /// A lookup or the insert failed; details were logged.
    Failed { next_date: NaiveDate },
}

impl MaterializeOutcome {
    #[must_use]
    pub fn into_created(self) -> Option<ClassOccurrence> {
        match self {
            Self::Created(occurrence) => Some(occurrence),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::NotRecurring => "not_recurring",
            Self::NoNextDate => "no_next_date",
            Self::AlreadyExists { .. } => "already_exists",
            Self::Failed { .. } => "failed",
        }
    }
}

pub struct OccurrenceMaterializer {
    store: Arc<dyn OccurrenceStore>,
    directory: Arc<dyn NameDirectory>,
    lineage: LineageResolver,
    clock: Arc<dyn Clock>,
}

impl OccurrenceMaterializer {
    #[must_use]
    pub fn new(
        store: Arc<dyn OccurrenceStore>,
        directory: Arc<dyn NameDirectory>,
        clock: Arc<dyn Clock>,
        lookback: Days,
    ) -> Self {
        Self {
            lineage: LineageResolver::new(Arc::clone(&store), lookback),
            store,
            directory,
            clock,
        }
    }

    /// ## Summary
    /// Extends the series of `occurrence` by one occurrence.
    ///
    /// Never fails: data problems, duplicates and storage errors are reported
    /// through the returned outcome and the log.
    #[tracing::instrument(
        skip(self, occurrence),
        fields(occurrence_id = %occurrence.id, series_id = %occurrence.series_key())
    )]
    pub async fn materialize(&self, occurrence: &ClassOccurrence) -> MaterializeOutcome {
        if !occurrence.is_recurring {
            tracing::trace!("Occurrence is not recurring");
            return MaterializeOutcome::NotRecurring;
        }

        let Some(next_date) = recurrence::next_date(occurrence) else {
            tracing::warn!(
                pattern = ?occurrence.recurrence_pattern,
                custom_days = ?occurrence.custom_days,
                "Recurrence rule yields no next date; series needs a data fix"
            );
            return MaterializeOutcome::NoNextDate;
        };

        match self.try_materialize(occurrence, next_date).await {
            Ok(Some(created)) => {
                tracing::info!(
                    %next_date,
                    new_occurrence_id = %created.id,
                    start_time = %format_wall_clock(created.start_time),
                    teacher_id = %created.teacher_id,
                    "Next occurrence created"
                );
                MaterializeOutcome::Created(created)
            }
            Ok(None) | Err(ServiceError::DatabaseError(DbError::Duplicate { .. })) => {
                tracing::debug!(%next_date, "Next occurrence already exists");
                MaterializeOutcome::AlreadyExists { next_date }
            }
            Err(error) => {
                tracing::error!(%next_date, %error, "Failed to create next occurrence");
                MaterializeOutcome::Failed { next_date }
            }
        }
    }

    /// The created occurrence, or `None` for every other outcome.
    pub async fn materialize_next(&self, occurrence: &ClassOccurrence) -> Option<ClassOccurrence> {
        self.materialize(occurrence).await.into_created()
    }

    async fn try_materialize(
        &self,
        occurrence: &ClassOccurrence,
        next_date: NaiveDate,
    ) -> ServiceResult<Option<ClassOccurrence>> {
        let existing = SeriesFilter::for_occurrence(occurrence, next_date, next_date);
        if !self.store.find_in_series(&existing).await?.is_empty() {
            return Ok(None);
        }

        let resolved = self
            .lineage
            .resolve_template(occurrence, self.clock.today())
            .await?;
        tracing::debug!(
            source = resolved.source.as_str(),
            template_id = %resolved.template.id,
            "Using template"
        );

        let mut draft = draft_next(&resolved.template, next_date);
        self.refresh_names(&mut draft).await;
        draft.validate()?;

        let created = self.store.insert(draft).await?;
        Ok(Some(created))
    }

    /// Replaces the denormalized names with live ones where the directory
    /// knows them.
    async fn refresh_names(&self, draft: &mut NewClassOccurrence) {
        let mut ids = draft.student_ids.clone();
        ids.push(draft.teacher_id);

        match self.directory.user_names(&ids).await {
            Ok(names) => {
                if let Some(name) = names.get(&draft.teacher_id) {
                    draft.teacher_name.clone_from(name);
                }
                let previous = std::mem::take(&mut draft.student_names);
                draft.student_names = draft
                    .student_ids
                    .iter()
                    .enumerate()
                    .map(|(index, id)| {
                        names
                            .get(id)
                            .or_else(|| previous.get(index))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect();
            }
            Err(error) => {
                tracing::warn!(%error, "User name lookup failed, keeping template names");
            }
        }

        match self.directory.subject(draft.subject_id).await {
            Ok(Some(subject)) => {
                draft.subject_name = subject.name;
                if subject.subject_type.is_some() {
                    draft.subject_type = subject.subject_type;
                }
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(%error, "Subject lookup failed, keeping template names");
            }
        }
    }
}

/// ## Summary
/// Builds the occurrence that follows `template` on `next_date`.
///
/// Participants, teacher, subject, times, recurrence rule, planned duration
/// and `created_by` come from the template. `custom_days` is rewritten to
/// the canonical names of the days the template recognises. Statuses start
/// over, override markers and timing telemetry are cleared, and the lesson
/// log is empty.
#[must_use]
pub fn draft_next(template: &ClassOccurrence, next_date: NaiveDate) -> NewClassOccurrence {
    NewClassOccurrence {
        id: Uuid::now_v7(),
        series_id: Some(template.series_key()),
        student_ids: template.student_ids.clone(),
        student_names: template.student_names.clone(),
        participant_key: template.participant_key.clone(),
        teacher_id: template.teacher_id,
        teacher_name: template.teacher_name.clone(),
        subject_id: template.subject_id,
        subject_name: template.subject_name.clone(),
        subject_type: template.subject_type.clone(),
        day: weekday_name(next_date.weekday()).to_string(),
        occurrence_date: next_date,
        start_time: template.start_time,
        end_time: template.end_time,
        schedule_status: ScheduleStatus::Scheduled,
        session_status: SessionStatus::INITIAL,
        is_recurring: true,
        recurrence_pattern: template.recurrence_pattern,
        custom_days: template
            .custom_weekdays()
            .into_iter()
            .map(|day| weekday_name(day).to_string())
            .collect(),
        recurrence_end_date: template.recurrence_end_date,
        is_temporary_change: false,
        reschedule_type: None,
        is_teacher_temporary_change: false,
        teacher_change_type: None,
        teacher_available_at: None,
        class_started_at: None,
        class_ended_at: None,
        start_delay_minutes: 0,
        early_end_minutes: 0,
        scheduled_duration_minutes: template.scheduled_duration_minutes,
        actual_duration_minutes: None,
        lessons: serde_json::Value::Array(Vec::new()),
        created_by: template.created_by,
        updated_by: None,
    }
}
