//! Picks the occurrence a series is extended from.
//!
//! A series accumulates one-off deviations (a substitute teacher, a class
//! moved by an hour) and durable ones. The next occurrence must inherit the
//! durable ones and ignore the one-offs, so the template is chosen by walking
//! [`TEMPLATE_RULES`] in order over the recent history of the series.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use lectern_db::db::store::{OccurrenceStore, SeriesFilter};
use lectern_db::model::occurrence::ClassOccurrence;

use crate::error::ServiceResult;


/// Where a resolved template came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource {
    /// Most recent occurrence whose change was declared permanent.
    PermanentChange,
    /// Most recent occurrence without any temporary marker.
    LastClean,
    /// The first occurrence of the series, looked up by series key.
    SeriesRoot,
    /// No lineage found; the finished occurrence seeds itself.
    Itself,
}

impl TemplateSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PermanentChange => "permanent_change",
            Self::LastClean => "last_clean",
            Self::SeriesRoot => "series_root",
            Self::Itself => "itself",
        }
    }
}

/// A named predicate over series history.
#[derive(Debug, Clone, Copy)]
pub struct TemplateRule {
    pub source: TemplateSource,
    pub matches: fn(&ClassOccurrence) -> bool,
}

fn is_permanent_change(occurrence: &ClassOccurrence) -> bool {
    occurrence.has_permanent_change() && !occurrence.has_temporary_change()
}

fn is_clean(occurrence: &ClassOccurrence) -> bool {
    !occurrence.has_temporary_change()
}

/// History rules in priority order. The first rule with any match wins, and
/// within a rule the most recent match wins.
pub const TEMPLATE_RULES: &[TemplateRule] = &[
    TemplateRule {
        source: TemplateSource::PermanentChange,
        matches: is_permanent_change,
    },
    TemplateRule {
        source: TemplateSource::LastClean,
        matches: is_clean,
    },
];

/// ## Summary
/// Applies [`TEMPLATE_RULES`] to `history`.
///
/// `history` must be ordered most recent first, as
/// [`OccurrenceStore::find_in_series`] returns it.
#[must_use]
pub fn select_template(history: &[ClassOccurrence]) -> Option<(TemplateSource, &ClassOccurrence)> {
    TEMPLATE_RULES.iter().find_map(|rule| {
        history
            .iter()
            .find(|occurrence| (rule.matches)(occurrence))
            .map(|occurrence| (rule.source, occurrence))
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    pub source: TemplateSource,
    pub template: ClassOccurrence,
}

pub struct LineageResolver {
    store: Arc<dyn OccurrenceStore>,
    lookback: Days,
}

impl LineageResolver {
    #[must_use]
    pub fn new(store: Arc<dyn OccurrenceStore>, lookback: Days) -> Self {
        Self { store, lookback }
    }

    /// ## Summary
    /// Resolves the template for extending the series of `occurrence`.
    ///
    /// History is limited to the same participants and subject, dated from
    /// `as_of` minus the lookback window up to the later of `as_of` and the
    /// occurrence's own date. When no history rule matches, the series root
    /// is used, and failing that `occurrence` itself.
    ///
    /// ## Errors
    /// Returns a database error if a lookup fails.
    #[tracing::instrument(
        skip(self, occurrence),
        fields(occurrence_id = %occurrence.id, series_id = %occurrence.series_key())
    )]
    pub async fn resolve_template(
        &self,
        occurrence: &ClassOccurrence,
        as_of: NaiveDate,
    ) -> ServiceResult<ResolvedTemplate> {
        let from = as_of.checked_sub_days(self.lookback).unwrap_or(NaiveDate::MIN);
        let to = as_of.max(occurrence.occurrence_date);
        let filter = SeriesFilter::for_occurrence(occurrence, from, to);

        let history = self.store.find_in_series(&filter).await?;
        if let Some((source, template)) = select_template(&history) {
            tracing::debug!(
                source = source.as_str(),
                template_id = %template.id,
                candidates = history.len(),
                "Template resolved from series history"
            );
            return Ok(ResolvedTemplate {
                source,
                template: template.clone(),
            });
        }

        if let Some(root) = self.store.find_by_id(occurrence.series_key()).await? {
            tracing::debug!(template_id = %root.id, "No usable history, using series root");
            return Ok(ResolvedTemplate {
                source: TemplateSource::SeriesRoot,
                template: root,
            });
        }

        tracing::debug!("No lineage found, occurrence seeds itself");
        Ok(ResolvedTemplate {
            source: TemplateSource::Itself,
            template: occurrence.clone(),
        })
    }
}
