//! The scan that turns finished classes into their next occurrence.
//!
//! One sweep looks at today's occurrences in start-time order. For each one
//! whose end instant has passed it asks the materializer for the next
//! occurrence, at most once per series. Sweeps hold no lock: overlapping
//! sweeps are safe because materialization is idempotent.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use lectern_core::config::ScheduleConfig;
use lectern_core::types::format_wall_clock;
use lectern_db::db::directory::NameDirectory;
use lectern_db::db::store::OccurrenceStore;

use crate::clock::Clock;
use crate::materialize::{MaterializeOutcome, OccurrenceMaterializer};

mod periodic;

pub use periodic::SweepHandle;

/// Counts reported by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Occurrences dated today.
    pub scanned: usize,
    /// Occurrences past their end time that were handed to the materializer.
    pub ended: usize,
    pub created: usize,
    /// Next occurrence was already there.
    pub duplicates: usize,
    /// Data errors and storage failures.
    pub failed: usize,
}

impl SweepSummary {
    fn record(&mut self, outcome: &MaterializeOutcome) {
        match outcome {
            MaterializeOutcome::Created(_) => self.created += 1,
            MaterializeOutcome::AlreadyExists { .. } => self.duplicates += 1,
            MaterializeOutcome::NoNextDate | MaterializeOutcome::Failed { .. } => self.failed += 1,
            MaterializeOutcome::NotRecurring => {}
        }
    }
}

pub struct ScheduleSweeper {
    store: Arc<dyn OccurrenceStore>,
    clock: Arc<dyn Clock>,
    materializer: OccurrenceMaterializer,
    settings: ScheduleConfig,
    running: AtomicBool,
}

impl ScheduleSweeper {
    #[must_use]
    pub fn new(
        store: Arc<dyn OccurrenceStore>,
        directory: Arc<dyn NameDirectory>,
        clock: Arc<dyn Clock>,
        settings: ScheduleConfig,
    ) -> Self {
        let materializer = OccurrenceMaterializer::new(
            Arc::clone(&store),
            directory,
            Arc::clone(&clock),
            settings.lineage_lookback(),
        );
        Self {
            store,
            clock,
            materializer,
            settings,
            running: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn materializer(&self) -> &OccurrenceMaterializer {
        &self.materializer
    }

    /// ## Summary
    /// Runs one sweep over today's occurrences.
    ///
    /// Occurrences are visited in `start_time` order. An occurrence is skipped
    /// while "now" is not yet past its end instant in the configured timezone,
    /// and once its series has been handed to the materializer in this sweep.
    /// Failures are counted and logged; the sweep always runs to the end.
    #[tracing::instrument(skip(self), fields(today = tracing::field::Empty))]
    pub async fn run_sweep_once(&self) -> SweepSummary {
        let today = self.clock.today();
        tracing::Span::current().record("today", tracing::field::display(today));

        let occurrences = match self.store.find_on_date(today).await {
            Ok(occurrences) => occurrences,
            Err(error) => {
                tracing::error!(%error, "Failed to load today's occurrences");
                return SweepSummary::default();
            }
        };

        let mut summary = SweepSummary {
            scanned: occurrences.len(),
            ..SweepSummary::default()
        };
        if occurrences.is_empty() {
            tracing::debug!("No occurrences today");
            return summary;
        }

        let now = self.clock.now();
        let mut processed = HashSet::new();

        for occurrence in &occurrences {
            let series_key = occurrence.series_key();
            if processed.contains(&series_key) {
                tracing::trace!(occurrence_id = %occurrence.id, %series_key, "Series already handled");
                continue;
            }

            let Some(ends_at) = self
                .clock
                .local_instant(occurrence.occurrence_date, occurrence.end_time)
            else {
                tracing::warn!(
                    occurrence_id = %occurrence.id,
                    end_time = %format_wall_clock(occurrence.end_time),
                    "End time does not exist in the configured timezone"
                );
                continue;
            };
            if now <= ends_at {
                tracing::trace!(occurrence_id = %occurrence.id, %ends_at, "Class has not ended yet");
                continue;
            }

            summary.ended += 1;
            let outcome = self.materializer.materialize(occurrence).await;
            summary.record(&outcome);
            processed.insert(series_key);
        }

        tracing::info!(
            scanned = summary.scanned,
            ended = summary.ended,
            created = summary.created,
            duplicates = summary.duplicates,
            failed = summary.failed,
            "Schedule sweep finished"
        );
        summary
    }
}
