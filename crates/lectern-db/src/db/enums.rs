//! Database enum types with Diesel serialization.
//!
//! This module provides type-safe enum wrappers for the `class_occurrence` CHECK constraints.
//! Each enum implements `ToSql` and `FromSql` for automatic conversion between Rust and `PostgreSQL`.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use lectern_core::error::CoreError;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Implements the text round-trip (`as_str`, `Display`, `FromStr`, `ToSql`, `FromSql`)
/// for a fieldless enum stored in a `TEXT` column.
macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Returns the database string representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(CoreError::ParseError(format!(
                        concat!("unrecognized ", stringify!($ty), ": {}"),
                        other
                    ))),
                }
            }
        }

        impl ToSql<Text, Pg> for $ty {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Pg> for $ty {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                match bytes.as_bytes() {
                    $(b if b == $text.as_bytes() => Ok(Self::$variant),)+
                    _ => Err("Unrecognized enum variant".into()),
                }
            }
        }
    };
}

/// Administrative state of an occurrence.
///
/// Maps to `class_occurrence.schedule_status` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

text_enum!(ScheduleStatus {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
    Rescheduled => "rescheduled",
});

impl ScheduleStatus {
    /// Returns true once no further administrative change is allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// ## Summary
    /// Transition table for administrative changes.
    ///
    /// `scheduled` and `rescheduled` may move to any other state (a rescheduled
    /// class can be put back on the books); `completed` and `cancelled` are final.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Scheduled, Self::Completed | Self::Cancelled | Self::Rescheduled)
            | (Self::Rescheduled, Self::Scheduled | Self::Completed | Self::Cancelled) => true,
            _ => false,
        }
    }
}

/// Operational (attendance-driven) state of an occurrence.
///
/// Maps to `class_occurrence.session_status` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Available,
    InProgress,
    Completed,
    Leave,
    Absent,
}

text_enum!(SessionStatus {
    Pending => "pending",
    Available => "available",
    InProgress => "in_progress",
    Completed => "completed",
    Leave => "leave",
    Absent => "absent",
});

impl SessionStatus {
    /// State every freshly materialized occurrence starts in.
    pub const INITIAL: Self = Self::Pending;

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Leave | Self::Absent)
    }

    /// ## Summary
    /// Transition table for session management.
    ///
    /// Happy path: `pending -> available -> in_progress -> completed`.
    /// `leave` and `absent` are terminal alternatives reachable from
    /// `pending` or `available`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Pending, Self::Available | Self::Leave | Self::Absent)
            | (Self::Available, Self::InProgress | Self::Leave | Self::Absent)
            | (Self::InProgress, Self::Completed) => true,
            _ => false,
        }
    }
}

/// Supported recurrence rules.
///
/// Maps to `class_occurrence.recurrence_pattern` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    /// Same weekday every week.
    Weekly,
    /// Every Monday through Friday.
    Weekdays,
    /// An explicit set of weekdays (`custom_days`).
    Custom,
}

text_enum!(RecurrencePattern {
    Weekly => "weekly",
    Weekdays => "weekdays",
    Custom => "custom",
});

/// Whether a declared deviation applies once or becomes the new baseline.
///
/// Maps to `reschedule_type` and `teacher_change_type` CHECK constraints.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Temporary,
    Permanent,
}

text_enum!(ChangeType {
    Temporary => "temporary",
    Permanent => "permanent",
});
