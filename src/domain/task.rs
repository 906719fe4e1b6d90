use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};

/// Category given to tasks created without one
pub const DEFAULT_CATEGORY: &str = "General";

/// Day/hour value meaning "not scheduled"
pub const UNSET: i32 = -1;

/// Output format for task timestamps (fraction only when non-zero)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A single to-do, timetable or workout entry.
///
/// One record carries the fields of every schema; a deployment decides which
/// of them it shows (see [`Schema`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    pub done: bool,
    /// Weekday index, 0 = Sunday .. 6 = Saturday
    pub day: i32,
    /// Hour-of-day slot
    pub hour: i32,
    pub category: String,
    pub notes: String,
    /// Concrete week-anchored instant (timetable schema)
    #[serde(serialize_with = "serialize_timestamp")]
    pub date_time: Option<NaiveDateTime>,
    pub reps: i32,
    pub weight: f64,
    pub sets: i32,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            title: String::new(),
            done: false,
            day: UNSET,
            hour: UNSET,
            category: DEFAULT_CATEGORY.to_string(),
            notes: String::new(),
            date_time: None,
            reps: 0,
            weight: 0.0,
            sets: 0,
        }
    }
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Task placed in an hour slot (plain and workout schemas)
    pub fn scheduled(title: impl Into<String>, hour: i32, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            hour,
            category: category.into(),
            ..Self::default()
        }
    }

    /// Task placed in a day/hour cell of a weekly timetable
    pub fn timetable(
        title: impl Into<String>,
        day: i32,
        hour: i32,
        category: impl Into<String>,
        notes: impl Into<String>,
        date_time: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            title: title.into(),
            day,
            hour,
            category: category.into(),
            notes: notes.into(),
            date_time,
            ..Self::default()
        }
    }

    /// Whether the task has no day/hour slot
    pub fn is_unscheduled(&self) -> bool {
        self.day == UNSET && self.hour == UNSET
    }

    /// Whether the task's timestamp falls inside the week starting at `week_start`.
    /// Tasks without a timestamp are never inside a week.
    pub fn in_week(&self, week_start: NaiveDateTime) -> bool {
        self.date_time
            .map(|ts| in_week(ts, week_start))
            .unwrap_or(false)
    }
}

/// Which task fields a deployment presents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    /// Title and completion only
    Plain,
    /// Day/hour cells anchored to calendar weeks
    Timetable,
    /// Hour slots with reps, weight and sets
    #[default]
    Workout,
}

impl Schema {
    /// Parse from a settings/CLI name like "timetable"
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "plain" => Some(Self::Plain),
            "timetable" => Some(Self::Timetable),
            "workout" => Some(Self::Workout),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Timetable => "timetable",
            Self::Workout => "workout",
        }
    }
}

/// Parse an ISO-8601 timestamp as written by any version of the app.
///
/// Offset-carrying values (`Z`, `+02:00`) are converted to UTC wall time.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(ts) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Format a timestamp so that [`parse_timestamp`] reads it back unchanged
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn serialize_timestamp<S: Serializer>(
    value: &Option<NaiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(ts) => serializer.serialize_str(&format_timestamp(ts)),
        None => serializer.serialize_none(),
    }
}

/// Half-open week window test: `week_start <= ts < week_start + 7 days`
pub fn in_week(ts: NaiveDateTime, week_start: NaiveDateTime) -> bool {
    ts >= week_start && ts < week_start + Duration::days(7)
}

/// Midnight of the Sunday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDateTime {
    let days_since_sunday = date.weekday().num_days_from_sunday() as i64;
    (date - Duration::days(days_since_sunday)).and_time(chrono::NaiveTime::MIN)
}

/// Instant of a day/hour cell inside the week starting at `week_start`
pub fn slot_time(week_start: NaiveDateTime, day: i32, hour: i32) -> NaiveDateTime {
    week_start + Duration::days(day.max(0) as i64) + Duration::hours(hour.max(0) as i64)
}
