use serde::Serialize;
use serde_json::Value;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::debug;

use super::dto::{GoalsRequest, MoodInput, NewLogRequest};
use super::repo_types::WellnessLog;

/// Faces of the old five-step mood slider, lowest first.
pub const MOOD_EMOJIS: [&str; 5] = ["😔", "😐", "🙂", "😊", "🤗"];

/// A daily log that passed range checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidLog {
    pub mood: i16,
    pub sleep_hours: f64,
    pub water_glasses: i32,
    pub exercise_minutes: i32,
    pub logged_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidGoals {
    pub sleep_goal: f64,
    pub water_goal: i32,
    pub exercise_goal: i32,
    pub set_at: OffsetDateTime,
}

pub fn mood_level(mood: &MoodInput) -> Result<i16, String> {
    let level = match mood {
        MoodInput::Level(n) => *n,
        MoodInput::Emoji(s) => match MOOD_EMOJIS.iter().position(|e| *e == s.trim()) {
            Some(i) => i as i64 + 1,
            None => return Err(format!("Unknown mood {s:?}")),
        },
    };
    if !(1..=5).contains(&level) {
        return Err("Mood must be between 1 and 5".into());
    }
    Ok(level as i16)
}

fn in_range_f64(name: &str, v: f64, min: f64, max: f64) -> Result<f64, String> {
    if v.is_finite() && v >= min && v <= max {
        Ok(v)
    } else {
        Err(format!("{name} must be between {min} and {max}"))
    }
}

fn in_range_i64(name: &str, v: i64, min: i64, max: i64) -> Result<i32, String> {
    if (min..=max).contains(&v) {
        Ok(v as i32)
    } else {
        Err(format!("{name} must be between {min} and {max}"))
    }
}

pub fn validate_log(req: &NewLogRequest) -> Result<ValidLog, String> {
    Ok(ValidLog {
        mood: mood_level(&req.mood)?,
        sleep_hours: in_range_f64("Sleep hours", req.sleep_hours, 0.0, 24.0)?,
        water_glasses: in_range_i64("Water glasses", req.water_glasses, 0, 20)?,
        exercise_minutes: in_range_i64("Exercise minutes", req.exercise_minutes, 0, 300)?,
        logged_at: req.logged_at.unwrap_or_else(OffsetDateTime::now_utc),
    })
}

pub fn validate_goals(req: &GoalsRequest) -> Result<ValidGoals, String> {
    Ok(ValidGoals {
        sleep_goal: in_range_f64("Sleep goal", req.sleep_goal, 1.0, 12.0)?,
        water_goal: in_range_i64("Water goal", req.water_goal, 1, 20)?,
        exercise_goal: in_range_i64("Exercise goal", req.exercise_goal, 1, 300)?,
        set_at: OffsetDateTime::now_utc(),
    })
}

/// Means over every daily log, or an explicit no-data marker.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WellnessSummary {
    NoData,
    Averages {
        entries: usize,
        avg_sleep_hours: f64,
        avg_exercise_minutes: f64,
        avg_water_glasses: f64,
    },
}

pub fn summarize(logs: &[WellnessLog]) -> WellnessSummary {
    if logs.is_empty() {
        return WellnessSummary::NoData;
    }
    let n = logs.len() as f64;
    let mean = |f: fn(&WellnessLog) -> f64| logs.iter().map(f).sum::<f64>() / n;
    WellnessSummary::Averages {
        entries: logs.len(),
        avg_sleep_hours: mean(|l| l.sleep_hours),
        avg_exercise_minutes: mean(|l| l.exercise_minutes as f64),
        avg_water_glasses: mean(|l| l.water_glasses as f64),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Point<T> {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub value: T,
}

/// Per-metric chart data, oldest first.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct WellnessSeries {
    pub mood: Vec<Point<i16>>,
    pub sleep_hours: Vec<Point<f64>>,
    pub exercise_minutes: Vec<Point<i32>>,
    pub water_glasses: Vec<Point<i32>>,
}

pub fn series(logs: &[WellnessLog]) -> WellnessSeries {
    let mut sorted: Vec<&WellnessLog> = logs.iter().collect();
    sorted.sort_by_key(|l| l.logged_at);

    let mut out = WellnessSeries::default();
    for l in sorted {
        let at = l.logged_at;
        out.mood.push(Point { timestamp: at, value: l.mood });
        out.sleep_hours.push(Point { timestamp: at, value: l.sleep_hours });
        out.exercise_minutes.push(Point { timestamp: at, value: l.exercise_minutes });
        out.water_glasses.push(Point { timestamp: at, value: l.water_glasses });
    }
    out
}

/// Entries of the old single-collection layout, split by kind.
#[derive(Debug, Default, PartialEq)]
pub struct LegacyImport {
    pub logs: Vec<ValidLog>,
    pub goals: Option<ValidGoals>,
    pub skipped: usize,
}

/// Reads an RFC 3339 string or an exported BSON date: `{"$date": "..."}`,
/// `{"$date": <millis>}` or `{"$date": {"$numberLong": "<millis>"}}`.
fn timestamp_field(v: &Value, key: &str) -> Option<OffsetDateTime> {
    let field = v.get(key)?;
    let field = field.get("$date").unwrap_or(field);
    match field {
        Value::String(s) => OffsetDateTime::parse(s, &Rfc3339).ok(),
        Value::Number(n) => from_millis(n.as_i64()?),
        Value::Object(o) => from_millis(o.get("$numberLong")?.as_str()?.parse().ok()?),
        _ => None,
    }
}

fn from_millis(ms: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000).ok()
}

fn int_field(v: &Value, key: &str) -> Option<i64> {
    let field = v.get(key)?;
    field
        .as_i64()
        .or_else(|| field.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

fn legacy_log(entry: &Value) -> Result<ValidLog, String> {
    let mood = match entry.get("mood") {
        Some(Value::String(s)) => MoodInput::Emoji(s.clone()),
        Some(v) => MoodInput::Level(v.as_i64().ok_or("mood is not a level")?),
        None => return Err("missing mood".into()),
    };
    let req = NewLogRequest {
        mood,
        sleep_hours: entry
            .get("sleep_hours")
            .and_then(Value::as_f64)
            .ok_or("missing sleep_hours")?,
        water_glasses: int_field(entry, "water_glasses").ok_or("missing water_glasses")?,
        exercise_minutes: int_field(entry, "exercise_minutes").ok_or("missing exercise_minutes")?,
        logged_at: timestamp_field(entry, "timestamp"),
    };
    validate_log(&req)
}

fn legacy_goals(goals: &Value) -> Result<ValidGoals, String> {
    let req = GoalsRequest {
        sleep_goal: goals
            .get("sleep_goal")
            .and_then(Value::as_f64)
            .ok_or("missing sleep_goal")?,
        water_goal: int_field(goals, "water_goal").ok_or("missing water_goal")?,
        exercise_goal: int_field(goals, "exercise_goal").ok_or("missing exercise_goal")?,
    };
    let mut valid = validate_goals(&req)?;
    if let Some(at) = timestamp_field(goals, "date_set") {
        valid.set_at = at;
    }
    Ok(valid)
}

/// Entries with `mood` are daily logs, entries with a `goals` object set the
/// goals (last one wins). Anything else, or anything out of range, is skipped.
pub fn partition_legacy(entries: &[Value]) -> LegacyImport {
    let mut out = LegacyImport::default();
    for (i, entry) in entries.iter().enumerate() {
        let parsed = if entry.get("mood").is_some() {
            legacy_log(entry).map(|l| out.logs.push(l))
        } else if let Some(goals) = entry.get("goals").filter(|g| g.is_object()) {
            legacy_goals(goals).map(|g| out.goals = Some(g))
        } else {
            Err("neither a daily log nor goals".into())
        };
        if let Err(reason) = parsed {
            debug!(index = i, reason = %reason, "legacy entry skipped");
            out.skipped += 1;
        }
    }
    out
}
