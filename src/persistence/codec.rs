use crate::domain::task::{parse_timestamp, DEFAULT_CATEGORY, UNSET};
use crate::domain::Task;
use serde::Serialize;
use serde_json::{Map, Value};

/// Top-level key holding the task array
const TASKS_KEY: &str = "tasks";

#[derive(Serialize)]
struct TaskDocument<'a> {
    tasks: &'a [Task],
}

/// Serialize tasks into the `{ "tasks": [...] }` document, every field written
pub fn encode_tasks(tasks: &[Task]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&TaskDocument { tasks })
}

/// Outcome of decoding a task file
#[derive(Debug, PartialEq)]
pub enum Decoded {
    Tasks(Vec<Task>),
    /// Not JSON, or JSON whose top level isn't an object
    Malformed,
}

/// Decode a task document.
///
/// Records from any schema version are accepted: each field is extracted on
/// its own and falls back to its default when missing or of the wrong type.
/// A top-level object without a `tasks` array decodes to no tasks.
pub fn decode_tasks(content: &str) -> Decoded {
    let root: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(_) => return Decoded::Malformed,
    };
    let Value::Object(root) = root else {
        return Decoded::Malformed;
    };

    let tasks = match root.get(TASKS_KEY) {
        Some(Value::Array(records)) => records.iter().map(decode_task).collect(),
        _ => Vec::new(),
    };
    Decoded::Tasks(tasks)
}

/// Decode one record; non-object records become a default task
pub fn decode_task(record: &Value) -> Task {
    let empty = Map::new();
    let obj = record.as_object().unwrap_or(&empty);

    Task {
        title: string_field(obj, "title").unwrap_or_default(),
        done: obj.get("done").and_then(Value::as_bool).unwrap_or(false),
        day: int_field(obj, "day").unwrap_or(UNSET),
        hour: int_field(obj, "hour").unwrap_or(UNSET),
        category: string_field(obj, "category")
            .or_else(|| string_field(obj, "taskType"))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        notes: string_field(obj, "notes").unwrap_or_default(),
        date_time: obj
            .get("dateTime")
            .and_then(Value::as_str)
            .and_then(parse_timestamp),
        reps: int_field(obj, "reps").unwrap_or(0),
        weight: obj.get("weight").and_then(Value::as_f64).unwrap_or(0.0),
        sets: int_field(obj, "sets").unwrap_or(0),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Integer field; whole-valued floats such as `9.0` are accepted
fn int_field(obj: &Map<String, Value>, key: &str) -> Option<i32> {
    let value = obj.get(key)?;
    if let Some(n) = value.as_i64() {
        return i32::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}
