use super::task::{format_timestamp, Schema, Task};

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Checkbox glyph for the completion flag
pub fn check_box(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Short weekday name for a day index (0 = Sunday)
pub fn day_name(day: i32) -> Option<&'static str> {
    usize::try_from(day).ok().and_then(|d| DAY_NAMES.get(d).copied())
}

/// "HH:00" for a scheduled hour
pub fn hour_label(hour: i32) -> Option<String> {
    (0..24).contains(&hour).then(|| format!("{:02}:00", hour))
}

/// Workout summary like "3x5 @ 120kg" (empty when nothing was logged)
pub fn workout_summary(task: &Task) -> String {
    if task.reps == 0 && task.sets == 0 && task.weight == 0.0 {
        return String::new();
    }
    format!("{}x{} @ {}kg", task.sets, task.reps, task.weight)
}

/// One line of list output for a task, showing the fields the schema uses
pub fn format_row(schema: Schema, index: usize, task: &Task) -> String {
    let mut parts = vec![format!("{:>3} {} {}", index, check_box(task.done), task.title)];

    match schema {
        Schema::Plain => {}
        Schema::Timetable => {
            let slot = match (day_name(task.day), hour_label(task.hour)) {
                (Some(day), Some(hour)) => format!("{} {}", day, hour),
                (Some(day), None) => day.to_string(),
                (None, Some(hour)) => hour,
                (None, None) => String::new(),
            };
            parts.push(slot);
            parts.push(format!("({})", task.category));
            if let Some(ts) = &task.date_time {
                parts.push(format_timestamp(ts));
            }
        }
        Schema::Workout => {
            parts.push(hour_label(task.hour).unwrap_or_default());
            parts.push(format!("({})", task.category));
            parts.push(workout_summary(task));
        }
    }

    let line = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("  ");

    if task.notes.is_empty() || schema == Schema::Plain {
        line
    } else {
        let notes: Vec<String> = task.notes.lines().map(|l| format!("        {}", l)).collect();
        format!("{}\n{}", line, notes.join("\n"))
    }
}
