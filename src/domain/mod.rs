pub mod events;
pub mod model;
pub mod task;
pub mod views;

pub use events::{ModelEvent, ModelObserver, TaskField};
pub use model::TaskModel;
pub use task::{in_week, parse_timestamp, slot_time, week_start, Schema, Task};
pub use views::format_row;
