use super::events::{ModelEvent, ModelObserver, TaskField};
use super::task::Task;
use chrono::NaiveDateTime;

/// Ordered, observable list of tasks.
///
/// Rows are addressed by position. Indices shift down after a removal, so
/// callers must not hold on to an index across one.
#[derive(Default)]
pub struct TaskModel {
    items: Vec<Task>,
    observers: Vec<ModelObserver>,
}

impl std::fmt::Debug for TaskModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskModel")
            .field("items", &self.items)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl TaskModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer that receives every change notification
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&ModelEvent) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: ModelEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.items.get(index)
    }

    /// Snapshot of the whole list in order
    pub fn items(&self) -> &[Task] {
        &self.items
    }

    /// Append a task at the end
    pub fn add(&mut self, task: Task) {
        self.items.push(task);
        let row = self.items.len() - 1;
        self.emit(ModelEvent::RowInserted { row });
    }

    pub fn add_task(&mut self, title: impl Into<String>) {
        self.add(Task::new(title));
    }

    pub fn add_scheduled_task(&mut self, title: impl Into<String>, hour: i32, category: impl Into<String>) {
        self.add(Task::scheduled(title, hour, category));
    }

    pub fn add_timetable_task(
        &mut self,
        title: impl Into<String>,
        day: i32,
        hour: i32,
        category: impl Into<String>,
        notes: impl Into<String>,
        date_time: Option<NaiveDateTime>,
    ) {
        self.add(Task::timetable(title, day, hour, category, notes, date_time));
    }

    /// Remove the task at `index`; out-of-range indices are ignored
    pub fn remove_task(&mut self, index: usize) {
        if index >= self.items.len() {
            return;
        }
        self.items.remove(index);
        self.emit(ModelEvent::RowRemoved { row: index });
    }

    /// Flip the completion flag of the task at `index`
    pub fn toggle_task(&mut self, index: usize) {
        let Some(task) = self.items.get_mut(index) else {
            return;
        };
        task.done = !task.done;
        self.emit(ModelEvent::DataChanged {
            row: index,
            fields: vec![TaskField::Done],
        });
        self.emit(ModelEvent::CompletedTasksChanged);
    }

    pub fn update_task_notes(&mut self, index: usize, notes: impl Into<String>) {
        let Some(task) = self.items.get_mut(index) else {
            return;
        };
        task.notes = notes.into();
        self.emit(ModelEvent::DataChanged {
            row: index,
            fields: vec![TaskField::Notes],
        });
    }

    pub fn update_workout_details(&mut self, index: usize, reps: i32, weight: f64, sets: i32) {
        let Some(task) = self.items.get_mut(index) else {
            return;
        };
        task.reps = reps;
        task.weight = weight;
        task.sets = sets;
        self.emit(ModelEvent::DataChanged {
            row: index,
            fields: vec![TaskField::Reps, TaskField::Weight, TaskField::Sets],
        });
    }

    /// Remove every completed task, keeping the order of the rest
    pub fn clear_completed(&mut self) {
        // Walk backwards so removals don't shift rows we haven't visited yet
        for index in (0..self.items.len()).rev() {
            if self.items[index].done {
                self.remove_task(index);
            }
        }
        self.emit(ModelEvent::CompletedTasksChanged);
    }

    pub fn has_completed_tasks(&self) -> bool {
        self.items.iter().any(|task| task.done)
    }

    /// Replace the whole collection
    pub fn set_items(&mut self, items: Vec<Task>) {
        self.items = items;
        self.emit(ModelEvent::Reset);
        self.emit(ModelEvent::CompletedTasksChanged);
    }

    fn matching<P>(&self, week_start: Option<NaiveDateTime>, predicate: P) -> Vec<(usize, &Task)>
    where
        P: Fn(&Task) -> bool,
    {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, task)| predicate(*task))
            .filter(|(_, task)| week_start.map_or(true, |start| task.in_week(start)))
            .collect()
    }

    /// Tasks in an hour slot, paired with their row index.
    /// With `week_start`, only tasks timestamped inside that week match.
    pub fn tasks_for_hour(&self, hour: i32, week_start: Option<NaiveDateTime>) -> Vec<(usize, &Task)> {
        self.matching(week_start, |task| task.hour == hour)
    }

    /// Tasks in a day/hour timetable cell, paired with their row index.
    /// With `week_start`, only tasks timestamped inside that week match.
    pub fn tasks_for_cell(
        &self,
        day: i32,
        hour: i32,
        week_start: Option<NaiveDateTime>,
    ) -> Vec<(usize, &Task)> {
        self.matching(week_start, |task| task.day == day && task.hour == hour)
    }

    pub fn task_count(&self, day: i32, hour: i32, week_start: Option<NaiveDateTime>) -> usize {
        self.tasks_for_cell(day, hour, week_start).len()
    }
}
