/// Task field named in a field-level change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Done,
    Day,
    Hour,
    Category,
    Notes,
    DateTime,
    Reps,
    Weight,
    Sets,
}

/// Change notification sent from the task model to its observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    /// The whole collection was replaced; observers should re-read everything
    Reset,
    /// A row was appended at `row`
    RowInserted { row: usize },
    /// The row at `row` was removed; later rows moved up by one
    RowRemoved { row: usize },
    /// The listed fields of the row at `row` changed in place
    DataChanged { row: usize, fields: Vec<TaskField> },
    /// "Has completed tasks" may have flipped
    CompletedTasksChanged,
}

impl ModelEvent {
    /// Whether the event changes the shape of the list
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Reset | Self::RowInserted { .. } | Self::RowRemoved { .. }
        )
    }
}

/// Callback registered with the task model
pub type ModelObserver = Box<dyn FnMut(&ModelEvent)>;
