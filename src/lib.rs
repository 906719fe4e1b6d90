//! Per-user task list: an observable, position-addressed task model bound to
//! a JSON file chosen by the active user.

pub mod app;
pub mod domain;
pub mod persistence;

pub use app::AppController;
pub use domain::{ModelEvent, Schema, Task, TaskField, TaskModel};
pub use persistence::{SettingsStore, StoreError};
