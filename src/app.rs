use crate::domain::TaskModel;
use crate::persistence::{
    atomic_write, decode_tasks, encode_tasks, read_file, tasks_file, Decoded, StoreError,
};
use std::path::{Path, PathBuf};

/// Callback told about the new active user after a switch completes
pub type UserObserver = Box<dyn FnMut(&str)>;

/// Binds the task model to the JSON file of the active user.
///
/// Every verb here swallows I/O failures after logging them: a missing or
/// broken file leaves the in-memory list as it was. The `try_*` variants
/// return the error for callers that want it.
pub struct AppController {
    model: TaskModel,
    data_dir: PathBuf,
    storage_path: PathBuf,
    current_user: String,
    user_observers: Vec<UserObserver>,
}

impl AppController {
    /// Controller with no active user, storing into `<data_dir>/tasks.json`.
    /// Nothing is loaded until a user is set or `load` is called.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let storage_path = tasks_file(&data_dir, "");
        Self {
            model: TaskModel::new(),
            data_dir,
            storage_path,
            current_user: String::new(),
            user_observers: Vec::new(),
        }
    }

    pub fn model(&self) -> &TaskModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut TaskModel {
        &mut self.model
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    pub fn current_user(&self) -> &str {
        &self.current_user
    }

    /// Register an observer for user switches
    pub fn subscribe_user_changed<F>(&mut self, observer: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.user_observers.push(Box::new(observer));
    }

    /// Switch the active user.
    ///
    /// The outgoing user's list is saved first, then the incoming user's file
    /// is loaded (or the list cleared when switching to no user). Observers
    /// are told once the new list is in place.
    pub fn set_current_user(&mut self, username: &str) {
        if self.current_user == username {
            return;
        }

        if !self.current_user.is_empty() {
            self.save();
        }

        tracing::debug!(
            target: "tasks",
            from = %self.current_user,
            to = username,
            "switching user"
        );
        self.current_user = username.to_string();
        self.storage_path = tasks_file(&self.data_dir, &self.current_user);

        if self.current_user.is_empty() {
            self.clear_tasks();
        } else {
            self.load();
        }

        for observer in &mut self.user_observers {
            observer(username);
        }
    }

    /// Load the storage file into the model, replacing its contents.
    /// Returns false when nothing was loaded.
    pub fn load(&mut self) -> bool {
        match self.try_load() {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(target: "tasks", "Skipping load: {}", e);
                false
            }
        }
    }

    /// Load the storage file. `Ok(false)` when the file doesn't exist.
    pub fn try_load(&mut self) -> Result<bool, StoreError> {
        let Some(content) = read_file(&self.storage_path)? else {
            tracing::debug!(target: "tasks", path = %self.storage_path.display(), "no task file yet");
            return Ok(false);
        };

        match decode_tasks(&content) {
            Decoded::Tasks(tasks) => {
                tracing::debug!(
                    target: "tasks",
                    path = %self.storage_path.display(),
                    count = tasks.len(),
                    "loaded tasks"
                );
                self.model.set_items(tasks);
                Ok(true)
            }
            Decoded::Malformed => Err(StoreError::Malformed {
                path: self.storage_path.clone(),
            }),
        }
    }

    /// Write the model to the storage file; failures are logged and ignored
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            tracing::warn!(target: "tasks", "Failed to save tasks: {}", e);
        }
    }

    pub fn try_save(&self) -> Result<(), StoreError> {
        self.write_to(&self.storage_path)
    }

    /// Write the current list to a caller-chosen file
    pub fn export_tasks(&self, path: impl AsRef<Path>) {
        if let Err(e) = self.try_export(path) {
            tracing::warn!(target: "tasks", "Failed to export tasks: {}", e);
        }
    }

    pub fn try_export(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        self.write_to(path.as_ref())
    }

    fn write_to(&self, path: &Path) -> Result<(), StoreError> {
        let json = encode_tasks(self.model.items())?;
        atomic_write(path, &json)?;
        tracing::debug!(
            target: "tasks",
            path = %path.display(),
            count = self.model.len(),
            "saved tasks"
        );
        Ok(())
    }

    /// Empty the list
    pub fn clear_tasks(&mut self) {
        self.model.set_items(Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{parse_timestamp, ModelEvent, Task};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::{tempdir, TempDir};

    fn create_test_controller() -> (TempDir, AppController) {
        let temp_dir = tempdir().unwrap();
        let controller = AppController::new(temp_dir.path());
        (temp_dir, controller)
    }

    fn titles(controller: &AppController) -> Vec<String> {
        controller
            .model()
            .items()
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }

    #[test]
    fn test_new_controller_has_no_user() {
        let (temp_dir, controller) = create_test_controller();
        assert_eq!(controller.current_user(), "");
        assert_eq!(controller.storage_path(), temp_dir.path().join("tasks.json"));
        assert!(controller.model().is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (temp_dir, mut controller) = create_test_controller();
        {
            let model = controller.model_mut();
            model.add_task("");
            model.add_scheduled_task("Squats", 7, "Workout");
            model.update_workout_details(1, 12, 40.0, 4);
            model.add_timetable_task(
                "Standup",
                2,
                9,
                "meeting",
                "daily",
                parse_timestamp("2024-01-02T09:00:00"),
            );
            model.toggle_task(2);
        }
        let before = controller.model().items().to_vec();

        controller.save();

        let mut reloaded = AppController::new(temp_dir.path());
        assert!(reloaded.load());
        assert_eq!(reloaded.model().items(), before.as_slice());
    }

    #[test]
    fn test_load_missing_file_leaves_model_untouched() {
        let (_temp_dir, mut controller) = create_test_controller();
        controller.model_mut().add_task("keep me");

        assert!(!controller.load());
        assert_eq!(titles(&controller), vec!["keep me"]);
    }

    #[test]
    fn test_load_malformed_file_leaves_model_untouched() {
        let (temp_dir, mut controller) = create_test_controller();
        controller.model_mut().add_task("keep me");
        fs::write(temp_dir.path().join("tasks.json"), "{ not json").unwrap();

        assert!(!controller.load());
        assert_eq!(titles(&controller), vec!["keep me"]);
        assert!(matches!(
            controller.try_load(),
            Err(StoreError::Malformed { .. })
        ));

        fs::write(temp_dir.path().join("tasks.json"), "[]").unwrap();
        assert!(!controller.load());
        assert_eq!(titles(&controller), vec!["keep me"]);
    }

    #[test]
    fn test_load_unreadable_path_leaves_model_untouched() {
        let (temp_dir, mut controller) = create_test_controller();
        controller.model_mut().add_task("keep me");
        // A directory where the file should be cannot be read as text
        fs::create_dir(temp_dir.path().join("tasks.json")).unwrap();

        assert!(!controller.load());
        assert_eq!(titles(&controller), vec!["keep me"]);
    }

    #[test]
    fn test_load_emits_reset() {
        let (temp_dir, mut controller) = create_test_controller();
        fs::write(
            temp_dir.path().join("tasks.json"),
            r#"{"tasks": [{"title": "from disk"}]}"#,
        )
        .unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        controller
            .model_mut()
            .subscribe(move |e| sink.borrow_mut().push(e.clone()));

        controller.load();

        assert_eq!(titles(&controller), vec!["from disk"]);
        assert_eq!(
            *events.borrow(),
            vec![ModelEvent::Reset, ModelEvent::CompletedTasksChanged]
        );
    }

    #[test]
    fn test_save_into_unwritable_location_is_silent() {
        let temp_dir = tempdir().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let mut controller = AppController::new(&blocker);
        controller.model_mut().add_task("A");

        controller.save();
        assert!(controller.try_save().is_err());
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "file, not a directory");
    }

    #[test]
    fn test_failed_save_keeps_previous_file() {
        let (temp_dir, mut controller) = create_test_controller();
        controller.model_mut().add_task("good");
        controller.save();
        let path = temp_dir.path().join("tasks.json");
        let good = fs::read_to_string(&path).unwrap();

        let export_target = temp_dir.path().join("tasks.json").join("nested.json");
        assert!(controller.try_export(&export_target).is_err());

        assert_eq!(fs::read_to_string(&path).unwrap(), good);
    }

    #[test]
    fn test_user_storage_paths() {
        let (temp_dir, mut controller) = create_test_controller();

        controller.set_current_user("a b/c");
        assert_eq!(
            controller.storage_path(),
            temp_dir.path().join("tasks_a_b_c.json")
        );

        controller.set_current_user("");
        assert_eq!(controller.storage_path(), temp_dir.path().join("tasks.json"));
    }

    #[test]
    fn test_switching_users_restores_lists() {
        let (_temp_dir, mut controller) = create_test_controller();

        controller.set_current_user("A");
        controller.model_mut().add_task("a1");
        controller.model_mut().add_task("a2");
        controller.model_mut().toggle_task(1);
        let a_before = controller.model().items().to_vec();

        controller.set_current_user("B");
        // B has no file yet, so A's rows are still showing
        assert_eq!(controller.model().items(), a_before.as_slice());
        controller.clear_tasks();
        controller.model_mut().add_task("b1");

        controller.set_current_user("A");
        assert_eq!(controller.model().items(), a_before.as_slice());

        controller.set_current_user("B");
        assert_eq!(titles(&controller), vec!["b1"]);
    }

    #[test]
    fn test_switch_to_user_without_file_keeps_list() {
        // Loading is an overlay: a user with no file yet sees whatever was there
        let (_temp_dir, mut controller) = create_test_controller();
        controller.model_mut().add_task("unsaved");

        controller.set_current_user("fresh");

        assert_eq!(titles(&controller), vec!["unsaved"]);
    }

    #[test]
    fn test_switch_to_no_user_clears() {
        let (temp_dir, mut controller) = create_test_controller();
        controller.set_current_user("A");
        controller.model_mut().add_task("a1");

        controller.set_current_user("");

        assert!(controller.model().is_empty());
        assert!(temp_dir.path().join("tasks_A.json").exists());
    }

    #[test]
    fn test_same_user_is_noop() {
        let (temp_dir, mut controller) = create_test_controller();
        controller.set_current_user("A");
        controller.model_mut().add_task("unsaved");

        let notified = Rc::new(RefCell::new(Vec::<String>::new()));
        let sink = Rc::clone(&notified);
        controller.subscribe_user_changed(move |name| sink.borrow_mut().push(name.to_string()));

        controller.set_current_user("A");

        assert_eq!(titles(&controller), vec!["unsaved"]);
        assert!(!temp_dir.path().join("tasks_A.json").exists());
        assert!(notified.borrow().is_empty());
    }

    #[test]
    fn test_user_changed_fires_after_load() {
        let (temp_dir, mut controller) = create_test_controller();
        fs::write(
            temp_dir.path().join("tasks_bob.json"),
            r#"{"tasks": [{"title": "bob's"}]}"#,
        )
        .unwrap();

        let seen = Rc::new(RefCell::new(Vec::<String>::new()));
        let sink = Rc::clone(&seen);
        controller.subscribe_user_changed(move |name| sink.borrow_mut().push(name.to_string()));

        controller.set_current_user("bob");
        controller.set_current_user("");

        assert_eq!(*seen.borrow(), vec!["bob".to_string(), String::new()]);
        assert!(controller.model().is_empty());
    }

    #[test]
    fn test_user_changed_follows_model_reset() {
        let (temp_dir, mut controller) = create_test_controller();
        fs::write(
            temp_dir.path().join("tasks_bob.json"),
            r#"{"tasks": [{"title": "bob's", "done": true}]}"#,
        )
        .unwrap();

        let log = Rc::new(RefCell::new(Vec::<String>::new()));
        let model_sink = Rc::clone(&log);
        controller
            .model_mut()
            .subscribe(move |event| model_sink.borrow_mut().push(format!("{:?}", event)));
        let user_sink = Rc::clone(&log);
        controller.subscribe_user_changed(move |name| user_sink.borrow_mut().push(format!("user:{}", name)));

        controller.set_current_user("bob");
        assert_eq!(
            *log.borrow(),
            vec!["Reset", "CompletedTasksChanged", "user:bob"]
        );
        assert_eq!(titles(&controller), vec!["bob's"]);
        assert!(controller.model().has_completed_tasks());

        log.borrow_mut().clear();
        controller.set_current_user("");
        assert_eq!(
            *log.borrow(),
            vec!["Reset", "CompletedTasksChanged", "user:"]
        );
        assert!(controller.model().is_empty());
    }

    #[test]
    fn test_export_writes_to_chosen_path() {
        let (temp_dir, mut controller) = create_test_controller();
        controller.model_mut().add_task("exported");
        let target = temp_dir.path().join("backup").join("export.json");

        controller.export_tasks(&target);

        assert!(target.exists());
        assert!(!controller.storage_path().exists());
        let content = fs::read_to_string(&target).unwrap();
        match decode_tasks(&content) {
            Decoded::Tasks(tasks) => assert_eq!(tasks, vec![Task::new("exported")]),
            Decoded::Malformed => panic!("export produced malformed JSON"),
        }
    }

    #[test]
    fn test_clear_tasks() {
        let (_temp_dir, mut controller) = create_test_controller();
        controller.model_mut().add_task("A");
        controller.model_mut().add_task("B");

        controller.clear_tasks();

        assert!(controller.model().is_empty());
    }
}
