pub mod codec;
pub mod error;
pub mod files;
pub mod settings;

pub use codec::{decode_tasks, encode_tasks, Decoded};
pub use error::StoreError;
pub use files::{
    atomic_write, default_config_dir, default_data_dir, read_file, sanitize_username, tasks_file,
    tasks_file_name,
};
pub use settings::{Settings, SettingsStore};
