pub mod database;
pub mod metrics;
pub mod notifier;
pub mod storage;

pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
pub use notifier::{Notice, Notifier, Recipient};
pub use storage::{LocalStorage, Storage};
