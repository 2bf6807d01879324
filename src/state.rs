use crate::config::Config;
use crate::db::DbPool;
use crate::notify::Notifier;
use crate::storage::FileStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub files: FileStore,
    pub notifier: Arc<dyn Notifier>,
}
