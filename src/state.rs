use std::sync::Arc;

use crate::config::Config;
use crate::journal::JournalStore;
use crate::relay::RelaySender;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub journal: Arc<JournalStore>,
    pub relay: RelaySender,
}
