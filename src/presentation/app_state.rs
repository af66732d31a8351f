// Application state for HTTP handlers
use crate::infrastructure::memory_map::SharedPanel;

#[derive(Clone)]
pub struct AppState {
    pub panel: SharedPanel,
}
