use std::sync::Arc;
use fareline_core::SearchService;

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
}

impl AppState {
    pub fn new(search: SearchService) -> Self {
        Self { search: Arc::new(search) }
    }
}
