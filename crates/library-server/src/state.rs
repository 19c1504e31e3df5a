use crate::service::LibraryService;
use std::sync::Arc;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<LibraryService>,
}

impl AppState {
    pub fn new(library: LibraryService) -> Self {
        Self {
            library: Arc::new(library),
        }
    }
}
