use crate::polygon::Polygon;
use crate::store::Store;

/// Shared handler dependencies, built once at startup and threaded through
/// axum's state extractor. Cloning is cheap; the store and the provider
/// client share their underlying handles.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub polygon: Polygon,
}

impl AppState {
    pub fn new(store: Store, polygon: Polygon) -> Self {
        Self { store, polygon }
    }
}
