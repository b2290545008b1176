// Adapters layer: concrete implementations for external systems.

pub mod http;
pub mod storage;

pub use http::ApiClient;
pub use storage::LocalStorage;
