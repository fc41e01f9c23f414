//! Adapters for the client-side ports of `bytegurukul_core`: the REST API over HTTP
//! and a JSON file standing in for browser local storage.

pub mod file_storage;
pub mod http;

pub use file_storage::FileStorage;
pub use http::HttpAuthApi;
