//! Project store adapters
//!
//! Provides [`JsonFileProjectStore`], which implements the
//! [`ProjectStore`](stagegate_application::ProjectStore) port with one JSON
//! document per project.

mod json_file;

pub use json_file::JsonFileProjectStore;
