/// State management module
///
/// This module handles all application state, including:
/// - Database access for star catalogs (repository.rs)
/// - Star records and the loaded catalog (star.rs)
/// - Viewer settings persisted between sessions (settings.rs)

pub mod repository;
pub mod settings;
pub mod star;
