//! On-device storage for cinefind.
//!
//! Uses `rusqlite` (bundled `SQLite`) as a small key-value store and keeps
//! the favorites list as a single JSON blob on top of it.

mod connection;
mod dirs;
/// Favorites list persisted under a single key.
pub mod favorites;
/// String key-value operations.
pub mod kv;
mod migrations;

#[allow(clippy::module_name_repetitions)]
pub use connection::{DB_FILE, open_db, open_db_file};
pub use dirs::AppDir;
pub use favorites::{FAVORITES_KEY, FavoriteMovie, FavoritesStore};
pub use kv::{get_item, remove_item, set_item};
