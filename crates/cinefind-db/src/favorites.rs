//! Favorites list persisted as one JSON array under [`FAVORITES_KEY`].
//!
//! Every operation reads the whole list, modifies it in memory and writes
//! it back. There is no transaction across the read and the write, so a
//! store must not be shared between concurrent writers.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::connection::open_db;
use crate::kv::{get_item, set_item};

/// Key holding the favorites blob.
pub const FAVORITES_KEY: &str = "favorites";

/// A favorited movie, stored with OMDb field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::module_name_repetitions)]
pub struct FavoriteMovie {
    /// IMDb ID; unique within the list.
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    /// Title.
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year.
    #[serde(rename = "Year")]
    pub year: String,
    /// Poster URL, or `N/A`.
    #[serde(rename = "Poster")]
    pub poster: String,
    /// Result type (`movie`, `series`, `episode`).
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Favorites store backed by the key-value table.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct FavoritesStore {
    conn: Connection,
}

impl FavoritesStore {
    /// Wraps an already migrated connection.
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens the database under `dir` (or the default data directory).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(dir: Option<&Path>) -> Result<Self> {
        Ok(Self::new(open_db(dir)?))
    }

    /// Returns all favorites in insertion order.
    ///
    /// A missing, unreadable or corrupt blob reads as an empty list.
    #[must_use]
    pub fn list(&self) -> Vec<FavoriteMovie> {
        let raw = match get_item(&self.conn, FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read favorites");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "favorites blob is corrupt, treating as empty");
            Vec::new()
        })
    }

    /// Appends `movie` unless its id is already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be written.
    pub fn add(&self, movie: FavoriteMovie) -> Result<()> {
        let mut favorites = self.list();
        if favorites.iter().any(|m| m.imdb_id == movie.imdb_id) {
            tracing::debug!(imdb_id = %movie.imdb_id, "already a favorite");
            return Ok(());
        }

        tracing::debug!(imdb_id = %movie.imdb_id, "adding favorite");
        favorites.push(movie);
        self.write(&favorites)
    }

    /// Removes the movie with `imdb_id`. Absent ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be written.
    pub fn remove(&self, imdb_id: &str) -> Result<()> {
        let mut favorites = self.list();
        let before = favorites.len();
        favorites.retain(|m| m.imdb_id != imdb_id);
        if favorites.len() == before {
            tracing::debug!(imdb_id, "not a favorite");
            return Ok(());
        }

        tracing::debug!(imdb_id, "removing favorite");
        self.write(&favorites)
    }

    /// Whether `imdb_id` is a favorite.
    #[must_use]
    pub fn contains(&self, imdb_id: &str) -> bool {
        self.list().iter().any(|m| m.imdb_id == imdb_id)
    }

    /// All favorited ids, from a single read.
    #[must_use]
    pub fn favorite_ids(&self) -> HashSet<String> {
        self.list().into_iter().map(|m| m.imdb_id).collect()
    }

    fn write(&self, favorites: &[FavoriteMovie]) -> Result<()> {
        let json = serde_json::to_string(favorites).context("failed to serialize favorites")?;
        set_item(&self.conn, FAVORITES_KEY, &json).context("failed to save favorites")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;
    use crate::migrations::run_migrations;

    fn setup_store() -> FavoritesStore {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        FavoritesStore::new(conn)
    }

    fn movie(id: &str, title: &str) -> FavoriteMovie {
        FavoriteMovie {
            imdb_id: String::from(id),
            title: String::from(title),
            year: String::from("1979"),
            poster: String::from("N/A"),
            kind: Some(String::from("movie")),
        }
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        // Arrange
        let store = setup_store();

        // Act & Assert
        assert!(store.list().is_empty());
        assert!(!store.contains("tt0078748"));
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        // Arrange
        let store = setup_store();

        // Act
        store.add(movie("tt0078748", "Alien")).unwrap();
        store.add(movie("tt0090605", "Aliens")).unwrap();

        // Assert
        let favorites = store.list();
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[0].imdb_id, "tt0078748");
        assert_eq!(favorites[1].imdb_id, "tt0090605");
        assert!(store.contains("tt0090605"));
    }

    #[test]
    fn test_add_twice_yields_one_entry() {
        // Arrange
        let store = setup_store();
        store.add(movie("tt0078748", "Alien")).unwrap();

        // Act
        store.add(movie("tt0078748", "Alien (renamed)")).unwrap();

        // Assert
        let favorites = store.list();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].title, "Alien");
    }

    #[test]
    fn test_remove() {
        // Arrange
        let store = setup_store();
        store.add(movie("tt0078748", "Alien")).unwrap();
        store.add(movie("tt0090605", "Aliens")).unwrap();

        // Act
        store.remove("tt0078748").unwrap();

        // Assert
        let favorites = store.list();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].imdb_id, "tt0090605");
        assert!(!store.contains("tt0078748"));
    }

    #[test]
    fn test_remove_absent_leaves_list_unchanged() {
        // Arrange
        let store = setup_store();
        store.add(movie("tt0078748", "Alien")).unwrap();
        let before = store.list();

        // Act
        store.remove("tt9999999").unwrap();

        // Assert
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_corrupt_blob_reads_as_empty() {
        // Arrange
        let store = setup_store();
        set_item(&store.conn, FAVORITES_KEY, "{not json").unwrap();

        // Act & Assert
        assert!(store.list().is_empty());
        assert!(store.favorite_ids().is_empty());
    }

    #[test]
    fn test_add_over_corrupt_blob_replaces_it() {
        // Arrange
        let store = setup_store();
        set_item(&store.conn, FAVORITES_KEY, "[{\"oops\":1}]").unwrap();

        // Act
        store.add(movie("tt0078748", "Alien")).unwrap();

        // Assert
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_blob_uses_omdb_field_names() {
        // Arrange
        let store = setup_store();

        // Act
        store.add(movie("tt0078748", "Alien")).unwrap();

        // Assert
        let raw = get_item(&store.conn, FAVORITES_KEY).unwrap().unwrap();
        assert!(raw.contains("\"imdbID\":\"tt0078748\""));
        assert!(raw.contains("\"Title\":\"Alien\""));
        assert!(raw.starts_with('['));
    }

    #[test]
    fn test_favorite_ids() {
        // Arrange
        let store = setup_store();
        store.add(movie("tt0078748", "Alien")).unwrap();
        store.add(movie("tt0090605", "Aliens")).unwrap();

        // Act
        let ids = store.favorite_ids();

        // Assert
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("tt0078748"));
        assert!(ids.contains("tt0090605"));
    }

    #[test]
    fn test_persists_across_reopen() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        FavoritesStore::open(Some(dir.path()))
            .unwrap()
            .add(movie("tt0078748", "Alien"))
            .unwrap();

        // Act
        let reopened = FavoritesStore::open(Some(dir.path())).unwrap();

        // Assert
        assert!(reopened.contains("tt0078748"));
    }
}
