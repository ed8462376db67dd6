//! cinefind - search OMDb and keep a local list of favorite movies.

/// Application configuration (TOML).
mod config;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{API_KEY_ENV, AppConfig};
use cinefind_api::{
    LoadMoreSkip, LoadMoreUpdate, LocalMovieApi, Movie, MovieDetail, OmdbClient, SearchSession,
    SearchUpdate, SessionSnapshot,
};
use cinefind_db::{FavoriteMovie, FavoritesStore};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search OMDb by title.
    Search(SearchArgs),
    /// Show the full record of one title.
    Details(DetailsArgs),
    /// Manage the local favorites list.
    Favorites(FavoritesCommand),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query (e.g. "alien").
    #[arg(long, required = true)]
    query: String,
    /// Number of result pages to load (10 results per page).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pages: u32,
}

/// Arguments for the `details` subcommand.
#[derive(clap::Args)]
struct DetailsArgs {
    /// IMDb ID (e.g. "tt0078748").
    #[arg(long, required = true)]
    id: String,
}

/// Arguments for the `favorites` subcommand.
#[derive(clap::Args)]
struct FavoritesCommand {
    /// Favorites subcommand to run.
    #[command(subcommand)]
    command: FavoritesSubcommands,
}

/// Available favorites subcommands.
#[derive(Subcommand)]
enum FavoritesSubcommands {
    /// List favorites in the order they were added.
    List,
    /// Add a title to favorites (looked up on OMDb).
    Add(FavoriteIdArgs),
    /// Remove a title from favorites.
    Remove(FavoriteIdArgs),
}

/// Arguments identifying a favorite.
#[derive(clap::Args)]
struct FavoriteIdArgs {
    /// IMDb ID (e.g. "tt0078748").
    #[arg(long, required = true)]
    id: String,
}

/// Loads the config file under `dir` (or the default config directory).
fn load_config(dir: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load_from(dir).context("failed to load config")
}

/// Builds an `OmdbClient` from the config and the `OMDB_API_KEY` environment variable.
///
/// # Errors
///
/// Returns an error if no API key is configured or the client fails to build.
#[instrument(skip_all)]
fn build_omdb_client(config: &AppConfig) -> Result<OmdbClient> {
    let api_key = config
        .omdb
        .resolve_api_key(std::env::var(API_KEY_ENV).ok())
        .with_context(|| {
            format!("{API_KEY_ENV} environment variable (or omdb.api_key in config.toml) is required")
        })?;

    let mut builder = OmdbClient::builder().api_key(api_key).user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(url) = config.omdb.base_url()? {
        builder = builder.base_url(url);
    }
    if let Some(timeout) = config.omdb.timeout() {
        builder = builder.timeout(timeout);
    }

    builder.build().context("failed to build OMDb client")
}

/// Converts an API `Movie` into a `FavoriteMovie` for storage.
fn to_favorite(m: &Movie) -> FavoriteMovie {
    FavoriteMovie {
        imdb_id: m.imdb_id.clone(),
        title: m.title.clone(),
        year: m.year.clone(),
        poster: m.poster.clone(),
        kind: m.kind.clone(),
    }
}

/// Detail field for display, with OMDb's `N/A` shown as `-`.
fn or_dash(value: Option<&str>) -> &str {
    MovieDetail::field(value).unwrap_or("-")
}

/// Prints accumulated search results, marking favorites with `*`.
fn print_results(snapshot: &SessionSnapshot, favorites: &HashSet<String>) {
    tracing::info!("Fav\tIMDb ID\t\tYear\tType\tTitle");
    for movie in &snapshot.movies {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}",
            if favorites.contains(&movie.imdb_id) { "*" } else { "" },
            movie.imdb_id,
            movie.year,
            movie.kind.as_deref().unwrap_or("-"),
            movie.title,
        );
    }
    tracing::info!(
        "Showing {} of {} results (page {})",
        snapshot.movies.len(),
        snapshot.total_results,
        snapshot.page,
    );
}

/// Runs the `search` subcommand.
///
/// Issues a fresh search, then loads up to `--pages - 1` further pages.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the search fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&Path>) -> Result<()> {
    let config = load_config(dir)?;
    let session = SearchSession::new(build_omdb_client(&config)?);

    match session.search(&args.query).await {
        SearchUpdate::Applied { total_results, .. } => {
            tracing::debug!(total_results, "first page loaded");
        }
        SearchUpdate::Ignored => anyhow::bail!("search query must not be blank"),
        SearchUpdate::Superseded | SearchUpdate::Canceled => {
            tracing::warn!("Search was canceled");
            return Ok(());
        }
        SearchUpdate::Failed {
            message,
            invalid_api_key,
        } => {
            if invalid_api_key {
                tracing::warn!("Check {API_KEY_ENV} or omdb.api_key in config.toml");
            }
            anyhow::bail!("search failed: {message}");
        }
    }

    for _ in 1..args.pages {
        match session.load_more().await {
            LoadMoreUpdate::Appended { added, page } => {
                tracing::debug!(added, page, "page appended");
            }
            LoadMoreUpdate::Skipped(LoadMoreSkip::Exhausted) => break,
            LoadMoreUpdate::Skipped(reason) => {
                tracing::debug!(?reason, "load more skipped");
                break;
            }
            LoadMoreUpdate::Superseded | LoadMoreUpdate::Canceled => break,
            LoadMoreUpdate::Failed { message } => {
                tracing::warn!(error = %message, "stopped loading further pages");
                break;
            }
        }
    }

    let store = FavoritesStore::open(dir).context("failed to open favorites")?;
    print_results(&session.snapshot().await, &store.favorite_ids());

    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the lookup fails.
#[instrument(skip_all)]
async fn run_details(args: &DetailsArgs, dir: Option<&Path>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_omdb_client(&config)?;

    let detail = client
        .movie_details(&args.id)
        .await
        .with_context(|| format!("failed to fetch details for {}", args.id))?;

    let store = FavoritesStore::open(dir).context("failed to open favorites")?;

    tracing::info!("IMDb ID: {}", detail.imdb_id);
    tracing::info!("Title: {} ({})", detail.title, detail.year);
    tracing::info!("Rated: {}", or_dash(detail.rated.as_deref()));
    tracing::info!("Released: {}", or_dash(detail.released.as_deref()));
    tracing::info!("Runtime: {}", or_dash(detail.runtime.as_deref()));
    tracing::info!("Genre: {}", or_dash(detail.genre.as_deref()));
    tracing::info!("Director: {}", or_dash(detail.director.as_deref()));
    tracing::info!("Writer: {}", or_dash(detail.writer.as_deref()));
    tracing::info!("Actors: {}", or_dash(detail.actors.as_deref()));
    tracing::info!("Language: {}", or_dash(detail.language.as_deref()));
    tracing::info!("Country: {}", or_dash(detail.country.as_deref()));
    tracing::info!("Awards: {}", or_dash(detail.awards.as_deref()));
    tracing::info!(
        "IMDb Rating: {} ({} votes)",
        or_dash(detail.imdb_rating.as_deref()),
        or_dash(detail.imdb_votes.as_deref()),
    );
    tracing::info!("Metascore: {}", or_dash(detail.metascore.as_deref()));
    for rating in &detail.ratings {
        tracing::info!("  {}: {}", rating.source, rating.value);
    }
    tracing::info!("Poster: {}", detail.poster_url().unwrap_or("-"));
    tracing::info!("Plot: {}", or_dash(detail.plot.as_deref()));
    tracing::info!(
        "Favorite: {}",
        if store.contains(&detail.imdb_id) { "yes" } else { "no" }
    );

    Ok(())
}

/// Runs the `favorites list` subcommand.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
#[instrument(skip_all)]
fn run_favorites_list(dir: Option<&Path>) -> Result<()> {
    let store = FavoritesStore::open(dir).context("failed to open favorites")?;
    let favorites = store.list();

    if favorites.is_empty() {
        tracing::info!("No favorites yet. Use `favorites add --id <IMDB_ID>` to add one.");
        return Ok(());
    }

    tracing::info!("IMDb ID\t\tYear\tTitle");
    for movie in &favorites {
        tracing::info!("{}\t{}\t{}", movie.imdb_id, movie.year, movie.title);
    }
    tracing::info!("Total: {} favorites", favorites.len());

    Ok(())
}

/// Runs the `favorites add` subcommand.
///
/// Looks the title up on OMDb so the stored entry carries its title, year and poster.
///
/// # Errors
///
/// Returns an error if the lookup fails or the list cannot be saved.
#[instrument(skip_all)]
async fn run_favorites_add(args: &FavoriteIdArgs, dir: Option<&Path>) -> Result<()> {
    let store = FavoritesStore::open(dir).context("failed to open favorites")?;
    if store.contains(&args.id) {
        tracing::info!("{} is already a favorite", args.id);
        return Ok(());
    }

    let config = load_config(dir)?;
    let client = build_omdb_client(&config)?;
    let detail = client
        .movie_details(&args.id)
        .await
        .with_context(|| format!("failed to fetch details for {}", args.id))?;

    let movie = detail.summary();
    store
        .add(to_favorite(&movie))
        .context("failed to save favorites")?;
    tracing::info!("Added {} ({}) to favorites", movie.title, movie.imdb_id);

    Ok(())
}

/// Runs the `favorites remove` subcommand.
///
/// # Errors
///
/// Returns an error if the list cannot be saved.
#[instrument(skip_all)]
fn run_favorites_remove(args: &FavoriteIdArgs, dir: Option<&Path>) -> Result<()> {
    let store = FavoritesStore::open(dir).context("failed to open favorites")?;
    if !store.contains(&args.id) {
        tracing::info!("{} is not a favorite", args.id);
        return Ok(());
    }

    store
        .remove(&args.id)
        .context("failed to save favorites")?;
    tracing::info!("Removed {} from favorites", args.id);

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    match cli.command {
        Commands::Search(args) => run_search(&args, cli.dir.as_deref()).await,
        Commands::Details(args) => run_details(&args, cli.dir.as_deref()).await,
        Commands::Favorites(fav) => match fav.command {
            FavoritesSubcommands::List => run_favorites_list(cli.dir.as_deref()),
            FavoritesSubcommands::Add(args) => run_favorites_add(&args, cli.dir.as_deref()).await,
            FavoritesSubcommands::Remove(args) => run_favorites_remove(&args, cli.dir.as_deref()),
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_to_favorite_keeps_fields() {
        // Arrange
        let movie = Movie {
            imdb_id: String::from("tt0078748"),
            title: String::from("Alien"),
            year: String::from("1979"),
            poster: String::from("N/A"),
            kind: Some(String::from("movie")),
        };

        // Act
        let favorite = to_favorite(&movie);

        // Assert
        assert_eq!(favorite.imdb_id, "tt0078748");
        assert_eq!(favorite.title, "Alien");
        assert_eq!(favorite.year, "1979");
        assert_eq!(favorite.poster, "N/A");
        assert_eq!(favorite.kind.as_deref(), Some("movie"));
    }

    #[test]
    fn test_build_client_uses_config_key() {
        // Arrange
        let config: AppConfig = toml::from_str(
            "[omdb]\napi_key = \"abc\"\nbase_url = \"http://127.0.0.1:9/\"\ntimeout_secs = 2\n",
        )
        .unwrap();

        // Act
        let client = build_omdb_client(&config).unwrap();

        // Assert
        assert_eq!(client.timeout(), std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_build_client_rejects_bad_url() {
        // Arrange
        let config: AppConfig =
            toml::from_str("[omdb]\napi_key = \"abc\"\nbase_url = \"::nope\"\n").unwrap();

        // Act
        let result = build_omdb_client(&config);

        // Assert
        assert!(result.is_err());
    }
}
