//! End-to-end pipeline tests: scripted page → snapshot file → SQLite store
use catalog_sync_lib::application::{
    CatalogScraper, ItemExtractor, ReconcileError, ReconciliationWriter, ScrapeError,
};
use catalog_sync_lib::domain::{CatalogBatch, CatalogSnapshot, MovieDetails, SnapshotDate};
use catalog_sync_lib::infrastructure::config::ScraperConfig;
use catalog_sync_lib::infrastructure::database_connection::DatabaseConnection;
use catalog_sync_lib::infrastructure::parsing::PanelField;
use catalog_sync_lib::infrastructure::{CatalogRepository, SnapshotStore};
use catalog_sync_lib::test_utils::{MapPanel, ScriptedPage, sqlite_url};
use chrono::NaiveDate;
use tempfile::tempdir;

const TABLE: &str = "imdb_top_250";

fn run_date() -> SnapshotDate {
    SnapshotDate::from_naive(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
}

fn scraper(store: SnapshotStore) -> CatalogScraper {
    let config = ScraperConfig {
        settle_delay_ms: 0,
        ..ScraperConfig::default()
    };
    CatalogScraper::with_extractor(ItemExtractor::with_seed(&config, 42), store, run_date())
}

fn movie(title: &str, rating: &str) -> MovieDetails {
    MovieDetails {
        title: title.to_string(),
        rating: rating.to_string(),
        release_year: "1999".to_string(),
        genre: "Sci-Fi".to_string(),
        duration: "2:16".to_string(),
        director: "Lana Wachowski".to_string(),
        stars: "Keanu Reeves, Laurence Fishburne".to_string(),
        short_description: "A hacker learns the truth.".to_string(),
    }
}

fn snapshot_of(movies: Vec<MovieDetails>) -> CatalogSnapshot {
    let mut batch = CatalogBatch::new(run_date());
    for details in movies {
        batch.append(details);
    }
    batch.freeze()
}

#[tokio::test]
async fn scrape_skips_failing_entry_and_loads_the_rest() {
    let dir = tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("raw"));

    let mut page = ScriptedPage::with_movies(5);
    page.set_entry(1, None);
    page.set_entry(
        3,
        Some(MapPanel::complete("Movie 4", "1994").without(PanelField::Rating)),
    );

    let report = scraper(store.clone()).run(&mut page).await.unwrap();
    assert_eq!(report.found, 5);
    assert_eq!(report.extracted(), 3);
    let skipped: Vec<usize> = report.skipped.iter().map(|s| s.index).collect();
    assert_eq!(skipped, vec![1, 3]);
    assert!(page.released);
    assert!(!page.is_panel_open());

    let titles: Vec<&str> = report
        .snapshot
        .records()
        .iter()
        .map(|r| r.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Movie 1", "Movie 3", "Movie 5"]);
    let first = &report.snapshot.records()[0];
    assert_eq!(first.duration, "2:10");
    assert_eq!(first.stars, "Ann Lead, Bob Support");

    // what was written is what gets read back
    let reloaded = store.read(run_date()).unwrap();
    assert_eq!(reloaded, report.snapshot);

    let writer = ReconciliationWriter::new(sqlite_url(dir.path()), TABLE);
    let loaded = writer.run(&report.snapshot_path, run_date()).await.unwrap();
    assert_eq!((loaded.inserted, loaded.updated), (3, 0));
}

#[tokio::test]
async fn page_failure_leaves_previous_snapshot_untouched() {
    let dir = tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());

    let mut good_page = ScriptedPage::with_movies(2);
    scraper(store.clone()).run(&mut good_page).await.unwrap();
    let before = std::fs::read_to_string(store.path_for(run_date())).unwrap();

    let mut broken_page = ScriptedPage::unreachable("timed out waiting for heading");
    let result = scraper(store.clone()).run(&mut broken_page).await;

    assert!(matches!(result, Err(ScrapeError::Page(_))));
    assert!(broken_page.released);
    assert_eq!(std::fs::read_to_string(store.path_for(run_date())).unwrap(), before);
}

#[tokio::test]
async fn applying_same_batch_twice_updates_in_place() {
    let dir = tempdir().unwrap();
    let url = sqlite_url(dir.path());
    let writer = ReconciliationWriter::new(url.clone(), TABLE);

    let first = snapshot_of(vec![movie("The Matrix", "8.7"), movie("Heat", "8.3")]);
    let report = writer.apply(first).await.unwrap();
    assert_eq!((report.inserted, report.updated), (2, 0));

    // same identity inputs, changed ratings: last write wins
    let second = snapshot_of(vec![movie("The Matrix", "8.8"), movie("Heat", "8.4")]);
    let keys: Vec<_> = second.records().iter().map(|r| r.identity_key).collect();
    let report = writer.apply(second).await.unwrap();
    assert_eq!((report.inserted, report.updated), (0, 2));

    let repo = CatalogRepository::new(TABLE);
    let mut db = DatabaseConnection::connect(&url).await.unwrap();
    assert_eq!(repo.count(db.connection()).await.unwrap(), 2);
    let matrix = repo.find(db.connection(), keys[0]).await.unwrap().unwrap();
    assert_eq!(matrix.rating, "8.8");
    let heat = repo.find(db.connection(), keys[1]).await.unwrap().unwrap();
    assert_eq!(heat.rating, "8.4");
    db.close().await.unwrap();
}

#[tokio::test]
async fn unreachable_store_reports_failure_not_zero_counts() {
    let writer = ReconciliationWriter::new("mysql://root@127.0.0.1:1/movies", TABLE);
    let failure = writer
        .apply(snapshot_of(vec![movie("Heat", "8.3")]))
        .await
        .unwrap_err();
    assert!(matches!(failure.error, ReconcileError::Store(_)));
}

#[tokio::test]
async fn failed_reconciliation_commits_nothing() {
    let dir = tempdir().unwrap();
    let url = sqlite_url(dir.path());

    // rating column that rejects the second row
    let mut db = DatabaseConnection::connect(&url).await.unwrap();
    sqlx::query(
        r#"
        CREATE TABLE imdb_top_250 (
            identity_key VARCHAR(255) PRIMARY KEY,
            snapshot_date VARCHAR(8),
            title VARCHAR(255),
            rating VARCHAR(10) CHECK (length(rating) <= 3),
            release_year VARCHAR(50),
            genre VARCHAR(255),
            duration VARCHAR(10),
            director VARCHAR(255),
            stars TEXT,
            short_description TEXT
        )
        "#,
    )
    .execute(db.connection())
    .await
    .unwrap();
    db.close().await.unwrap();

    let writer = ReconciliationWriter::new(url.clone(), TABLE);
    let failure = writer
        .apply(snapshot_of(vec![movie("Heat", "8.3"), movie("Ronin", "7.2/10")]))
        .await
        .unwrap_err();
    assert_eq!((failure.inserted, failure.updated), (1, 0));

    let mut db = DatabaseConnection::connect(&url).await.unwrap();
    assert_eq!(CatalogRepository::new(TABLE).count(db.connection()).await.unwrap(), 0);
    db.close().await.unwrap();
}
