#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};

use crate::works::domain::{Work, WorkPayload};
use crate::works::repository::WorkRepository;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// `true` when no database is configured for this run.
pub fn skip_db() -> bool {
    std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err()
}

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    // Run migrations exactly once, with a throwaway connection
    MIGRATED
        .get_or_try_init(|| async {
            let cfg = DatabaseConfig::from_file().unwrap_or_else(|_| DatabaseConfig::from_env());
            let db = connect_with_config(&cfg).await?;
            migration::Migrator::up(&db, None).await?;
            drop(db);
            Ok::<(), anyhow::Error>(())
        })
        .await?;

    let mut cfg = DatabaseConfig::from_file().unwrap_or_else(|_| DatabaseConfig::from_env());
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.acquire_timeout = std::time::Duration::from_secs(10);
    let db = connect_with_config(&cfg).await?;
    Ok(db)
}

pub fn payload(title: &str, category: &str) -> WorkPayload {
    WorkPayload {
        title: Some(title.to_string()),
        creator: Some(Some("Elizabeth Gilbert".to_string())),
        description: Some(Some("Memoir".to_string())),
        publication_year: Some(Some(2004)),
        category: Some(category.to_string()),
    }
}

/// The three works every service test starts from.
pub struct Fixtures {
    pub poodr: Work,
    pub another_album: Work,
    pub movie: Work,
}

pub async fn seed<R: WorkRepository + ?Sized>(repo: &R) -> Fixtures {
    let poodr = repo.create(&payload("Practical Object Oriented Design in Ruby", "book").validate().unwrap()).await.unwrap();
    let another_album = repo.create(&payload("Abbey Road", "album").validate().unwrap()).await.unwrap();
    let movie = repo.create(&payload("Spirited Away", "movie").validate().unwrap()).await.unwrap();
    Fixtures { poodr, another_album, movie }
}
