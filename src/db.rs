use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use std::time::Duration;

use crate::config::Config;

/// Initialize the database connection from config.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let mut opts = ConnectOptions::new(&config.database_url);

    // An in-memory SQLite database exists per connection, so the pool must
    // be pinned to a single connection or the schema vanishes between
    // checkouts.
    if config.database_url.starts_with("sqlite::memory:") {
        opts.max_connections(1).min_connections(1);
    } else {
        opts.max_connections(100).min_connections(5);
    }

    opts.connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .sqlx_logging(config.is_dev());

    SeaDatabase::connect(opts).await
}
