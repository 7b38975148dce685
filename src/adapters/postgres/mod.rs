//! PostgreSQL adapters.
//!
//! Schema lives in `migrations/` and is applied by [`run_migrations`] when
//! `database.run_migrations` is enabled.

mod message_reader;
mod message_repository;

pub use message_reader::PostgresMessageReader;
pub use message_repository::PostgresMessageRepository;

use sqlx::PgPool;

/// Apply embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
