use anyhow::Result;
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use sqlx::{
    migrate::Migrator,
    postgres::{PgPool, PgPoolOptions},
};

pub type DbPool = PgPool;
pub type OrmConn = DatabaseConnection;

/// Schema of the order service database (`orders`, `order_items`).
pub static ORDER_MIGRATOR: Migrator = sqlx::migrate!("./migrations/orders");

/// Schema of the user directory database (`users`).
pub static USER_MIGRATOR: Migrator = sqlx::migrate!("./migrations/users");

/// Create the sqlx pool and check that the database answers.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await?;
    tracing::info!("connected to PostgreSQL");
    Ok(pool)
}

/// Wrap an existing pool in a SeaORM connection so both share one set of
/// connections.
pub fn orm_from_pool(pool: &DbPool) -> OrmConn {
    SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone())
}

pub async fn run_migrations(pool: &DbPool, migrator: &Migrator) -> Result<()> {
    migrator.run(pool).await?;
    Ok(())
}
