use order_workflow::{
    config::DatabaseConfig,
    db::{ORDER_MIGRATOR, USER_MIGRATOR, create_pool, run_migrations},
};

/// `migrate orders` or `migrate users`; defaults to the order database.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let target = std::env::args().nth(1).unwrap_or_else(|| "orders".into());

    let (migrator, default_db) = match target.as_str() {
        "orders" => (&ORDER_MIGRATOR, "orderdb"),
        "users" => (&USER_MIGRATOR, "userdb"),
        other => anyhow::bail!("unknown migration target `{other}`, expected `orders` or `users`"),
    };

    let config = DatabaseConfig::from_env(default_db)?;
    let pool = create_pool(&config.url()).await?;
    run_migrations(&pool, migrator).await?;
    pool.close().await;

    println!("Migrations applied ({target})");
    Ok(())
}
