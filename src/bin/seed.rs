use order_workflow::{
    config::DatabaseConfig,
    db::{USER_MIGRATOR, create_pool, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = DatabaseConfig::from_env("userdb")?;

    let pool = create_pool(&config.url()).await?;
    // Ensure migrations are applied.
    run_migrations(&pool, &USER_MIGRATOR).await?;

    let users = [
        ("Ada Lovelace", "ada@example.com", "+44 20 7946 0000", "12 St James's Square, London"),
        ("Grace Hopper", "grace@example.com", "+1 202 555 0143", "Arlington, VA"),
        ("Alan Turing", "alan@example.com", "+44 161 496 0000", "Wilmslow, Cheshire"),
    ];

    for (name, email, phone, address) in users {
        let id = ensure_user(&pool, name, email, phone, address).await?;
        println!("Ensured user {email} (id={id})");
    }

    pool.close().await;
    println!("Seed completed");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    phone: &str,
    address: &str,
) -> anyhow::Result<i32> {
    let (id,): (i32,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, email, phone, address)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name, updated_at = CURRENT_TIMESTAMP
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(address)
    .fetch_one(pool)
    .await?;

    Ok(id)
}
