use order_workflow::{
    config::DirectoryConfig,
    db::{USER_MIGRATOR, create_pool, orm_from_pool, run_migrations},
    routes::create_directory_app,
    server::{bind, init_tracing, serve_until, shutdown_signal, with_http_layers},
    state::DirectoryState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("info,order_workflow=debug,user_directory=debug");

    let config = DirectoryConfig::from_env()?;
    let pool = create_pool(&config.database.url()).await?;
    run_migrations(&pool, &USER_MIGRATOR).await?;

    let state = DirectoryState {
        orm: orm_from_pool(&pool),
    };
    let app = with_http_layers(
        create_directory_app().with_state(state),
        config.http.request_timeout,
    );

    let listener = bind(&config.http).await?;
    serve_until(listener, app, shutdown_signal(), config.http.shutdown_grace).await?;

    pool.close().await;
    tracing::info!("user directory stopped");
    Ok(())
}
