use std::sync::Arc;

use order_workflow::{
    clients::HttpUserDirectory,
    config::AppConfig,
    db::{ORDER_MIGRATOR, create_pool, orm_from_pool, run_migrations},
    repository::SeaOrderStore,
    routes::create_order_app,
    server::{bind, init_tracing, serve_until, shutdown_signal, with_http_layers},
    services::order_service::OrderWorkflow,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("info,order_workflow=debug,order_service=debug");

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database.url()).await?;
    run_migrations(&pool, &ORDER_MIGRATOR).await?;

    let directory = HttpUserDirectory::new(
        &config.user_service_url,
        config.user_service_connect_timeout,
    )?;
    let store = SeaOrderStore::new(orm_from_pool(&pool));
    let workflow = OrderWorkflow::new(Arc::new(store), Arc::new(directory))
        .with_policy(config.transition_policy);
    tracing::info!(policy = ?workflow.policy(), "order workflow ready");

    let app = with_http_layers(
        create_order_app().with_state(AppState { orders: workflow }),
        config.http.request_timeout,
    );

    let listener = bind(&config.http).await?;
    serve_until(listener, app, shutdown_signal(), config.http.shutdown_grace).await?;

    // The router (and with it the directory client) is gone; release the pool last.
    pool.close().await;
    tracing::info!("order service stopped");
    Ok(())
}
