use crate::{db::OrmConn, services::order_service::OrderWorkflow};

/// Shared state of the order service.
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderWorkflow,
}

/// Shared state of the user directory.
#[derive(Clone)]
pub struct DirectoryState {
    pub orm: OrmConn,
}
