//! SeaORM models. `orders` and `order_items` live in the order database,
//! `users` in the directory database.

pub mod order_items;
pub mod orders;
pub mod users;
