//! API module - HTTP routes, handlers, and models

pub mod docs;
pub mod handlers;
pub mod models;
pub mod proxy;
pub mod routes;
