use axum::Router;

use crate::state::AppState;

pub mod admins;
pub mod auth;
pub mod cart;
pub mod doc;
pub mod health;
pub mod messages;
pub mod orders;
pub mod params;
pub mod products;
pub mod tags;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/tags", tags::router())
        .nest("/auth", auth::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/admins", admins::router())
        .nest("/users", users::router())
        .nest("/messages", messages::router())
}
