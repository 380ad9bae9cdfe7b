pub mod admins;
pub mod auth;
pub mod cart;
pub mod messages;
pub mod orders;
pub mod products;
pub mod tags;
