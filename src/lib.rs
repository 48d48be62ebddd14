pub mod auth;
pub mod bookings;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod search;
pub mod state;

pub use db::create_pool;
