//! HTTP route handlers.

pub mod content;
pub mod health;
pub mod robots;
pub mod sitemap;
