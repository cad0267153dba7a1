pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod goods;
pub mod handlers;
pub mod tracker;
pub mod upload;
