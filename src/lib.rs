pub mod app;
pub mod catalog;
pub mod config;
pub mod detail;
pub mod favorites;
pub mod filter;
pub mod models;
pub mod storage;
pub mod tmdb;
pub mod views;
