pub mod app;
pub mod config;
pub mod histogram;
pub mod output;
pub mod render;
pub mod seed;
pub mod sim;
