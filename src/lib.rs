pub mod api_client;
pub mod config;
pub mod contact_launcher;
pub mod data;
pub mod table_display;
pub mod ui;
pub mod utils;
pub mod yank_manager;
