pub mod config;
pub mod due;
pub mod import;
pub mod list;
pub mod manage;
pub mod record;
pub mod show;
pub mod stats;
