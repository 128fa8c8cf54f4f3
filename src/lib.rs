//! Core library for liked-playlist-sync
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod sync;
pub mod tracks;
