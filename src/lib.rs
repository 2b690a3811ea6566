// src/lib.rs

//! Content sync library
//!
//! Keeps per-environment search indexes in step with CMS webhook
//! notifications and serves feeds projected from the indexed documents.

pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod search;
pub mod server;
pub mod services;
pub mod utils;
