//! chiaro: a learning-content core with adaptation caching.
//!
//! Stores educational text per topic and serves accessibility-oriented
//! alternate representations (simplified reading levels, visual concept
//! maps, audio narration, video explainers). Each representation is
//! generated at most once per (topic, selector) pair and persisted; later
//! requests are served from the content store.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
