//! # Stashex Server
//!
//! Stash-backed custom metadata provider for Plex Media Server.
//!
//! ## Overview
//!
//! The server answers Plex metadata-agent lookups from a Stash GraphQL
//! backend:
//!
//! - **Matching**: filename and rating-key lookups translated into
//!   Plex `MediaContainer` documents, cached per query filter
//! - **Artwork**: screenshot/performer/group image proxying and 2:3
//!   letterboxed poster rendering, so Plex never needs to reach the
//!   Stash host directly
//! - **Poster upload**: detached background push of rendered posters
//!   into the PMS once it has ingested the matched item
//!
//! ## Architecture
//!
//! The server is built on Axum; the pipeline lives in `stashex-core`
//! and is injected through [`AppState`].

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::config::{Config, ConfigLoader};
