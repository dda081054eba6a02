//! # Stashex Core
//!
//! The translation, caching, and artwork pipeline behind the Stashex
//! metadata provider:
//!
//! - **Query building**: typed scene filters rendered into Stash
//!   GraphQL queries ([`query`])
//! - **Response caching**: TTL-bounded cache keyed by filter clause
//!   ([`cache`])
//! - **Translation**: Stash scene records projected into Plex metadata
//!   documents ([`translate`])
//! - **Artwork**: image proxying and 2:3 letterboxed poster rendering
//!   ([`poster`])
//! - **PMS upload**: detached, idempotent poster push into the Plex
//!   Media Server ([`plex`])
//!
//! Everything here is transport-agnostic apart from the two HTTP
//! clients; the axum surface lives in `stashex-server`.
#![allow(missing_docs)]

pub mod cache;
pub mod lookup;
pub mod plex;
pub mod poster;
pub mod query;
pub mod stash;
pub mod translate;

pub use cache::ResponseCache;
pub use lookup::SceneLookupService;
pub use plex::{
    PmsClient, PmsError, PmsItem, PmsTransport, PosterUploadJob, PosterUploader, UploadLedger,
    UploadOutcome,
};
pub use poster::{PosterSource, StashPosterSource, compose_poster};
pub use query::SceneFilter;
pub use stash::{FetchedImage, StashClient, StashError};
pub use translate::{TranslateOptions, translate_scene, translate_scenes};
