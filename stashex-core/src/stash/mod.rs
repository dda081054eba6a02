//! Stash backend access: GraphQL scene queries and raw image fetches.

pub mod client;

pub use client::{FetchedImage, StashClient, StashError};
