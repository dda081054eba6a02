//! Plex Media Server access and the detached poster upload pipeline.

pub mod client;
pub mod uploader;

pub use client::{PmsClient, PmsError, PmsGuid, PmsItem, PmsTransport};
pub use uploader::{PosterUploadJob, PosterUploader, UploadLedger, UploadOutcome};
