//! Detached poster upload coordinator.
//!
//! One job per metadata fetch when upload is enabled. The job locates
//! the just-created item in the PMS, waits out its ingestion lag, and
//! pushes the rendered poster. Jobs run detached from the request that
//! spawned them and always reach a terminal state.
//!
//! Idempotency is per scene id for the process lifetime: the ledger is
//! checked at job start and recorded only after a confirmed upload.
//! The check and the record are deliberately not one atomic claim, so
//! two concurrent first-time jobs for one scene can both upload; the
//! second upload overwrites the first poster with identical bytes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use stashex_model::scene_guid;
use tracing::{debug, error, info, warn};

use crate::plex::client::PmsTransport;
use crate::poster::PosterSource;

/// Delay before each ingest-wait search attempt.
const INGEST_POLL_DELAY: Duration = Duration::from_secs(5);
/// Search attempts after the immediate one, 5 s apart.
const MAX_INGEST_ATTEMPTS: u32 = 8;

/// Scene ids with a confirmed poster push during this process
/// lifetime. Insert-only; cleared by restart.
#[derive(Debug, Default)]
pub struct UploadLedger {
    entries: DashSet<i64>,
}

impl UploadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, scene_id: i64) -> bool {
        self.entries.contains(&scene_id)
    }

    pub fn record(&self, scene_id: i64) {
        self.entries.insert(scene_id);
    }
}

/// Work descriptor handed to a detached job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterUploadJob {
    pub scene_id: i64,
    pub title: String,
}

/// Terminal job outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The ledger already held the scene id; nothing was contacted.
    Skipped,
    /// Poster pushed and recorded.
    Done,
    /// Gave up at some stage; the job ends silently without retry.
    Failed,
}

/// Non-terminal coordinator states. Section keys ride along so the
/// ingest-wait retries reuse the listing fetched while locating.
enum UploadState {
    Locating,
    WaitingForIngest { sections: Vec<String>, attempt: u32 },
    Uploading { pms_key: String },
}

pub struct PosterUploader {
    pms: Arc<dyn PmsTransport>,
    posters: Arc<dyn PosterSource>,
    ledger: UploadLedger,
}

impl fmt::Debug for PosterUploader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PosterUploader").finish_non_exhaustive()
    }
}

impl PosterUploader {
    pub fn new(pms: Arc<dyn PmsTransport>, posters: Arc<dyn PosterSource>) -> Self {
        Self {
            pms,
            posters,
            ledger: UploadLedger::new(),
        }
    }

    pub fn ledger(&self) -> &UploadLedger {
        &self.ledger
    }

    /// Drive one job to a terminal state.
    pub async fn run(&self, job: PosterUploadJob) -> UploadOutcome {
        if self.ledger.contains(job.scene_id) {
            debug!("poster already uploaded for scene {}, skipping", job.scene_id);
            return UploadOutcome::Skipped;
        }

        let guid = scene_guid(job.scene_id);
        let mut state = UploadState::Locating;

        loop {
            state = match state {
                UploadState::Locating => {
                    let sections = match self.pms.movie_section_keys().await {
                        Ok(keys) if !keys.is_empty() => keys,
                        Ok(_) => {
                            error!("no movie library sections found in PMS");
                            return UploadOutcome::Failed;
                        }
                        Err(err) => {
                            error!("failed to list PMS library sections: {err}");
                            return UploadOutcome::Failed;
                        }
                    };

                    // Items already present (a refresh) are found
                    // immediately with zero wait.
                    match self.locate(&sections, &job.title, &guid).await {
                        Some(pms_key) => {
                            info!(
                                "PMS item found immediately for scene {} (refresh)",
                                job.scene_id
                            );
                            UploadState::Uploading { pms_key }
                        }
                        None => {
                            debug!(
                                "PMS item not found yet for scene {}, waiting for ingest",
                                job.scene_id
                            );
                            UploadState::WaitingForIngest {
                                sections,
                                attempt: 0,
                            }
                        }
                    }
                }

                UploadState::WaitingForIngest { sections, attempt } => {
                    tokio::time::sleep(INGEST_POLL_DELAY).await;
                    match self.locate(&sections, &job.title, &guid).await {
                        Some(pms_key) => UploadState::Uploading { pms_key },
                        None if attempt + 1 >= MAX_INGEST_ATTEMPTS => {
                            error!(
                                "PMS item not found for scene {} (guid {guid})",
                                job.scene_id
                            );
                            return UploadOutcome::Failed;
                        }
                        None => {
                            debug!(
                                "PMS item not found (attempt {}/{MAX_INGEST_ATTEMPTS}), retrying",
                                attempt + 1
                            );
                            UploadState::WaitingForIngest {
                                sections,
                                attempt: attempt + 1,
                            }
                        }
                    }
                }

                UploadState::Uploading { pms_key } => {
                    let scene = job.scene_id.to_string();
                    let Some(poster) = self.posters.render_poster(&scene).await else {
                        return UploadOutcome::Failed;
                    };

                    match self.pms.upload_poster(&pms_key, poster).await {
                        Ok(()) => {
                            self.ledger.record(job.scene_id);
                            info!(
                                "uploaded poster to PMS for scene {} (PMS key {pms_key})",
                                job.scene_id
                            );
                            return UploadOutcome::Done;
                        }
                        Err(err) => {
                            error!(
                                "failed to upload poster to PMS for scene {}: {err}",
                                job.scene_id
                            );
                            return UploadOutcome::Failed;
                        }
                    }
                }
            };
        }
    }

    /// One pass over the sections; first item matching the guid wins.
    /// A failing section is logged and skipped, not fatal.
    async fn locate(&self, sections: &[String], title: &str, guid: &str) -> Option<String> {
        for section_key in sections {
            match self.pms.search_section(section_key, title).await {
                Ok(items) => {
                    debug!(
                        "PMS section {section_key} search for '{title}': {} results",
                        items.len()
                    );
                    for item in items {
                        if item.matches_guid(guid)
                            && let Some(pms_key) = item.rating_key
                        {
                            return Some(pms_key);
                        }
                    }
                }
                Err(err) => {
                    warn!("PMS section {section_key} search failed: {err}");
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plex::client::{MockPmsTransport, PmsError, PmsGuid, PmsItem};
    use crate::poster::MockPosterSource;

    fn matching_item(scene_id: i64, pms_key: &str) -> PmsItem {
        PmsItem {
            rating_key: Some(pms_key.to_string()),
            guid: Some(scene_guid(scene_id)),
            guids: Vec::new(),
        }
    }

    fn uploader(pms: MockPmsTransport, posters: MockPosterSource) -> PosterUploader {
        PosterUploader::new(Arc::new(pms), Arc::new(posters))
    }

    fn job(scene_id: i64) -> PosterUploadJob {
        PosterUploadJob {
            scene_id,
            title: "Sample".to_string(),
        }
    }

    #[tokio::test]
    async fn ledger_hit_skips_without_any_downstream_call() {
        // Mocks with no expectations panic on any call, so Skipped here
        // proves zero PMS or render traffic.
        let coordinator = uploader(MockPmsTransport::new(), MockPosterSource::new());
        coordinator.ledger.record(42);

        assert_eq!(coordinator.run(job(42)).await, UploadOutcome::Skipped);
    }

    #[tokio::test]
    async fn existing_item_uploads_without_waiting() {
        let mut pms = MockPmsTransport::new();
        pms.expect_movie_section_keys()
            .times(1)
            .returning(|| Ok(vec!["1".to_string()]));
        pms.expect_search_section()
            .withf(|key, title| key == "1" && title == "Sample")
            .times(1)
            .returning(|_, _| Ok(vec![matching_item(42, "201")]));
        pms.expect_upload_poster()
            .withf(|key, poster| key == "201" && !poster.is_empty())
            .times(1)
            .returning(|_, _| Ok(()));

        let mut posters = MockPosterSource::new();
        posters
            .expect_render_poster()
            .withf(|scene| scene == "42")
            .times(1)
            .returning(|_| Some(vec![0xff, 0xd8]));

        let coordinator = uploader(pms, posters);
        assert_eq!(coordinator.run(job(42)).await, UploadOutcome::Done);
        assert!(coordinator.ledger.contains(42));
    }

    #[tokio::test]
    async fn nested_guid_entries_match_too() {
        let mut pms = MockPmsTransport::new();
        pms.expect_movie_section_keys()
            .times(1)
            .returning(|| Ok(vec!["1".to_string()]));
        pms.expect_search_section().times(1).returning(|_, _| {
            Ok(vec![PmsItem {
                rating_key: Some("305".to_string()),
                guid: Some("plex://movie/5d7768".to_string()),
                guids: vec![PmsGuid {
                    id: Some(scene_guid(42)),
                }],
            }])
        });
        pms.expect_upload_poster()
            .withf(|key, _| key == "305")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut posters = MockPosterSource::new();
        posters
            .expect_render_poster()
            .times(1)
            .returning(|_| Some(vec![0xff, 0xd8]));

        let coordinator = uploader(pms, posters);
        assert_eq!(coordinator.run(job(42)).await, UploadOutcome::Done);
    }

    #[tokio::test]
    async fn no_movie_sections_fails_before_any_search() {
        let mut pms = MockPmsTransport::new();
        pms.expect_movie_section_keys()
            .times(1)
            .returning(|| Ok(Vec::new()));

        let coordinator = uploader(pms, MockPosterSource::new());
        assert_eq!(coordinator.run(job(42)).await, UploadOutcome::Failed);
        assert!(!coordinator.ledger.contains(42));
    }

    #[tokio::test(start_paused = true)]
    async fn ingest_wait_exhausts_after_eight_retries() {
        let mut pms = MockPmsTransport::new();
        pms.expect_movie_section_keys()
            .times(1)
            .returning(|| Ok(vec!["1".to_string()]));
        // One immediate search plus eight ingest-wait attempts.
        pms.expect_search_section()
            .times(9)
            .returning(|_, _| Ok(Vec::new()));

        let coordinator = uploader(pms, MockPosterSource::new());
        assert_eq!(coordinator.run(job(42)).await, UploadOutcome::Failed);
        assert!(!coordinator.ledger.contains(42));
    }

    #[tokio::test(start_paused = true)]
    async fn ingest_wait_stops_early_on_first_hit() {
        let mut pms = MockPmsTransport::new();
        pms.expect_movie_section_keys()
            .times(1)
            .returning(|| Ok(vec!["1".to_string()]));
        let mut searches = 0;
        pms.expect_search_section()
            .times(3)
            .returning(move |_, _| {
                searches += 1;
                if searches == 3 {
                    Ok(vec![matching_item(42, "201")])
                } else {
                    Ok(Vec::new())
                }
            });
        pms.expect_upload_poster()
            .times(1)
            .returning(|_, _| Ok(()));

        let mut posters = MockPosterSource::new();
        posters
            .expect_render_poster()
            .times(1)
            .returning(|_| Some(vec![0xff, 0xd8]));

        let coordinator = uploader(pms, posters);
        assert_eq!(coordinator.run(job(42)).await, UploadOutcome::Done);
    }

    #[tokio::test]
    async fn render_failure_fails_without_upload() {
        let mut pms = MockPmsTransport::new();
        pms.expect_movie_section_keys()
            .times(1)
            .returning(|| Ok(vec!["1".to_string()]));
        pms.expect_search_section()
            .times(1)
            .returning(|_, _| Ok(vec![matching_item(42, "201")]));

        let mut posters = MockPosterSource::new();
        posters.expect_render_poster().times(1).returning(|_| None);

        let coordinator = uploader(pms, posters);
        assert_eq!(coordinator.run(job(42)).await, UploadOutcome::Failed);
        assert!(!coordinator.ledger.contains(42));
    }

    #[tokio::test]
    async fn upload_failure_leaves_ledger_unrecorded() {
        let mut pms = MockPmsTransport::new();
        pms.expect_movie_section_keys()
            .times(1)
            .returning(|| Ok(vec!["1".to_string()]));
        pms.expect_search_section()
            .times(1)
            .returning(|_, _| Ok(vec![matching_item(42, "201")]));
        pms.expect_upload_poster()
            .times(1)
            .returning(|_, _| Err(PmsError::Status(reqwest::StatusCode::FORBIDDEN)));

        let mut posters = MockPosterSource::new();
        posters
            .expect_render_poster()
            .times(1)
            .returning(|_| Some(vec![0xff, 0xd8]));

        let coordinator = uploader(pms, posters);
        assert_eq!(coordinator.run(job(42)).await, UploadOutcome::Failed);
        assert!(!coordinator.ledger.contains(42));

        // A later job for the same scene starts over instead of skipping.
        // (The ledger only records confirmed pushes.)
    }

    #[tokio::test]
    async fn failing_section_is_skipped_not_fatal() {
        let mut pms = MockPmsTransport::new();
        pms.expect_movie_section_keys()
            .times(1)
            .returning(|| Ok(vec!["1".to_string(), "2".to_string()]));
        pms.expect_search_section()
            .withf(|key, _| key == "1")
            .times(1)
            .returning(|_, _| Err(PmsError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)));
        pms.expect_search_section()
            .withf(|key, _| key == "2")
            .times(1)
            .returning(|_, _| Ok(vec![matching_item(42, "207")]));
        pms.expect_upload_poster()
            .withf(|key, _| key == "207")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut posters = MockPosterSource::new();
        posters
            .expect_render_poster()
            .times(1)
            .returning(|_| Some(vec![0xff, 0xd8]));

        let coordinator = uploader(pms, posters);
        assert_eq!(coordinator.run(job(42)).await, UploadOutcome::Done);
    }
}
