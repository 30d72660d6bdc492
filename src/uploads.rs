//! Asset uploads.
//!
//! Each asset is uploaded and then registered with the backend. A fixed number of
//! these upload-then-create sequences run at once; one failing never cancels the
//! others, but a failed upload skips its own create step.

use std::path::PathBuf;

use async_trait::async_trait;
use futures::{StreamExt, stream};
use mockall::automock;
use thiserror::Error;
use tracing::{debug, warn};

/// Number of upload-then-create sequences in flight at once.
pub const UPLOAD_CONCURRENCY: usize = 3;

/// A local file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadAsset {
    pub name: String,
    pub path: PathBuf,
}

/// An asset stored by the upload service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub name: String,
    pub url: String,
}

/// The backend record created for an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRecord {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct UploadError {
    pub message: String,
}

impl UploadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of one upload-then-create sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The asset was uploaded and registered.
    Created(CreatedRecord),

    /// The upload failed, so no record was created.
    UploadFailed { name: String, error: UploadError },

    /// The upload succeeded but the backend record could not be created.
    CreateFailed {
        asset: UploadedAsset,
        error: UploadError,
    },
}

impl UploadOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

#[automock]
#[async_trait]
pub trait UploadPipeline: Send + Sync {
    /// Stores the file and returns where it lives.
    async fn upload(&self, asset: UploadAsset) -> Result<UploadedAsset, UploadError>;

    /// Registers an uploaded asset with the backend.
    async fn create(&self, asset: UploadedAsset) -> Result<CreatedRecord, UploadError>;
}

/// Runs every asset through `pipeline`, at most [`UPLOAD_CONCURRENCY`] at a time.
///
/// Outcomes are returned in the order the assets were given.
pub async fn run_uploads(
    pipeline: &dyn UploadPipeline,
    assets: Vec<UploadAsset>,
) -> Vec<UploadOutcome> {
    let mut outcomes: Vec<(usize, UploadOutcome)> = stream::iter(assets.into_iter().enumerate())
        .map(|(index, asset)| async move { (index, upload_then_create(pipeline, asset).await) })
        .buffer_unordered(UPLOAD_CONCURRENCY)
        .collect()
        .await;

    outcomes.sort_by_key(|(index, _)| *index);

    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}

async fn upload_then_create(pipeline: &dyn UploadPipeline, asset: UploadAsset) -> UploadOutcome {
    let name = asset.name.clone();

    let uploaded = match pipeline.upload(asset).await {
        Ok(uploaded) => uploaded,
        Err(error) => {
            warn!(%name, %error, "upload failed, skipping create");

            return UploadOutcome::UploadFailed { name, error };
        }
    };

    debug!(%name, url = %uploaded.url, "uploaded");

    match pipeline.create(uploaded.clone()).await {
        Ok(record) => UploadOutcome::Created(record),
        Err(error) => {
            warn!(%name, %error, "create failed after upload");

            UploadOutcome::CreateFailed {
                asset: uploaded,
                error,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn asset(name: &str) -> UploadAsset {
        UploadAsset {
            name: name.to_string(),
            path: PathBuf::from(format!("/tmp/{name}.wav")),
        }
    }

    fn uploaded(name: &str) -> UploadedAsset {
        UploadedAsset {
            name: name.to_string(),
            url: format!("https://cdn.test/{name}"),
        }
    }

    #[derive(Debug, Default)]
    struct CountingPipeline {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl UploadPipeline for CountingPipeline {
        async fn upload(&self, asset: UploadAsset) -> Result<UploadedAsset, UploadError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;

            self.peak.fetch_max(now, Ordering::SeqCst);

            for _ in 0..4 {
                tokio::task::yield_now().await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            Ok(uploaded(&asset.name))
        }

        async fn create(&self, asset: UploadedAsset) -> Result<CreatedRecord, UploadError> {
            Ok(CreatedRecord {
                id: 1,
                name: asset.name,
            })
        }
    }

    #[tokio::test]
    async fn at_most_three_sequences_run_at_once() {
        let pipeline = CountingPipeline::default();
        let assets = ["a", "b", "c", "d", "e", "f", "g"].map(asset).to_vec();

        let outcomes = run_uploads(&pipeline, assets).await;

        assert_eq!(outcomes.len(), 7);
        assert!(outcomes.iter().all(UploadOutcome::is_created));
        assert_eq!(pipeline.peak.load(Ordering::SeqCst), UPLOAD_CONCURRENCY);
    }

    #[tokio::test]
    async fn failed_upload_skips_its_create_but_not_siblings() {
        let mut pipeline = MockUploadPipeline::new();

        pipeline.expect_upload().returning(|asset| {
            if asset.name == "broken" {
                Err(UploadError::new("storage unavailable"))
            } else {
                Ok(uploaded(&asset.name))
            }
        });

        pipeline
            .expect_create()
            .times(2)
            .withf(|asset| asset.name != "broken")
            .returning(|asset| {
                Ok(CreatedRecord {
                    id: 1,
                    name: asset.name,
                })
            });

        let outcomes = run_uploads(
            &pipeline,
            vec![asset("intro"), asset("broken"), asset("outro")],
        )
        .await;

        assert!(outcomes[0].is_created());
        assert_eq!(
            outcomes[1],
            UploadOutcome::UploadFailed {
                name: "broken".to_string(),
                error: UploadError::new("storage unavailable"),
            }
        );
        assert!(outcomes[2].is_created());
    }

    #[tokio::test]
    async fn failed_create_keeps_uploaded_asset() {
        let mut pipeline = MockUploadPipeline::new();

        pipeline
            .expect_upload()
            .once()
            .returning(|asset| Ok(uploaded(&asset.name)));
        pipeline
            .expect_create()
            .once()
            .returning(|_| Err(UploadError::new("track title already used")));

        let outcomes = run_uploads(&pipeline, vec![asset("loop")]).await;

        assert_eq!(
            outcomes,
            [UploadOutcome::CreateFailed {
                asset: uploaded("loop"),
                error: UploadError::new("track title already used"),
            }]
        );
    }
}
