//! Background removal collaborator.
//!
//! The removal algorithm itself lives outside this crate. The pipeline only
//! hands over a snapshot and accepts the result, which is expected to carry
//! an alpha channel. There is no built-in timeout: a host that gives up on a
//! request drops the future or abandons the job, and any late result is
//! discarded.

use async_trait::async_trait;

use crate::raster::Raster;

/// External service that cuts the subject out of a raster.
///
/// Futures are not required to be `Send`; the pipeline runs on a single
/// logical thread.
#[async_trait(?Send)]
pub trait BackgroundRemover {
    /// Return a copy of `source` with the background made transparent.
    async fn remove_background(&self, source: &Raster) -> anyhow::Result<Raster>;
}

/// An in-flight background removal handed out by
/// [`EditPipeline::begin_background_removal`](super::EditPipeline::begin_background_removal).
#[derive(Debug, Clone)]
pub struct BackgroundJob {
    pub(super) id: u64,
    pub(super) source: Raster,
}

impl BackgroundJob {
    /// Identifier to pass back when completing the job.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Snapshot of the raster the job operates on.
    pub fn source(&self) -> &Raster {
        &self.source
    }
}
