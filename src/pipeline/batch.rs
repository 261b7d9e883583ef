//! Batch pipeline: concurrent source resolution plus per-track tasks.

use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use tracing::info;

use crate::error::Result;
use crate::models::ModelChoice;
use crate::resolver::SourceResolver;
use crate::types::{ResolvedSource, Track};

use super::collector::ResultCollector;
use super::task::{ProcessingContext, TrackTask};

/// Drives a playlist from tracks to triggerable tasks.
pub struct BatchPipeline {
    resolver: Arc<SourceResolver>,
    context: Arc<ProcessingContext>,
}

impl BatchPipeline {
    pub fn new(resolver: Arc<SourceResolver>, context: Arc<ProcessingContext>) -> Self {
        Self { resolver, context }
    }

    /// The session collector the tasks append to.
    pub fn collector(&self) -> &ResultCollector {
        &self.context.collector
    }

    /// Resolves every track concurrently.
    ///
    /// Items are yielded in completion order and tagged with the track's
    /// index in `tracks`. A provider that never answers holds back only
    /// its own track.
    pub fn resolve_each<'a>(
        &'a self,
        tracks: &'a [Track],
    ) -> impl Stream<Item = (usize, ResolvedSource)> + 'a {
        tracks
            .iter()
            .enumerate()
            .map(|(index, track)| async move { (index, self.resolver.resolve_track(track).await) })
            .collect::<FuturesUnordered<_>>()
    }

    /// Resolves all tracks and returns one task per track, in playlist order.
    pub async fn process_playlist(&self, tracks: Vec<Track>) -> Vec<Arc<TrackTask>> {
        self.process_playlist_with(tracks, |_, _| {}).await
    }

    /// Same as [`process_playlist`](Self::process_playlist), calling
    /// `on_resolved(index, source)` as each resolution completes.
    pub async fn process_playlist_with<F>(
        &self,
        tracks: Vec<Track>,
        mut on_resolved: F,
    ) -> Vec<Arc<TrackTask>>
    where
        F: FnMut(usize, &ResolvedSource),
    {
        info!(tracks = tracks.len(), "Resolving playlist sources");

        let mut slots: Vec<Option<ResolvedSource>> = vec![None; tracks.len()];
        {
            let mut resolutions = self.resolve_each(&tracks);
            while let Some((index, source)) = resolutions.next().await {
                on_resolved(index, &source);
                slots[index] = Some(source);
            }
        }

        let tasks: Vec<Arc<TrackTask>> = tracks
            .into_iter()
            .zip(slots)
            .enumerate()
            .map(|(index, (track, slot))| {
                let source = slot.unwrap_or_else(|| ResolvedSource::new(track, None));
                Arc::new(TrackTask::new(index, source, Arc::clone(&self.context)))
            })
            .collect();

        let resolved = tasks.iter().filter(|t| t.is_processable()).count();
        info!(resolved, unresolved = tasks.len() - resolved, "Playlist resolution complete");
        tasks
    }

    /// Triggers every processable task concurrently.
    ///
    /// Returns each task's index with its outcome. Tasks without a source
    /// are skipped.
    pub async fn trigger_many(
        &self,
        tasks: &[Arc<TrackTask>],
        choice: ModelChoice,
    ) -> Vec<(usize, Result<()>)> {
        let runs = tasks
            .iter()
            .filter(|task| task.is_processable())
            .map(|task| async move { (task.index(), task.trigger(choice).await) });
        join_all(runs).await
    }
}
