use crate::infrastructure::process::{ProcessKind, ProcessSupervisor, SpawnError};
use std::sync::Arc;
use std::time::Duration;

/// Remote playlists are capped to their first entries, matching the
/// controller's expectations for scene-triggered playback.
const PLAYLIST_ITEM_LIMIT: &str = "1-20";

/// A playable stream reference resolved from a search query or URL.
#[derive(Debug, Clone)]
pub struct ResolvedStream {
    pub title: String,
    pub url: String,
}

/// Resolves free-text search queries and page URLs to playable stream
/// URLs via the external fetcher (yt-dlp). The fetcher runs supervised
/// with a timeout; its output format is line pairs, title then URL.
pub struct StreamResolver {
    supervisor: Arc<ProcessSupervisor>,
    bin: String,
    timeout: Duration,
}

impl StreamResolver {
    pub fn new(supervisor: Arc<ProcessSupervisor>, bin: String, timeout: Duration) -> Self {
        Self {
            supervisor,
            bin,
            timeout,
        }
    }

    /// Resolve the first search result for a query. `Ok(None)` means
    /// the search produced no playable result.
    pub async fn resolve_search(
        &self,
        query: &str,
    ) -> Result<Option<ResolvedStream>, SpawnError> {
        self.resolve_single(query, format!("ytsearch1:{query}"))
            .await
    }

    /// Resolve a single video/page URL to its stream.
    pub async fn resolve_url(&self, url: &str) -> Result<Option<ResolvedStream>, SpawnError> {
        self.resolve_single(url, url.to_string()).await
    }

    async fn resolve_single(
        &self,
        subject: &str,
        target: String,
    ) -> Result<Option<ResolvedStream>, SpawnError> {
        let args = vec!["--get-title".to_string(), "--get-url".to_string(), target];

        let output = self
            .supervisor
            .run(ProcessKind::Fetcher, &self.bin, &args, self.timeout)
            .await?;

        if !output.status.success() {
            tracing::warn!(subject, "stream resolution failed");
            return Ok(None);
        }

        let streams = parse_pairs(&output.stdout);
        match streams.into_iter().next() {
            Some(stream) => {
                tracing::info!(subject, title = %stream.title, "stream resolved");
                Ok(Some(stream))
            }
            None => {
                tracing::warn!(subject, "stream resolution returned no results");
                Ok(None)
            }
        }
    }

    /// Resolve a remote playlist URL to its streams, in playlist order
    /// (or fetcher-shuffled order when `shuffle` is set). An empty
    /// vector means the playlist produced nothing playable.
    pub async fn resolve_playlist(
        &self,
        url: &str,
        shuffle: bool,
    ) -> Result<Vec<ResolvedStream>, SpawnError> {
        let mut args = vec![
            "--get-title".to_string(),
            "--get-url".to_string(),
            "--playlist-items".to_string(),
            PLAYLIST_ITEM_LIMIT.to_string(),
        ];
        if shuffle {
            args.push("--playlist-random".to_string());
        }
        args.push(url.to_string());

        let output = self
            .supervisor
            .run(ProcessKind::Fetcher, &self.bin, &args, self.timeout)
            .await?;

        if !output.status.success() {
            tracing::warn!(url, "playlist resolution failed");
            return Ok(Vec::new());
        }

        let streams = parse_pairs(&output.stdout);
        tracing::info!(url, entries = streams.len(), "playlist resolved");
        Ok(streams)
    }
}

/// Parse the fetcher's alternating title/URL lines. A trailing title
/// without a URL is dropped.
fn parse_pairs(stdout: &[u8]) -> Vec<ResolvedStream> {
    let text = String::from_utf8_lossy(stdout);
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let mut streams = Vec::new();
    while let (Some(title), Some(url)) = (lines.next(), lines.next()) {
        streams.push(ResolvedStream {
            title: title.to_string(),
            url: url.to_string(),
        });
    }
    streams
}
