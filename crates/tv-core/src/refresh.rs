//! Background refresh of the channel manifest.
//!
//! The network request and the cache write run on a spawned tokio task. The
//! decoded records are then posted to the catalog's inbox and only swapped in
//! when the catalog's owner drains it, so catalog state is never touched off
//! the owning task.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::catalog::parse_channels;
use crate::channel::ChannelRecord;
use crate::error::CatalogError;

/// How a refresh ended.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Fetched, cached and queued on the catalog; applied on the owner's next
    /// [`apply_pending`](crate::ChannelCatalog::apply_pending) or
    /// [`next_refresh`](crate::ChannelCatalog::next_refresh).
    Fetched { channels: usize },
    /// The new list was swapped into the catalog.
    Updated { channels: usize },
    /// Nothing changed; the catalog keeps its previous contents.
    Failed(CatalogError),
    /// Cancelled before the new list was applied.
    Aborted,
}

impl RefreshOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, RefreshOutcome::Updated { .. })
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, RefreshOutcome::Fetched { .. })
    }
}

/// Records fetched by a refresh task, waiting to be applied by the catalog owner.
#[derive(Debug)]
pub(crate) struct Payload {
    pub url: String,
    pub records: Vec<ChannelRecord>,
    /// Set by [`RefreshTask::abort`]; the catalog drops the payload if set.
    pub cancelled: Arc<AtomicBool>,
}

/// Handle to an in-flight refresh.
///
/// Awaiting it yields the [`RefreshOutcome`] without needing the catalog to be
/// drained. Dropping it detaches the task, which keeps running and its result
/// is still applied by the catalog.
#[derive(Debug)]
pub struct RefreshTask {
    handle: JoinHandle<RefreshOutcome>,
    cancelled: Arc<AtomicBool>,
}

impl RefreshTask {
    /// Cancel the refresh. A payload already queued but not yet applied is
    /// discarded by the catalog.
    pub fn abort(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for RefreshTask {
    type Output = RefreshOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let cancelled = self.cancelled.load(Ordering::Relaxed);
        Pin::new(&mut self.handle).poll(cx).map(|joined| match joined {
            Ok(_) if cancelled => RefreshOutcome::Aborted,
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => RefreshOutcome::Aborted,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        })
    }
}

/// Spawn a refresh on the current tokio runtime.
pub(crate) fn spawn(
    url: String,
    cache_path: PathBuf,
    inbox: mpsc::UnboundedSender<Payload>,
) -> RefreshTask {
    let cancelled = Arc::new(AtomicBool::new(false));
    let handle = tokio::spawn(run(url, cache_path, inbox, Arc::clone(&cancelled)));
    RefreshTask { handle, cancelled }
}

async fn run(
    url: String,
    cache_path: PathBuf,
    inbox: mpsc::UnboundedSender<Payload>,
    cancelled: Arc<AtomicBool>,
) -> RefreshOutcome {
    info!("Refreshing channels from {}", url);

    let body = match fetch(&url).await {
        Ok(body) => body,
        Err(e @ CatalogError::Status(_)) => {
            warn!("Channel refresh from {} rejected: {}", url, e);
            return RefreshOutcome::Failed(e);
        }
        Err(e) => {
            error!("Channel refresh from {} failed: {}", url, e);
            return RefreshOutcome::Failed(e);
        }
    };
    debug!("Fetched {} bytes from {}", body.len(), url);

    let body = match write_cache(cache_path, body).await {
        Ok(body) => body,
        Err(e) => {
            error!("Channel refresh: {}", e);
            return RefreshOutcome::Failed(e);
        }
    };

    let records = match parse_channels(&body) {
        Ok(records) => records,
        Err(e) => {
            error!("Channel refresh from {}: {}", url, e);
            return RefreshOutcome::Failed(e);
        }
    };

    let channels = records.len();
    let payload = Payload {
        url,
        records,
        cancelled,
    };
    if inbox.send(payload).is_err() {
        debug!("Channel catalog dropped before refresh could be applied");
        return RefreshOutcome::Aborted;
    }
    RefreshOutcome::Fetched { channels }
}

async fn fetch(url: &str) -> Result<String, CatalogError> {
    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(CatalogError::Status(response.status()));
    }
    Ok(response.text().await?)
}

/// Store the raw response body verbatim, replacing any previous copy.
///
/// Each refresh writes its own temp file in the same directory and renames it
/// over the cache, so racing refreshes leave one complete body behind.
async fn write_cache(path: PathBuf, body: String) -> Result<String, CatalogError> {
    let target = path.clone();
    let joined = tokio::task::spawn_blocking(move || -> Result<String, CatalogError> {
        let write_err = |source| CatalogError::Write {
            path: path.clone(),
            source,
        };
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir).map_err(write_err)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(body.as_bytes()).map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;
        Ok(body)
    })
    .await;

    match joined {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(_) => Err(CatalogError::Write {
            path: target,
            source: std::io::Error::new(std::io::ErrorKind::Interrupted, "cache write cancelled"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_cache_writes_leave_one_whole_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("channels.json");
        let long = format!("[{}]", vec![r#"{"name":"long","group":"L"}"#; 2000].join(","));
        let short = r#"[{"name":"short","group":"S"}]"#.to_string();

        for _ in 0..20 {
            let writes: Vec<_> = (0..8)
                .map(|i| {
                    let body = if i % 2 == 0 { long.clone() } else { short.clone() };
                    tokio::spawn(write_cache(path.clone(), body))
                })
                .collect();
            for write in writes {
                write.await.unwrap().unwrap();
            }

            let cached = std::fs::read_to_string(&path).unwrap();
            assert!(cached == long || cached == short);
            assert!(parse_channels(&cached).is_ok());
        }

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name != "channels.json")
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
    }

    #[tokio::test]
    async fn test_cache_write_creates_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("channels.json");
        let body = write_cache(path.clone(), "[]".to_string()).await.unwrap();
        assert_eq!(body, "[]");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}
