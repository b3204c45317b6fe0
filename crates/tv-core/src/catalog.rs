//! ChannelCatalog: the channel list, its grouped view and the selection cursor.
//!
//! Startup is synchronous: the catalog is built from the local cache
//! (`<storage_dir>/channels.json`) when present, otherwise from the bundled
//! list compiled into the binary. A decode failure there is fatal and is
//! returned to the caller.
//!
//! Refreshes run in the background (see [`crate::refresh`]). Their results
//! queue up in the catalog's inbox and are swapped in by whoever owns the
//! catalog, via [`ChannelCatalog::apply_pending`] or
//! [`ChannelCatalog::next_refresh`]. Concurrent refreshes are not
//! deduplicated: payloads apply in completion order, so the last one to
//! finish wins, and each of them overwrites the cache file.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::channel::{ChannelModel, ChannelRecord};
use crate::error::CatalogError;
use crate::group::{GroupModel, ALL_CHANNELS, FAVORITES};
use crate::refresh::{self, Payload, RefreshOutcome, RefreshTask};

/// Name of the local copy of the last successful fetch.
pub const CACHE_FILE_NAME: &str = "channels.json";

/// Channel list shipped with the application, used when no cache exists yet.
pub const BUNDLED_CHANNELS: &str = include_str!("../assets/channels.json");

/// Where the current contents of the catalog came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Cache,
    Bundled,
    Remote(String),
}

pub struct ChannelCatalog {
    storage_dir: PathBuf,
    remote_url: String,
    records: Vec<ChannelRecord>,
    list_model: Vec<Arc<ChannelModel>>,
    groups: Vec<GroupModel>,
    position: watch::Sender<usize>,
    source: CatalogSource,
    loaded_at: DateTime<Local>,
    inbox_tx: mpsc::UnboundedSender<Payload>,
    inbox_rx: mpsc::UnboundedReceiver<Payload>,
}

impl ChannelCatalog {
    pub fn init(
        storage_dir: impl Into<PathBuf>,
        default_remote_url: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        Self::init_with_bundled(storage_dir, default_remote_url, BUNDLED_CHANNELS)
    }

    /// Like [`init`](Self::init) with a caller-supplied fallback list.
    pub fn init_with_bundled(
        storage_dir: impl Into<PathBuf>,
        default_remote_url: impl Into<String>,
        bundled: &str,
    ) -> Result<Self, CatalogError> {
        let storage_dir = storage_dir.into();
        let cache_path = storage_dir.join(CACHE_FILE_NAME);

        let (text, source) = if cache_path.exists() {
            info!("Loading channels from local cache: {}", cache_path.display());
            let text =
                std::fs::read_to_string(&cache_path).map_err(|source| CatalogError::Read {
                    path: cache_path.clone(),
                    source,
                })?;
            (Cow::Owned(text), CatalogSource::Cache)
        } else {
            info!("No local channel cache, loading bundled list");
            (Cow::Borrowed(bundled), CatalogSource::Bundled)
        };

        let records = parse_channels(&text)?;
        let (position, _) = watch::channel(0);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let mut catalog = Self {
            storage_dir,
            remote_url: default_remote_url.into(),
            records: Vec::new(),
            list_model: Vec::new(),
            groups: Vec::new(),
            position,
            source: CatalogSource::Bundled,
            loaded_at: Local::now(),
            inbox_tx,
            inbox_rx,
        };
        catalog.replace(records, source);
        info!(
            "Loaded {} channels in {} groups",
            catalog.size(),
            catalog.groups.len()
        );
        Ok(catalog)
    }

    // ── refresh ──────────────────────────────────────────────────────────────

    /// Switch to `url` and start a background refresh from it.
    ///
    /// Must be called from within a tokio runtime. The returned task may be
    /// dropped; the new list is still applied on the next
    /// [`apply_pending`](Self::apply_pending) / [`next_refresh`](Self::next_refresh).
    pub fn update(&mut self, url: impl Into<String>) -> RefreshTask {
        self.remote_url = url.into();
        info!("Channel source set to {}", self.remote_url);
        self.refresh()
    }

    /// Start a background refresh from the current remote URL.
    pub fn refresh(&self) -> RefreshTask {
        refresh::spawn(
            self.remote_url.clone(),
            self.cache_path(),
            self.inbox_tx.clone(),
        )
    }

    /// Refresh from `url` and apply the result before returning.
    ///
    /// Also applies any other refresh that finished in the meantime, so the
    /// reported count is the catalog size afterwards.
    pub async fn update_and_apply(&mut self, url: impl Into<String>) -> RefreshOutcome {
        match self.update(url).await {
            RefreshOutcome::Fetched { .. } => {
                self.apply_pending();
                RefreshOutcome::Updated {
                    channels: self.size(),
                }
            }
            other => other,
        }
    }

    /// Apply every refresh result that has arrived so far without waiting.
    /// Returns how many were applied.
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(payload) = self.inbox_rx.try_recv() {
            if self.apply(payload).is_some() {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next refresh result and apply it. Returns the new channel
    /// count. Pending forever if no refresh ever succeeds.
    pub async fn next_refresh(&mut self) -> usize {
        loop {
            let Some(payload) = self.inbox_rx.recv().await else {
                // The catalog holds a sender itself, so this is unreachable.
                return std::future::pending().await;
            };
            if let Some(channels) = self.apply(payload) {
                return channels;
            }
        }
    }

    fn apply(&mut self, payload: Payload) -> Option<usize> {
        if payload.cancelled.load(Ordering::Relaxed) {
            debug!("Discarding aborted refresh from {}", payload.url);
            return None;
        }

        let url = payload.url;
        self.replace(payload.records, CatalogSource::Remote(url.clone()));

        let len = self.size();
        if len > 0 && self.position() >= len {
            self.position.send_replace(len - 1);
        }
        info!(
            "Applied {} channels in {} groups from {}",
            len,
            self.groups.len(),
            url
        );

        Some(len)
    }

    fn replace(&mut self, records: Vec<ChannelRecord>, source: CatalogSource) {
        let (records, list_model, groups) = build_catalog(records);
        self.records = records;
        self.list_model = list_model;
        self.groups = groups;
        self.source = source;
        self.loaded_at = Local::now();
    }

    // ── cursor ───────────────────────────────────────────────────────────────

    /// Select the channel at `idx` in the flat list.
    ///
    /// Position subscribers are notified only when the index changes, but the
    /// channel is marked ready on every call so a repeated selection still
    /// retriggers playback.
    ///
    /// # Panics
    /// If `idx >= self.size()`.
    pub fn set_position(&self, idx: usize) {
        let model = &self.list_model[idx];
        self.position.send_if_modified(|current| {
            if *current == idx {
                return false;
            }
            *current = idx;
            true
        });
        model.set_ready();
    }

    pub fn position(&self) -> usize {
        *self.position.borrow()
    }

    pub fn subscribe_position(&self) -> watch::Receiver<usize> {
        self.position.subscribe()
    }

    // ── lookup ───────────────────────────────────────────────────────────────

    /// # Panics
    /// If `idx >= self.size()`.
    pub fn channel_model(&self, idx: usize) -> &Arc<ChannelModel> {
        &self.list_model[idx]
    }

    pub fn size(&self) -> usize {
        self.list_model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list_model.is_empty()
    }

    pub fn list_model(&self) -> &[Arc<ChannelModel>] {
        &self.list_model
    }

    /// Favorites, All Channels, then one group per category in first-seen order.
    pub fn groups(&self) -> &[GroupModel] {
        &self.groups
    }

    pub fn group(&self, idx: usize) -> Option<&GroupModel> {
        self.groups.get(idx)
    }

    pub fn records(&self) -> &[ChannelRecord] {
        &self.records
    }

    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn cache_path(&self) -> PathBuf {
        self.storage_dir.join(CACHE_FILE_NAME)
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Local> {
        self.loaded_at
    }
}

/// Parse a manifest: a JSON array of channel objects.
pub fn parse_channels(text: &str) -> Result<Vec<ChannelRecord>, CatalogError> {
    Ok(serde_json::from_str(text)?)
}

/// Number the records by position and derive the flat list and grouped view.
fn build_catalog(
    mut records: Vec<ChannelRecord>,
) -> (Vec<ChannelRecord>, Vec<Arc<ChannelModel>>, Vec<GroupModel>) {
    for (id, record) in records.iter_mut().enumerate() {
        record.id = id;
    }

    let list_model: Vec<Arc<ChannelModel>> = records
        .iter()
        .map(|record| Arc::new(ChannelModel::new(record.clone())))
        .collect();

    let groups = group_channels(&list_model);
    (records, list_model, groups)
}

fn group_channels(list_model: &[Arc<ChannelModel>]) -> Vec<GroupModel> {
    let mut groups = vec![
        GroupModel::new(FAVORITES),
        GroupModel::with_channels(ALL_CHANNELS, list_model.to_vec()),
    ];
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    for model in list_model {
        let name = model.record().group.as_str();
        let slot = *by_name.entry(name).or_insert_with(|| {
            groups.push(GroupModel::new(name));
            groups.len() - 1
        });
        groups[slot].push(Arc::clone(model));
    }
    groups
}
