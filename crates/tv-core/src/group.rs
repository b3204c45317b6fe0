use std::sync::Arc;

use crate::channel::ChannelModel;

/// Synthetic first group, filled by the favorites feature rather than the manifest.
pub const FAVORITES: &str = "Favorites";
/// Synthetic second group holding every channel in manifest order.
pub const ALL_CHANNELS: &str = "All Channels";

/// A named, ordered slice of the channel list.
///
/// Members are shared with the flat list, so the same `Arc` appears in
/// "All Channels", in its own category and in the catalog's list model.
#[derive(Debug, Clone, Default)]
pub struct GroupModel {
    name: String,
    channels: Vec<Arc<ChannelModel>>,
}

impl GroupModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: Vec::new(),
        }
    }

    pub fn with_channels(name: impl Into<String>, channels: Vec<Arc<ChannelModel>>) -> Self {
        Self {
            name: name.into(),
            channels,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channels(&self) -> &[Arc<ChannelModel>] {
        &self.channels
    }

    pub fn get(&self, idx: usize) -> Option<&Arc<ChannelModel>> {
        self.channels.get(idx)
    }

    pub fn push(&mut self, channel: Arc<ChannelModel>) {
        self.channels.push(channel);
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
