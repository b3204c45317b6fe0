//! Channel entities: the wire record and its UI-facing wrapper.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::watch;

/// One entry of the channel manifest.
///
/// Only `name` and `group` are interpreted here. Everything else the manifest
/// carries (stream URIs, logo, headers, ...) is kept verbatim in `extra` so it
/// survives a decode/encode cycle untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Position in the decoded manifest. Not part of the wire format.
    #[serde(skip)]
    pub id: usize,
    #[serde(default)]
    pub name: String,
    /// Category label used to build the per-group views.
    #[serde(default)]
    pub group: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChannelRecord {
    pub fn title(&self) -> Option<&str> {
        self.extra.get("title").and_then(Value::as_str)
    }

    pub fn logo(&self) -> Option<&str> {
        self.extra.get("logo").and_then(Value::as_str)
    }

    /// Stream URIs in manifest order; non-string entries are skipped.
    pub fn uris(&self) -> Vec<&str> {
        self.extra
            .get("uris")
            .and_then(Value::as_array)
            .map(|uris| uris.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Observable wrapper around one [`ChannelRecord`].
///
/// A fresh model is created for every record on every reload. The readiness
/// signal is a generation counter: each [`set_ready`](Self::set_ready) bumps
/// it and wakes subscribers, even if the channel was already ready.
#[derive(Debug)]
pub struct ChannelModel {
    record: ChannelRecord,
    ready: watch::Sender<u64>,
}

impl ChannelModel {
    pub fn new(record: ChannelRecord) -> Self {
        let (ready, _) = watch::channel(0);
        Self { record, ready }
    }

    pub fn record(&self) -> &ChannelRecord {
        &self.record
    }

    pub fn id(&self) -> usize {
        self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn set_ready(&self) {
        self.ready.send_modify(|generation| *generation += 1);
    }

    pub fn is_ready(&self) -> bool {
        self.ready_generation() > 0
    }

    /// Number of times this channel has been marked ready.
    pub fn ready_generation(&self) -> u64 {
        *self.ready.borrow()
    }

    pub fn subscribe_ready(&self) -> watch::Receiver<u64> {
        self.ready.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_unknown_fields() {
        let json = r#"{"name":"CCTV1","group":"央视","logo":"https://logo/1.png","uris":["http://a","http://b"],"headers":{"Referer":"x"}}"#;
        let record: ChannelRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 0);
        assert_eq!(record.name, "CCTV1");
        assert_eq!(record.group, "央视");
        assert_eq!(record.logo(), Some("https://logo/1.png"));
        assert_eq!(record.uris(), vec!["http://a", "http://b"]);
        assert!(record.extra.contains_key("headers"));

        let encoded = serde_json::to_value(&record).unwrap();
        assert!(encoded.get("id").is_none());
        assert_eq!(encoded["headers"]["Referer"], "x");
    }

    #[test]
    fn test_record_missing_fields_default() {
        let record: ChannelRecord = serde_json::from_str(r#"{"title":"Only a title"}"#).unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.group, "");
        assert_eq!(record.title(), Some("Only a title"));
        assert!(record.uris().is_empty());
    }

    #[tokio::test]
    async fn test_set_ready_notifies_every_call() {
        let model = ChannelModel::new(ChannelRecord::default());
        let mut rx = model.subscribe_ready();
        assert!(!model.is_ready());

        model.set_ready();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);

        model.set_ready();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 2);
        assert!(model.is_ready());
    }
}
