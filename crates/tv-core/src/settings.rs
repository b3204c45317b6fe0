//! Durable key-value settings: small typed flags with per-key defaults.
//!
//! The store is a JSON object in `<dir>/<app_name>.json`. Opening it is the
//! only way to get a handle, so there is no "used before init" state. Reads
//! never fail: a missing key, a value of the wrong type or an unreadable file
//! all read back as the key's default.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::SettingsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolKey {
    /// Channel up/down walks the list in reverse.
    ChannelReversal,
    /// Digits on the remote select a channel by number.
    ChannelNum,
    /// Start the app when the device boots.
    BootStartup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKey {
    /// Last selected index in the flat channel list.
    Position,
    /// Last selected group index.
    PositionCategory,
    /// Last selected index inside that group.
    PositionSub,
}

impl BoolKey {
    pub const ALL: [BoolKey; 3] = [
        BoolKey::ChannelReversal,
        BoolKey::ChannelNum,
        BoolKey::BootStartup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BoolKey::ChannelReversal => "channel_reversal",
            BoolKey::ChannelNum => "channel_num",
            BoolKey::BootStartup => "boot_startup",
        }
    }

    pub fn default_value(self) -> bool {
        matches!(self, BoolKey::ChannelNum)
    }
}

impl IntKey {
    pub const ALL: [IntKey; 3] = [IntKey::Position, IntKey::PositionCategory, IntKey::PositionSub];

    pub fn name(self) -> &'static str {
        match self {
            IntKey::Position => "position",
            IntKey::PositionCategory => "position_group",
            IntKey::PositionSub => "position_sub",
        }
    }

    pub fn default_value(self) -> i32 {
        0
    }
}

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl SettingsStore {
    pub fn open(dir: impl AsRef<Path>, app_name: &str) -> Self {
        let path = dir.as_ref().join(format!("{app_name}.json"));
        let values = Self::load(&path);
        debug!("Settings region {} ({} keys)", path.display(), values.len());
        Self { path, values }
    }

    fn load(path: &Path) -> Map<String, Value> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!("Failed to read settings {}: {}", path.display(), e);
                return Map::new();
            }
        };
        match serde_json::from_str::<Map<String, Value>>(&content) {
            Ok(values) => values,
            Err(e) => {
                warn!("Ignoring malformed settings {}: {}", path.display(), e);
                Map::new()
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_bool(&self, key: BoolKey) -> bool {
        self.values
            .get(key.name())
            .and_then(Value::as_bool)
            .unwrap_or_else(|| key.default_value())
    }

    pub fn get_int(&self, key: IntKey) -> i32 {
        self.values
            .get(key.name())
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or_else(|| key.default_value())
    }

    /// Store `value` and persist the region. The new value is readable from
    /// this handle even if persisting fails.
    pub fn set_bool(&mut self, key: BoolKey, value: bool) -> Result<(), SettingsError> {
        self.values.insert(key.name().to_string(), Value::Bool(value));
        self.commit()
    }

    pub fn set_int(&mut self, key: IntKey, value: i32) -> Result<(), SettingsError> {
        self.values.insert(key.name().to_string(), Value::from(value));
        self.commit()
    }

    /// Write to a sibling temp file and rename over the region so a crash
    /// never leaves a half-written file behind.
    fn commit(&self) -> Result<(), SettingsError> {
        let commit_err = |source| SettingsError::Commit {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(commit_err)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(commit_err)?;
        std::fs::rename(&tmp, &self.path).map_err(commit_err)?;
        Ok(())
    }

    // ── named accessors ───────────────────────────────────────────────────────

    pub fn channel_reversal(&self) -> bool {
        self.get_bool(BoolKey::ChannelReversal)
    }

    pub fn set_channel_reversal(&mut self, value: bool) -> Result<(), SettingsError> {
        self.set_bool(BoolKey::ChannelReversal, value)
    }

    pub fn channel_num(&self) -> bool {
        self.get_bool(BoolKey::ChannelNum)
    }

    pub fn set_channel_num(&mut self, value: bool) -> Result<(), SettingsError> {
        self.set_bool(BoolKey::ChannelNum, value)
    }

    pub fn boot_startup(&self) -> bool {
        self.get_bool(BoolKey::BootStartup)
    }

    pub fn set_boot_startup(&mut self, value: bool) -> Result<(), SettingsError> {
        self.set_bool(BoolKey::BootStartup, value)
    }

    pub fn position(&self) -> i32 {
        self.get_int(IntKey::Position)
    }

    pub fn set_position(&mut self, value: i32) -> Result<(), SettingsError> {
        self.set_int(IntKey::Position, value)
    }

    pub fn position_category(&self) -> i32 {
        self.get_int(IntKey::PositionCategory)
    }

    pub fn set_position_category(&mut self, value: i32) -> Result<(), SettingsError> {
        self.set_int(IntKey::PositionCategory, value)
    }

    pub fn position_sub(&self) -> i32 {
        self.get_int(IntKey::PositionSub)
    }

    pub fn set_position_sub(&mut self, value: i32) -> Result<(), SettingsError> {
        self.set_int(IntKey::PositionSub, value)
    }
}
