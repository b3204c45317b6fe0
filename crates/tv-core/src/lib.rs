pub mod catalog;
pub mod channel;
pub mod config;
pub mod error;
pub mod group;
pub mod platform;
pub mod refresh;
pub mod settings;

pub use catalog::{CatalogSource, ChannelCatalog};
pub use channel::{ChannelModel, ChannelRecord};
pub use error::{CatalogError, SettingsError};
pub use group::GroupModel;
pub use refresh::{RefreshOutcome, RefreshTask};
pub use settings::{BoolKey, IntKey, SettingsStore};
