use tracing::{debug, info, warn};
use tv_core::config::Config;
use tv_core::{ChannelCatalog, RefreshOutcome, SettingsError, SettingsStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = tv_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("mytv.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "info,tv_core=debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string()
    });
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("mytv log: {}", log_path.display());
    info!("mytv starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load {:?}, using defaults: {}", Config::config_path(), e);
            Config::default()
        }
    };

    let mut settings = SettingsStore::open(&config.settings.dir, &config.settings.app_name);

    // ── Channel catalog (cache or bundled list; fatal if undecodable) ────────
    let mut catalog = ChannelCatalog::init(
        config.catalog.storage_dir.clone(),
        config.catalog.server_url.clone(),
    )?;
    restore_position(&catalog, &settings);

    let mut position_rx = catalog.subscribe_position();
    tokio::spawn(async move {
        while position_rx.changed().await.is_ok() {
            let position = *position_rx.borrow_and_update();
            info!("Cursor moved to channel {}", position);
        }
    });

    // ── Refresh from the remote manifest ─────────────────────────────────────
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.catalog.server_url.clone());
    let mut task = catalog.update(url);
    let finished = tokio::select! {
        outcome = &mut task => Some(outcome),
        Ok(()) = tokio::signal::ctrl_c() => None,
    };
    let outcome = match finished {
        Some(outcome) => outcome,
        None => {
            task.abort();
            RefreshOutcome::Aborted
        }
    };
    let applied = catalog.apply_pending();
    debug!("Applied {} queued refresh result(s)", applied);

    match &outcome {
        RefreshOutcome::Fetched { channels } | RefreshOutcome::Updated { channels } => {
            info!("Channel list refreshed: {} channels", channels)
        }
        RefreshOutcome::Failed(e) => warn!(
            "Keeping {} channels from {:?}: {}",
            catalog.size(),
            catalog.source(),
            e
        ),
        RefreshOutcome::Aborted => info!("Channel refresh aborted"),
    }

    let group_idx = usize::try_from(settings.position_category())
        .ok()
        .filter(|idx| *idx < catalog.groups().len())
        .unwrap_or(1);
    print_catalog(&catalog, group_idx);

    // ── Persist selection for the next start ─────────────────────────────────
    let position = catalog.position();
    let sub = catalog
        .group(group_idx)
        .and_then(|g| g.channels().iter().position(|m| m.id() == position))
        .unwrap_or(0);
    if let Err(e) = save_selection(&mut settings, position, group_idx, sub) {
        warn!("Failed to save selection: {}", e);
    }

    Ok(())
}

/// Reselect the channel that was current when the app last exited.
fn restore_position(catalog: &ChannelCatalog, settings: &SettingsStore) {
    if catalog.is_empty() {
        return;
    }
    let saved = usize::try_from(settings.position())
        .ok()
        .filter(|idx| *idx < catalog.size())
        .unwrap_or(0);
    catalog.set_position(saved);
    debug!("Restored cursor to channel {}", saved);
}

fn save_selection(
    settings: &mut SettingsStore,
    position: usize,
    group_idx: usize,
    sub: usize,
) -> Result<(), SettingsError> {
    settings.set_position(to_setting(position))?;
    settings.set_position_category(to_setting(group_idx))?;
    settings.set_position_sub(to_setting(sub))?;
    Ok(())
}

fn to_setting(idx: usize) -> i32 {
    i32::try_from(idx).unwrap_or(0)
}

fn print_catalog(catalog: &ChannelCatalog, group_idx: usize) {
    println!(
        "{} channels from {:?} (loaded {})",
        catalog.size(),
        catalog.source(),
        catalog.loaded_at().format("%Y-%m-%d %H:%M:%S")
    );
    for (idx, group) in catalog.groups().iter().enumerate() {
        let marker = if idx == group_idx { '>' } else { ' ' };
        println!("{marker} {idx:>2}. {} ({})", group.name(), group.len());
    }

    let Some(group) = catalog.group(group_idx) else {
        return;
    };
    println!();
    for model in group.channels() {
        let current = if model.id() == catalog.position() { "*" } else { " " };
        println!("  {current} {:>3} {}", model.id(), model.name());
    }
}
