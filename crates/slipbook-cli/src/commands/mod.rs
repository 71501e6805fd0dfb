//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::Path;

use slipbook_core::config::SlipbookConfig;
use slipbook_core::ledger::CsvStore;
use slipbook_core::transcript::SidecarSource;

pub(crate) fn load_config(path: Option<&str>) -> anyhow::Result<SlipbookConfig> {
    Ok(match path {
        Some(p) => SlipbookConfig::from_file(Path::new(p))?,
        None => SlipbookConfig::default(),
    })
}

/// Bare filename used as the ledger row key.
pub(crate) fn image_name(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Path has no file name: {}", path.display()))
}

pub(crate) fn sidecar_source(config: &SlipbookConfig) -> SidecarSource {
    let mut source = SidecarSource::new().with_extension(&config.transcripts.extension);
    if let Some(dir) = &config.transcripts.dir {
        source = source.with_dir(dir.clone());
    }
    source
}

pub(crate) fn ledger_store(path: &Path, config: &SlipbookConfig) -> CsvStore {
    let store = CsvStore::new(path);
    if config.ledger.create_default_schema {
        store
    } else {
        store.without_default_schema()
    }
}
