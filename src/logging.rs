use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Route diagnostics to `path`. Filtering comes from `RUST_LOG`; when it is
/// unset nothing is installed, since stderr is owned by the terminal UI.
pub fn init(path: &Path) -> io::Result<bool> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .is_ok();
    Ok(installed)
}
