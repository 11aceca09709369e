//! Snapshot en un archivo JSON.
//!
//! Escritura atómica: se serializa a `<archivo>.tmp` en el mismo directorio y
//! se renombra sobre el destino, así un lector nunca ve un archivo a medias.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use gen_core::CacheSnapshot;
use log::{debug, info};

use crate::config::PersistenceConfig;
use crate::error::PersistenceError;
use crate::store::SnapshotStore;

#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &PersistenceConfig) -> Self {
        Self::new(config.cache_path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path
                           .file_name()
                           .map(|n| n.to_os_string())
                           .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileSnapshotStore {
    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))?;
        }
        let body = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.temp_path();
        fs::write(&tmp, body).map_err(|e| PersistenceError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| PersistenceError::io(&self.path, e))?;
        info!("cache snapshot saved: {} records -> {}", snapshot.len(), self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<CacheSnapshot>, PersistenceError> {
        let body = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no cache snapshot at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(PersistenceError::io(&self.path, e)),
        };
        let snapshot: CacheSnapshot = serde_json::from_slice(&body)?;
        debug!("cache snapshot loaded: {} records", snapshot.len());
        Ok(Some(snapshot))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn clear(&self) -> Result<bool, PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PersistenceError::io(&self.path, e)),
        }
    }
}
