//! gen-persistence
//!
//! Persistencia de snapshots de la cache de memoización.
//!
//! Módulos:
//! - `store`: trait `SnapshotStore` + implementación en memoria.
//! - `file`: snapshot JSON en disco (escritura atómica temp + rename).
//! - `config`: carga de configuración desde .env.

pub mod config;
pub mod error;
pub mod file;
pub mod store;

pub use config::{init_dotenv, PersistenceConfig};
pub use error::PersistenceError;
pub use file::JsonFileSnapshotStore;
pub use store::{InMemorySnapshotStore, SnapshotStore};
