//! Fuente de valores deterministas.
//!
//! Reemplaza primitivas no deterministas (reloj, random, uuid) por valores
//! derivados de una semilla estable (`SeedState`). La semilla se calcula una
//! vez por época a partir de un identificador estable (p.ej. el commit
//! actual) y un timestamp derivado.
//!
//! Ciclo de vida:
//! - `DeterministicSource::new(config)` no calcula nada todavía; la primera
//!   consulta inicializa la época (lazy).
//! - `initialize(Some(id))` fija un identificador y abre una época nueva.
//! - `reset()` descarta la época; requiere `&mut self`, así que no puede
//!   haber consultas concurrentes en curso.

mod seed;
mod source;

pub use seed::{DeterminismError, IdentifierSource, SeedConfig, SeedState};
pub use source::DeterministicSource;
