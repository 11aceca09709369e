//! Implementaciones de las operaciones de dominio.

mod extract;
mod file;
mod generate;
mod hash;
mod parse;
mod render;

pub use extract::ExtractEntities;
pub use file::ReadFile;
pub use generate::GenerateArtifact;
pub use hash::HashContent;
pub use parse::{parse_line, ParseTriples};
pub use render::RenderTemplate;
