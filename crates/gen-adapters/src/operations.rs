//! Identificadores tipados de las operaciones de dominio y su registro.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use gen_core::{MemoCache, Operation, OperationId};

use crate::ops::{ExtractEntities, GenerateArtifact, HashContent, ParseTriples, ReadFile, RenderTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainOperation {
    ParseTriples,
    ExtractEntities,
    RenderTemplate,
    GenerateArtifact,
    HashContent,
    ReadFile,
}

impl DomainOperation {
    pub const ALL: [DomainOperation; 6] = [Self::ParseTriples,
                                           Self::ExtractEntities,
                                           Self::RenderTemplate,
                                           Self::GenerateArtifact,
                                           Self::HashContent,
                                           Self::ReadFile];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParseTriples => "parse_triples",
            Self::ExtractEntities => "extract_entities",
            Self::RenderTemplate => "render_template",
            Self::GenerateArtifact => "generate_artifact",
            Self::HashContent => "hash_content",
            Self::ReadFile => "read_file",
        }
    }

    pub const fn id(self) -> OperationId {
        OperationId::from_static(self.as_str())
    }

    pub fn operation(self) -> Arc<dyn Operation> {
        match self {
            Self::ParseTriples => Arc::new(ParseTriples),
            Self::ExtractEntities => Arc::new(ExtractEntities),
            Self::RenderTemplate => Arc::new(RenderTemplate),
            Self::GenerateArtifact => Arc::new(GenerateArtifact),
            Self::HashContent => Arc::new(HashContent),
            Self::ReadFile => Arc::new(ReadFile),
        }
    }
}

impl fmt::Display for DomainOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.iter()
                 .copied()
                 .find(|op| op.as_str() == s)
                 .ok_or_else(|| format!("unknown domain operation: {s}"))
    }
}

impl From<DomainOperation> for OperationId {
    fn from(op: DomainOperation) -> Self {
        op.id()
    }
}

/// Registra todas las operaciones de dominio en la cache.
pub fn register_all(cache: &mut MemoCache) {
    for op in DomainOperation::ALL {
        cache.register_arc(op.id(), op.operation());
    }
}
