//! gen-adapters: operaciones de dominio del pipeline de generación.
//!
//! Cada operación es un callable puro `args -> OpResult` registrado bajo un
//! `DomainOperation`. Los payloads tienen forma fija (ver `artifacts`) para
//! que los hashes de salida sean estables. Los fallos esperados (línea mal
//! formada, template inválido, archivo inexistente) viajan como datos.

pub mod artifacts;
pub mod operations;
pub mod ops;

pub use operations::{register_all, DomainOperation};
