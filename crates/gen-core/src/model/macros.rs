//! Macro para declarar payloads tipados con la forma JSON como única fuente.

/// Declara un struct de payload (`Debug, Clone, PartialEq`, serde) e
/// implementa `TypedPayload` con `KIND` explícito o, por defecto, el nombre
/// del struct.
#[macro_export]
macro_rules! typed_payload {
    ($name:ident { $($(#[$fmeta:meta])* $fname:ident : $fty:ty),+ $(,)? } kind: $kind:expr) => {
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name { $($(#[$fmeta])* pub $fname: $fty,)+ }
        impl $crate::model::TypedPayload for $name {
            const KIND: &'static str = $kind;
        }
    };
    ($name:ident { $($(#[$fmeta:meta])* $fname:ident : $fty:ty),+ $(,)? }) => {
        $crate::typed_payload!($name { $($(#[$fmeta])* $fname : $fty),+ } kind: stringify!($name));
    };
}
