//! Inicialización de `tracing`.
//!
//! Prioridad del filtro: `GENFLOW_LOG`, luego `RUST_LOG`, luego el nivel
//! derivado de `-v`. Los registros de crates que usan `log` llegan por el
//! puente de `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "GENFLOW_LOG";

fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV).or_else(|_| EnvFilter::try_from_default_env())
                                                 .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    // Un segundo init (tests) no es un error.
    let _ = tracing_subscriber::fmt().with_env_filter(filter)
                                     .with_target(verbose >= 2)
                                     .with_writer(std::io::stderr)
                                     .try_init();
}
