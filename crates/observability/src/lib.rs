//! Tracing/logging setup shared by the storefront binaries.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::Json);
}

/// Initialize with human-readable output (demo sessions, local runs).
pub fn init_pretty() {
    tracing::init(LogFormat::Pretty);
}

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Tracing configuration (filters, layers).
pub mod tracing;
