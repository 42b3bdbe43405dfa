//! Process-wide runtime configuration, sourced from environment variables.
//!
//! Spec §6 promises no persisted state and no mandated environment
//! variables, so these are opt-in tuning knobs with documented defaults —
//! nothing here is required to run the bootstrap sequence.

use serde::Deserialize;
use std::sync::OnceLock;

const ENV_STACK_SIZE: &str = "CORERT_STACK_SIZE";
const ENV_FIFO_CAPACITY_HINT: &str = "CORERT_FIFO_CAPACITY_HINT";
const ENV_LOG_FILTER: &str = "CORERT_LOG";

/// Tuning knobs read once at [`crate::bootstrap::run`] time.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    /// Default stack size for threads spawned without an explicit
    /// [`crate::thread::ThreadAttrs::set_stack_size`].
    pub default_stack_size: usize,
    /// Capacity hint passed to a thread's event queue at construction.
    pub default_fifo_capacity_hint: usize,
    /// `tracing_subscriber::EnvFilter` directive string.
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            default_stack_size: 2 * 1024 * 1024,
            default_fifo_capacity_hint: 16,
            log_filter: "warn".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Build a config from defaults overridden by any of
    /// `CORERT_STACK_SIZE`, `CORERT_FIFO_CAPACITY_HINT`, `CORERT_LOG`.
    pub fn from_env() -> Self {
        let mut cfg = RuntimeConfig::default();
        if let Ok(v) = std::env::var(ENV_STACK_SIZE) {
            if let Ok(parsed) = v.parse() {
                cfg.default_stack_size = parsed;
            }
        }
        if let Ok(v) = std::env::var(ENV_FIFO_CAPACITY_HINT) {
            if let Ok(parsed) = v.parse() {
                cfg.default_fifo_capacity_hint = parsed;
            }
        }
        if let Ok(v) = std::env::var(ENV_LOG_FILTER) {
            cfg.log_filter = v;
        }
        cfg
    }
}

static ACTIVE: OnceLock<RuntimeConfig> = OnceLock::new();

/// Install the config [`crate::bootstrap::run`] resolved for the process.
/// A no-op if a config is already installed (first bootstrap wins).
pub(crate) fn install(cfg: RuntimeConfig) {
    let _ = ACTIVE.set(cfg);
}

/// The active process-wide config, or [`RuntimeConfig::default`] if
/// [`crate::bootstrap::run`] hasn't installed one yet (e.g. in unit tests
/// that spawn threads directly without bootstrapping).
pub fn current() -> RuntimeConfig {
    ACTIVE.get().cloned().unwrap_or_default()
}
