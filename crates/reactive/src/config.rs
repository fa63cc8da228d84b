/// Per-reactor diagnostics configuration.
///
/// None of the settings change dispatch semantics, they only control what gets logged.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReactorConfig {
    /// When a single drain executes more pending runs than this, a warning is logged once.
    ///
    /// A listener that always re-emits on its own reactor never lets the drain finish, the
    /// warning is the only signal of that.
    pub pending_run_warn_threshold: usize,

    /// Log every listener invocation at `trace` level.
    pub trace_dispatch: bool,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            pending_run_warn_threshold: 10_000,
            trace_dispatch: false,
        }
    }
}
