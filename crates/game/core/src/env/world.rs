/// Host world state the core needs to consult.
pub trait WorldOracle: Send + Sync {
    /// True while a blocking cutscene or event is running. Dying actors are
    /// not removed until this returns `false`.
    fn is_event_running(&self) -> bool;
}

/// A world that never runs blocking events.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuietWorld;

impl WorldOracle for QuietWorld {
    fn is_event_running(&self) -> bool {
        false
    }
}
