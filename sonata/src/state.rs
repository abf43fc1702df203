//! Miscellaneous solver state.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Satisfiability state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SatState {
    Unknown,
    Sat,
    Unsat,
}

impl Default for SatState {
    fn default() -> SatState {
        SatState::Unknown
    }
}

/// Miscellaneous solver state.
///
/// Anything larger or any larger group of related state variables should be moved into a separate
/// part of [`Context`](crate::context::Context).
#[derive(Default)]
pub struct SolverState {
    pub sat_state: SatState,
    /// Shared with [`InterruptHandle`](crate::solver::InterruptHandle) values handed out to users.
    interrupt: Arc<AtomicBool>,
}

impl SolverState {
    /// The flag used to request an interruption of the search.
    pub fn interrupt_flag(&self) -> &Arc<AtomicBool> {
        &self.interrupt
    }

    /// Whether an interruption of the search was requested.
    ///
    /// This is polled between a propagation pass and the following decision and at the start of
    /// every schedule step.
    pub fn interrupt_requested(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Reset a pending interruption request.
    pub fn clear_interrupt(&self) {
        self.interrupt.store(false, Ordering::Relaxed)
    }
}
