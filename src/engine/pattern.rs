//! Visual indicator pattern handling.
//!
//! At most one pattern is active at a time. Switching is a two-phase
//! deactivate-old/activate-new operation against an external controller,
//! and either phase can fail; the state machine keeps the pending phase
//! explicit so the next poll retries it instead of guessing.

use crate::utils::error::Result;

/// A named visual/LED notification state. Mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorPattern {
    Full,
    Charging,
    Boost,
}

impl IndicatorPattern {
    /// The symbolic name used when talking to the indicator controller.
    pub fn name(self) -> &'static str {
        match self {
            IndicatorPattern::Full => "PatternBatteryFull",
            IndicatorPattern::Charging => "PatternBatteryCharging",
            IndicatorPattern::Boost => "PatternBoost",
        }
    }
}

/// External collaborator that owns the physical indicator.
pub trait IndicatorController {
    fn activate(&mut self, pattern: IndicatorPattern) -> Result<()>;
    fn deactivate(&mut self, pattern: IndicatorPattern) -> Result<()>;
}

/// Pattern switching state.
///
/// `Deactivating` means a deactivate request was not acknowledged: the old
/// pattern still counts as active and the request is retried. `Activating`
/// means the activate request was not acknowledged: nothing is active yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternState {
    #[default]
    Idle,
    Active(IndicatorPattern),
    Deactivating(IndicatorPattern),
    Activating(IndicatorPattern),
}

impl PatternState {
    /// The pattern currently considered active, if any. A pattern whose
    /// deactivation was not acknowledged is still active.
    pub fn active(&self) -> Option<IndicatorPattern> {
        match *self {
            PatternState::Active(p) | PatternState::Deactivating(p) => Some(p),
            PatternState::Idle | PatternState::Activating(_) => None,
        }
    }

    /// Drive the machine one step toward `desired`.
    ///
    /// Performs at most one deactivate and one activate request. Returns
    /// the `(old, new)` change of the active pattern when it changed this
    /// step, for the pattern-changed notification.
    pub fn drive(
        &mut self, desired: Option<IndicatorPattern>, controller: &mut dyn IndicatorController,
    ) -> Option<(Option<IndicatorPattern>, Option<IndicatorPattern>)> {
        let before = self.active();

        // A pending activation that no longer matches is abandoned; it
        // never became active, so there is nothing to deactivate.
        if let PatternState::Activating(p) = *self {
            if desired != Some(p) {
                *self = PatternState::Idle;
            }
        }

        // A pattern that failed to deactivate is still showing; if it is
        // wanted again there is nothing to request.
        if let PatternState::Deactivating(p) = *self {
            if desired == Some(p) {
                *self = PatternState::Active(p);
            }
        }

        // Phase 1: deactivate the active pattern when it differs.
        if let PatternState::Active(p) | PatternState::Deactivating(p) = *self {
            if desired != Some(p) {
                if controller.deactivate(p).is_ok() {
                    *self = PatternState::Idle;
                } else {
                    *self = PatternState::Deactivating(p);
                }
            }
        }

        // Phase 2: activate the desired pattern once nothing is active.
        if matches!(*self, PatternState::Idle | PatternState::Activating(_)) {
            if let Some(wanted) = desired {
                if controller.activate(wanted).is_ok() {
                    *self = PatternState::Active(wanted);
                } else {
                    *self = PatternState::Activating(wanted);
                }
            }
        }

        let after = self.active();
        (before != after).then_some((before, after))
    }
}

/// Controller that only logs requests. Stands in when no indicator
/// hardware integration is wired up.
#[derive(Debug, Default)]
pub struct LogIndicator;

impl IndicatorController for LogIndicator {
    fn activate(&mut self, pattern: IndicatorPattern) -> Result<()> {
        log::info!("indicator activate: {}", pattern.name());
        Ok(())
    }

    fn deactivate(&mut self, pattern: IndicatorPattern) -> Result<()> {
        log::info!("indicator deactivate: {}", pattern.name());
        Ok(())
    }
}
