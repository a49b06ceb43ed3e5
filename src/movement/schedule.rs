//! Movement domain: pending timed transitions.

use serde::Serialize;

/// Deferred state changes the controller arms when an ability fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transition {
    /// Restore full air control after a wall jump.
    WallJumpUnlock,
    /// The dash impulse has run its course.
    DashEnd,
    /// Gravity returns after an airborne dash.
    DashGraceEnd,
}

/// At most one pending entry per [`Transition`], keyed by fire time on the
/// controller's step clock.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransitionSchedule {
    pending: Vec<(Transition, f64)>,
}

impl TransitionSchedule {
    /// Arm `transition` to fire at `at`, replacing any stale entry of the same kind.
    pub fn schedule(&mut self, transition: Transition, at: f64) {
        self.cancel(transition);
        self.pending.push((transition, at));
    }

    pub fn cancel(&mut self, transition: Transition) {
        self.pending.retain(|(kind, _)| *kind != transition);
    }

    pub fn fire_time(&self, transition: Transition) -> Option<f64> {
        self.pending
            .iter()
            .find(|(kind, _)| *kind == transition)
            .map(|(_, at)| *at)
    }

    pub fn is_pending(&self, transition: Transition) -> bool {
        self.fire_time(transition).is_some()
    }

    /// Remove and return the earliest transition due at `now`.
    pub fn pop_due(&mut self, now: f64) -> Option<Transition> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (_, at))| *at <= now)
            .min_by(|(_, (_, a)), (_, (_, b))| a.total_cmp(b))
            .map(|(index, _)| index)?;
        Some(self.pending.swap_remove(index).0)
    }

    /// Pending entries in the order they were armed.
    pub fn iter(&self) -> impl Iterator<Item = (Transition, f64)> + '_ {
        self.pending.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
