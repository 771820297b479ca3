//! Tri-state value: confirmed by the backend, waiting on it, or rolled back after a failure

#[derive(Debug, Clone, PartialEq)]
pub enum Tracked<T> {
    Confirmed(T),
    Pending { prior: T, proposed: T },
    /// The attempt failed; `value` is the last confirmed value
    Failed { value: T, attempted: T, reason: String },
}

impl<T: Clone> Tracked<T> {
    pub fn new(value: T) -> Self {
        Tracked::Confirmed(value)
    }

    /// Last value the backend agreed to
    pub fn confirmed(&self) -> &T {
        match self {
            Tracked::Confirmed(v) => v,
            Tracked::Pending { prior, .. } => prior,
            Tracked::Failed { value, .. } => value,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Tracked::Pending { .. })
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Tracked::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Start an update. Returns false if one is already in flight.
    pub fn begin(&mut self, proposed: T) -> bool {
        if self.is_pending() {
            return false;
        }
        let prior = self.confirmed().clone();
        *self = Tracked::Pending { prior, proposed };
        true
    }

    /// Backend accepted; the proposed value becomes confirmed
    pub fn confirm(&mut self) {
        if let Tracked::Pending { proposed, .. } = self {
            *self = Tracked::Confirmed(proposed.clone());
        }
    }

    /// Backend refused or was unreachable; roll back to the prior value
    pub fn fail(&mut self, reason: impl Into<String>) {
        if let Tracked::Pending { prior, proposed } = self {
            *self = Tracked::Failed {
                value: prior.clone(),
                attempted: proposed.clone(),
                reason: reason.into(),
            };
        }
    }
}
