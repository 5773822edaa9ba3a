use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Whether the relational backend is serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Not probed yet.
    Unknown,
    Available,
    Unavailable,
}

impl Availability {
    fn to_u8(self) -> u8 {
        match self {
            Availability::Unknown => 0,
            Availability::Available => 1,
            Availability::Unavailable => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Availability::Available,
            2 => Availability::Unavailable,
            _ => Availability::Unknown,
        }
    }

    /// Storage mode as reported by the health check.
    #[must_use]
    pub fn mode_label(self) -> &'static str {
        match self {
            Availability::Available => "database",
            Availability::Unknown | Availability::Unavailable => "in-memory",
        }
    }
}

/// Which store issued a piece of state, such as the user id held by a
/// session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreKind {
    #[default]
    Database,
    InMemory,
}

impl From<Availability> for StoreKind {
    fn from(value: Availability) -> Self {
        match value {
            Availability::Available => StoreKind::Database,
            Availability::Unknown | Availability::Unavailable => StoreKind::InMemory,
        }
    }
}

/// Shared availability flag injected into the storage layer.
///
/// Cloning shares the same underlying state.
#[derive(Debug, Clone)]
pub struct StoreAvailability(Arc<AtomicU8>);

impl StoreAvailability {
    #[must_use]
    pub fn new(initial: Availability) -> Self {
        Self(Arc::new(AtomicU8::new(initial.to_u8())))
    }

    #[must_use]
    pub fn get(&self) -> Availability {
        Availability::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, value: Availability) {
        self.0.store(value.to_u8(), Ordering::Release);
    }

    /// Store currently serving data queries.
    #[must_use]
    pub fn active_store(&self) -> StoreKind {
        self.get().into()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.get() == Availability::Available
    }

    /// Flip to `Unavailable`; returns true only for the caller that made the
    /// transition.
    pub fn mark_unavailable(&self) -> bool {
        let previous = self
            .0
            .swap(Availability::Unavailable.to_u8(), Ordering::AcqRel);
        previous != Availability::Unavailable.to_u8()
    }
}

impl Default for StoreAvailability {
    fn default() -> Self {
        Self::new(Availability::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = StoreAvailability::new(Availability::Available);
        let other = flag.clone();
        assert!(other.mark_unavailable());
        assert_eq!(flag.get(), Availability::Unavailable);
        assert!(!flag.mark_unavailable());
    }

    #[test]
    fn unknown_reports_in_memory() {
        assert_eq!(StoreAvailability::default().get().mode_label(), "in-memory");
        assert_eq!(Availability::Available.mode_label(), "database");
    }

    #[test]
    fn active_store_follows_flag() {
        let flag = StoreAvailability::new(Availability::Available);
        assert_eq!(flag.active_store(), StoreKind::Database);
        flag.mark_unavailable();
        assert_eq!(flag.active_store(), StoreKind::InMemory);
        assert_eq!(StoreAvailability::default().active_store(), StoreKind::InMemory);
    }
}
