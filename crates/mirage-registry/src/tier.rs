//! Synchronization status tiers.

use serde::{Deserialize, Serialize};

/// How far an entry (or a whole registry) departs from the baseline client.
///
/// Totally ordered by priority: `VanillaOnly < WithVirtual < WithExternalMods`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Tier {
    /// Known to every baseline client; never synchronized.
    #[default]
    VanillaOnly,
    /// Server-only, remapped for baseline clients.
    WithVirtual,
    /// Also present in third-party client mods.
    WithExternalMods,
}

impl Tier {
    /// Numeric priority of the tier.
    pub const fn priority(self) -> u8 {
        match self {
            Tier::VanillaOnly => 0,
            Tier::WithVirtual => 1,
            Tier::WithExternalMods => 2,
        }
    }

    /// Whether `self` may overwrite a stored `current` tier.
    ///
    /// Tiers never go down: a replacement needs equal or higher priority.
    pub const fn can_replace(self, current: Tier) -> bool {
        self.priority() >= current.priority()
    }

    /// Whether entries with this tier belong to the synchronizable subset.
    pub const fn is_synchronizable(self) -> bool {
        !matches!(self, Tier::VanillaOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_matches_ord() {
        let tiers = [Tier::VanillaOnly, Tier::WithVirtual, Tier::WithExternalMods];
        for a in tiers {
            for b in tiers {
                assert_eq!(a.priority().cmp(&b.priority()), a.cmp(&b));
            }
        }
    }

    #[test]
    fn test_can_replace() {
        assert!(Tier::WithVirtual.can_replace(Tier::VanillaOnly));
        assert!(Tier::WithVirtual.can_replace(Tier::WithVirtual));
        assert!(Tier::WithExternalMods.can_replace(Tier::WithVirtual));
        assert!(!Tier::VanillaOnly.can_replace(Tier::WithVirtual));
        assert!(!Tier::WithVirtual.can_replace(Tier::WithExternalMods));
    }

    #[test]
    fn test_only_vanilla_is_unsynchronized() {
        assert!(!Tier::VanillaOnly.is_synchronizable());
        assert!(Tier::WithVirtual.is_synchronizable());
        assert!(Tier::WithExternalMods.is_synchronizable());
    }
}
