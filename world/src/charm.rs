//! Stun charm cooldown bookkeeping.

use std::time::Duration;

/// Time the charm needs to recharge after activation.
pub(crate) const CHARM_COOLDOWN: Duration = Duration::from_secs(20);
/// Stun applied to the pursuing agent on activation.
pub(crate) const CHARM_STUN: Duration = Duration::from_secs(3);

#[derive(Clone, Debug, Default)]
pub(crate) struct Charm {
    cooldown: Duration,
}

impl Charm {
    /// Attempts to activate the charm, returning the remaining cooldown on failure.
    pub(crate) fn activate(&mut self) -> Result<Duration, Duration> {
        if self.cooldown > Duration::ZERO {
            return Err(self.cooldown);
        }
        self.cooldown = CHARM_COOLDOWN;
        Ok(CHARM_STUN)
    }

    pub(crate) fn recharge(&mut self, dt: Duration) {
        self.cooldown = self.cooldown.saturating_sub(dt);
    }

    pub(crate) fn remaining(&self) -> Duration {
        self.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_starts_cooldown() {
        let mut charm = Charm::default();
        assert_eq!(charm.activate(), Ok(CHARM_STUN));
        assert_eq!(charm.activate(), Err(CHARM_COOLDOWN));
    }

    #[test]
    fn cooldown_drains_with_time() {
        let mut charm = Charm::default();
        let _ = charm.activate();
        charm.recharge(Duration::from_secs(15));
        assert_eq!(charm.remaining(), Duration::from_secs(5));
        charm.recharge(Duration::from_secs(6));
        assert_eq!(charm.activate(), Ok(CHARM_STUN));
    }
}
