use std::time::Duration;

use serde::Deserialize;

/// Upper bound applied to configured wander intervals.
const WANDER_INTERVAL_CAP_SECS: f32 = 3600.0;

/// Movement and perception parameters of the pursuit agent.
///
/// Every field falls back to its default when omitted from a configuration
/// file, so partial `[agent]` sections are valid.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Speed while heading for an unseen, distant player.
    pub hunt_speed: f32,
    /// Base speed of the wandering search.
    pub search_speed: f32,
    /// Speed while chasing a seen player.
    pub chase_speed: f32,
    /// Distance under which an unseen player is searched for instead of hunted.
    pub search_range: f32,
    /// Distance under which the player is caught.
    pub kill_radius: f32,
    /// Half extent of the agent's collision footprint.
    pub body_radius: f32,
    /// Seconds the agent keeps chasing after losing sight of the player.
    pub sight_persistence_secs: f32,
    /// Factor applied to the search speed during wander bursts.
    pub search_speed_multiplier: f32,
    /// Shortest time between wander direction changes in seconds.
    pub wander_interval_min_secs: f32,
    /// Longest time between wander direction changes in seconds.
    pub wander_interval_max_secs: f32,
    /// Height sight rays start from, for raycasters working in three dimensions.
    pub chest_height: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            hunt_speed: 5.0,
            search_speed: 7.0,
            chase_speed: 8.0,
            search_range: 22.0,
            kill_radius: 1.8,
            body_radius: 0.6,
            sight_persistence_secs: 5.0,
            search_speed_multiplier: 1.2,
            wander_interval_min_secs: 0.4,
            wander_interval_max_secs: 1.2,
            chest_height: 1.0,
        }
    }
}

impl Tuning {
    pub(crate) fn sight_persistence(&self) -> Duration {
        Duration::try_from_secs_f32(self.sight_persistence_secs).unwrap_or(Duration::ZERO)
    }

    /// Wander interval bounds, clamped to `[0, WANDER_INTERVAL_CAP_SECS]`.
    pub(crate) fn wander_interval(&self) -> (f32, f32) {
        let min = self
            .wander_interval_min_secs
            .max(0.0)
            .min(WANDER_INTERVAL_CAP_SECS);
        let max = self
            .wander_interval_max_secs
            .max(min)
            .min(WANDER_INTERVAL_CAP_SECS);
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wander_interval_is_clamped_to_a_finite_range() {
        let tuning = Tuning {
            wander_interval_min_secs: 1e20,
            wander_interval_max_secs: f32::NAN,
            ..Tuning::default()
        };
        assert_eq!(
            tuning.wander_interval(),
            (WANDER_INTERVAL_CAP_SECS, WANDER_INTERVAL_CAP_SECS)
        );

        let negative = Tuning {
            wander_interval_min_secs: -3.0,
            wander_interval_max_secs: -1.0,
            ..Tuning::default()
        };
        assert_eq!(negative.wander_interval(), (0.0, 0.0));
    }
}
