use serde::{Deserialize, Serialize};

use super::lifecycle::TransitionPolicy;
use super::matching::DEFAULT_NOTIFICATION_THRESHOLD;

/// Tunable rules applied by the placement service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementPolicy {
    pub notification_threshold: f32,
    pub transition_policy: TransitionPolicy,
}

impl PlacementPolicy {
    pub fn new(notification_threshold: f32, transition_policy: TransitionPolicy) -> Self {
        let notification_threshold =
            if notification_threshold.is_finite() && (0.0..=1.0).contains(&notification_threshold) {
                notification_threshold
            } else {
                DEFAULT_NOTIFICATION_THRESHOLD
            };

        Self {
            notification_threshold,
            transition_policy,
        }
    }
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_THRESHOLD, TransitionPolicy::default())
    }
}
