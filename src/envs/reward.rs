use serde::{
    Deserialize,
    Serialize,
};

/// A named reward-shaping policy, applied where an environment adapter hands
/// rewards to the rest of the system.
///
/// Driving simulators commonly signal "the vehicle left the road" through a
/// sentinel reward value instead of the `terminated` flag. [`Self::OutOfBounds`]
/// turns that convention into a proper episode end: the sentinel reward is
/// replaced with a large penalty and the step reports forced termination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RewardShaping {
    Passthrough,
    OutOfBounds { sentinel: f64, penalty: f64 },
}
impl RewardShaping {
    /// Shape a raw reward, returning the effective reward and whether the
    /// episode must be force-terminated.
    pub fn apply(
        &self,
        reward: f64,
    ) -> (f64, bool) {
        match self {
            Self::Passthrough => (reward, false),
            Self::OutOfBounds { sentinel, penalty } => {
                if reward == *sentinel {
                    (*penalty, true)
                } else {
                    (reward, false)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_never_terminates() {
        assert_eq!(RewardShaping::Passthrough.apply(0.0), (0.0, false));
        assert_eq!(RewardShaping::Passthrough.apply(-3.5), (-3.5, false));
    }

    #[test]
    fn sentinel_reward_becomes_penalized_termination() {
        let shaping = RewardShaping::OutOfBounds {
            sentinel: 0.0,
            penalty: -1000.0,
        };
        assert_eq!(shaping.apply(0.0), (-1000.0, true));
        assert_eq!(shaping.apply(0.7), (0.7, false));
        assert_eq!(shaping.apply(-200.0), (-200.0, false));
    }
}
