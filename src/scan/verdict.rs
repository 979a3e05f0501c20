//! Scan verdicts and the decisions derived from them.
//!
//! # State Transitions
//! ```text
//! prior weight 0,  healthy        → Enable (weight from the registry)
//! prior weight >0, unhealthy/lost → Disable (weight 0, then flush)
//! anything else                   → no action
//! ```
//!
//! The prior weight comes from the director's own listing, so a weight
//! changed by someone else between cycles is taken as the current state.

use std::fmt;

use crate::health::PortFailure;
use crate::weights::WeightRegistry;

/// How one host's scan ended.
#[derive(Debug)]
pub enum ScanOutcome {
    Healthy,
    /// A port check failed.
    Unhealthy(PortFailure),
    /// The scan task panicked or overran its deadline.
    Lost(String),
}

impl ScanOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ScanOutcome::Healthy)
    }
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanOutcome::Healthy => write!(f, "healthy"),
            ScanOutcome::Unhealthy(failure) => write!(f, "{}", failure),
            ScanOutcome::Lost(reason) => write!(f, "scan lost: {}", reason),
        }
    }
}

/// One host's scan result alongside the weight it had when listed.
#[derive(Debug)]
pub struct ScanVerdict {
    pub host: String,
    pub prior_weight: u32,
    pub outcome: ScanOutcome,
}

/// A write to issue against the director.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Enable { host: String, weight: u32 },
    Disable { host: String },
}

impl Action {
    pub fn host(&self) -> &str {
        match self {
            Action::Enable { host, .. } | Action::Disable { host } => host,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Enable { .. } => "enable",
            Action::Disable { .. } => "disable",
        }
    }
}

impl ScanVerdict {
    /// The action needed to bring the director in line with this verdict.
    pub fn decide(&self, weights: &WeightRegistry) -> Option<Action> {
        match (self.outcome.is_healthy(), self.prior_weight) {
            (true, 0) => Some(Action::Enable {
                host: self.host.clone(),
                weight: weights.resolve(&self.host),
            }),
            (false, w) if w != 0 => Some(Action::Disable {
                host: self.host.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::ProbeError;
    use crate::weights::StaticResolver;

    fn verdict(host: &str, prior_weight: u32, outcome: ScanOutcome) -> ScanVerdict {
        ScanVerdict {
            host: host.to_string(),
            prior_weight,
            outcome,
        }
    }

    fn failed() -> ScanOutcome {
        ScanOutcome::Unhealthy(PortFailure {
            port: 143,
            tls: false,
            error: ProbeError::NoBanner,
        })
    }

    #[tokio::test]
    async fn recovered_host_uses_registry_weight() {
        let weights = WeightRegistry::new(None);
        weights.load_str("10.0.0.5:50", &StaticResolver::new()).await;

        assert_eq!(
            verdict("10.0.0.5", 0, ScanOutcome::Healthy).decide(&weights),
            Some(Action::Enable { host: "10.0.0.5".into(), weight: 50 })
        );
        assert_eq!(
            verdict("mail1", 0, ScanOutcome::Healthy).decide(&weights),
            Some(Action::Enable { host: "mail1".into(), weight: 100 })
        );
    }

    #[test]
    fn failing_enabled_host_is_disabled() {
        let weights = WeightRegistry::new(None);
        assert_eq!(
            verdict("mail2", 100, failed()).decide(&weights),
            Some(Action::Disable { host: "mail2".into() })
        );
        assert_eq!(
            verdict("mail3", 7, ScanOutcome::Lost("panicked".into())).decide(&weights),
            Some(Action::Disable { host: "mail3".into() })
        );
    }

    #[test]
    fn matching_state_needs_nothing() {
        let weights = WeightRegistry::new(None);
        assert_eq!(verdict("mail1", 100, ScanOutcome::Healthy).decide(&weights), None);
        assert_eq!(verdict("mail2", 0, failed()).decide(&weights), None);
    }

    #[test]
    fn outcome_display_names_the_port() {
        assert_eq!(
            failed().to_string(),
            "port 143: connection closed before a banner was sent"
        );
    }
}
