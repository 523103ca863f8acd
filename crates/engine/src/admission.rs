//! Admission policy applied before any registry is touched
//!
//! With no requirements expression configured every ad is admitted. Once an
//! expression is configured, two checks run in order:
//!
//! 1. Address consistency: if the ad carries the self-reported IP attribute
//!    of its command (`StartdIpAddr`, `ScheddIpAddr`, ...), it must equal
//!    `MyAddress` exactly. Operators filter on `MyAddress`, so the two must
//!    not disagree.
//! 2. The expression, evaluated with the ad as `MY`, must be boolean true.
//!    Undefined, error and non-boolean results reject.

use adcollector_core::{attrs, Ad, Command, EvalValue, Expr, Result};
use thiserror::Error;
use tracing::warn;

/// Why an ad was refused
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    /// Self-reported address disagrees with `MyAddress`
    #[error("inconsistent addresses: {attr}={reported}, MyAddress={my_address}")]
    InconsistentAddress {
        /// The self-reported attribute
        attr: &'static str,
        /// Its value
        reported: String,
        /// Value of `MyAddress`, empty when absent
        my_address: String,
    },
    /// The expression evaluated to false
    #[error("requirements do not match ad")]
    RequirementsNotMet,
    /// The expression produced something other than a boolean
    #[error("requirements did not evaluate to a boolean (got {0})")]
    NotBoolean(&'static str),
}

/// Requirements expression plus the address-consistency rule
#[derive(Debug, Clone, Default)]
pub struct AdmissionPolicy {
    requirements: Option<Expr>,
}

impl AdmissionPolicy {
    /// Create a policy
    pub fn new(requirements: Option<Expr>) -> Self {
        Self { requirements }
    }

    /// Current requirements expression
    pub fn requirements(&self) -> Option<&Expr> {
        self.requirements.as_ref()
    }

    /// Replace the requirements expression
    ///
    /// On a parse error the policy is left without requirements, so every
    /// ad is admitted until a valid expression is set.
    pub fn set_requirements(&mut self, text: Option<&str>) -> Result<()> {
        self.requirements = None;
        if let Some(text) = text {
            self.requirements = Some(text.parse::<Expr>()?);
        }
        Ok(())
    }

    /// Decide whether `ad`, received with `command` from `peer`, is admitted
    pub fn validate(&self, command: Command, ad: &Ad, peer: &str) -> std::result::Result<(), Rejection> {
        let Some(requirements) = &self.requirements else {
            return Ok(());
        };

        if let Some(attr) = command.self_ip_attr() {
            if let Some(reported) = ad.lookup_string(attr) {
                let my_address = ad.lookup_string(attrs::MY_ADDRESS).unwrap_or_default();
                if my_address != reported {
                    let rejection = Rejection::InconsistentAddress {
                        attr,
                        reported,
                        my_address,
                    };
                    warn!(
                        target: "adcollector::admission",
                        peer = %peer,
                        command = %command,
                        "requirements violation: {}",
                        rejection
                    );
                    return Err(rejection);
                }
            }
        }

        let rejection = match ad.eval(requirements) {
            EvalValue::Bool(true) => return Ok(()),
            EvalValue::Bool(false) => Rejection::RequirementsNotMet,
            other => {
                warn!(
                    target: "adcollector::admission",
                    result = other.type_name(),
                    "requirements did not evaluate to a boolean result"
                );
                Rejection::NotBoolean(other.type_name())
            }
        };
        warn!(
            target: "adcollector::admission",
            peer = %peer,
            command = %command,
            "requirements violation: requirements do not match ad"
        );
        Err(rejection)
    }
}
