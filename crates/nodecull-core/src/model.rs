//! Domain types flowing through the decommission pipeline.
//!
//! # Design
//! - Pure data carriers; IO lives behind the traits in `provider.rs`.
//! - A failed probe cannot also be eligible: the outcome enum makes that unrepresentable.
//! - `VictimSet` is built once by the selector and only read afterwards.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ProviderError};

/// Provider billing designation for pay-as-you-go instances.
pub const PAY_AS_YOU_GO: &str = "PostPaid";

/// Provider-assigned instance identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Wrap a provider identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for InstanceId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One instance discovered in the network scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Provider-assigned identifier.
    pub id: InstanceId,
    /// Internal (private) IP address as listed.
    pub internal_ip: String,
    /// Host name as listed.
    pub host_name: String,
}

/// Billing model reported for an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingModel {
    /// Billed by usage; eligible for removal.
    PayAsYouGo,
    /// Reserved, prepaid, or any other designation.
    Other(String),
}

impl BillingModel {
    /// Map the provider's charge-type string onto a billing model.
    #[must_use]
    pub fn from_provider(value: &str) -> Self {
        if value == PAY_AS_YOU_GO {
            Self::PayAsYouGo
        } else {
            Self::Other(value.to_string())
        }
    }

    /// Whether this billing model allows removal.
    #[must_use]
    pub const fn is_pay_as_you_go(&self) -> bool {
        matches!(self, Self::PayAsYouGo)
    }
}

/// Lifecycle and billing attributes returned by the describe call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceAttributes {
    /// Billing model.
    pub billing: BillingModel,
    /// Creation timestamp exactly as the provider returned it.
    pub creation_time: String,
    /// Host name reported by the describe call.
    pub host_name: String,
    /// Internal IP reported by the describe call.
    pub internal_ip: String,
}

/// Outcome of probing one candidate.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The describe call succeeded.
    Described {
        /// Billing model reported by the provider.
        billing: BillingModel,
        /// Raw creation timestamp.
        creation_time: String,
    },
    /// The describe call failed; the candidate is never eligible.
    Failed {
        /// Underlying provider error.
        cause: ProviderError,
    },
}

/// Eligibility-annotated result for one candidate.
#[derive(Debug)]
pub struct ProbeResult {
    /// Candidate identifier.
    pub instance_id: InstanceId,
    /// Host name (from the describe response on success, the listing otherwise).
    pub host_name: String,
    /// Internal IP (from the describe response on success, the listing otherwise).
    pub internal_ip: String,
    /// Probe outcome.
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    /// Build a result from a successful describe call.
    #[must_use]
    pub fn described(instance_id: InstanceId, attributes: InstanceAttributes) -> Self {
        Self {
            instance_id,
            host_name: attributes.host_name,
            internal_ip: attributes.internal_ip,
            outcome: ProbeOutcome::Described {
                billing: attributes.billing,
                creation_time: attributes.creation_time,
            },
        }
    }

    /// Build a failed result, keeping the identity observed in the listing.
    #[must_use]
    pub fn failed(candidate: &Candidate, cause: ProviderError) -> Self {
        Self {
            instance_id: candidate.id.clone(),
            host_name: candidate.host_name.clone(),
            internal_ip: candidate.internal_ip.clone(),
            outcome: ProbeOutcome::Failed { cause },
        }
    }

    /// True only when the probe succeeded and the instance is pay-as-you-go.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        matches!(
            &self.outcome,
            ProbeOutcome::Described { billing, .. } if billing.is_pay_as_you_go()
        )
    }

    /// Failure cause, when the probe failed.
    #[must_use]
    pub const fn failure(&self) -> Option<&ProviderError> {
        match &self.outcome {
            ProbeOutcome::Failed { cause } => Some(cause),
            ProbeOutcome::Described { .. } => None,
        }
    }

    /// Raw creation timestamp, when the probe succeeded.
    #[must_use]
    pub fn creation_time(&self) -> Option<&str> {
        match &self.outcome {
            ProbeOutcome::Described { creation_time, .. } => Some(creation_time),
            ProbeOutcome::Failed { .. } => None,
        }
    }
}

/// Rule used to choose victims when more candidates are eligible than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Ascending creation time.
    #[default]
    OldestFirst,
    /// Descending creation time.
    NewestFirst,
    /// Probe completion order; not deterministic across runs.
    Unordered,
}

impl SelectionPolicy {
    /// Canonical kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OldestFirst => "oldest-first",
            Self::NewestFirst => "newest-first",
            Self::Unordered => "unordered",
        }
    }
}

impl Display for SelectionPolicy {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "oldest" | "oldest-first" => Ok(Self::OldestFirst),
            "newest" | "newest-first" | "latest" => Ok(Self::NewestFirst),
            "unordered" | "none" => Ok(Self::Unordered),
            other => Err(CoreError::UnknownPolicy {
                value: other.to_string(),
            }),
        }
    }
}

/// Host identity handed to the cluster-removal collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    /// Node host name as registered in the cluster.
    pub host_name: String,
    /// Node internal IP.
    pub internal_ip: String,
}

/// One instance chosen for decommissioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victim {
    /// Provider identifier.
    pub id: InstanceId,
    /// Host name.
    pub host_name: String,
    /// Internal IP.
    pub internal_ip: String,
    /// Raw creation timestamp.
    pub creation_time: String,
}

impl Victim {
    /// Host identity used for cluster removal.
    #[must_use]
    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            host_name: self.host_name.clone(),
            internal_ip: self.internal_ip.clone(),
        }
    }
}

/// Ordered, count-bounded list of victims.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VictimSet {
    victims: Vec<Victim>,
}

impl VictimSet {
    /// Wrap victims that are already ordered and truncated.
    #[must_use]
    pub const fn new(victims: Vec<Victim>) -> Self {
        Self { victims }
    }

    /// Victims in selection order.
    #[must_use]
    pub fn victims(&self) -> &[Victim] {
        &self.victims
    }

    /// Number of victims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.victims.len()
    }

    /// Whether nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.victims.is_empty()
    }

    /// Instance identifiers in selection order.
    #[must_use]
    pub fn ids(&self) -> Vec<InstanceId> {
        self.victims.iter().map(|victim| victim.id.clone()).collect()
    }

    /// Host identities in selection order.
    #[must_use]
    pub fn node_refs(&self) -> Vec<NodeRef> {
        self.victims.iter().map(Victim::node_ref).collect()
    }
}
