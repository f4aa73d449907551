//! Builders for candidates and describe responses.

use nodecull_core::{BillingModel, Candidate, InstanceAttributes, InstanceId, PAY_AS_YOU_GO};

/// Candidate with a host name and IP derived from `id`.
#[must_use]
pub fn candidate(id: &str) -> Candidate {
    Candidate {
        id: InstanceId::from(id),
        internal_ip: ip_for(id),
        host_name: host_for(id),
    }
}

/// `count` candidates named `{prefix}-{n}`, numbered from 1.
#[must_use]
pub fn candidates(prefix: &str, count: usize) -> Vec<Candidate> {
    (1..=count)
        .map(|n| candidate(&format!("{prefix}-{n}")))
        .collect()
}

/// Describe response for a pay-as-you-go instance.
#[must_use]
pub fn pay_as_you_go(id: &str, created: &str) -> InstanceAttributes {
    attributes(id, PAY_AS_YOU_GO, created)
}

/// Describe response for a prepaid instance.
#[must_use]
pub fn prepaid(id: &str, created: &str) -> InstanceAttributes {
    attributes(id, "PrePaid", created)
}

/// Describe response with an arbitrary charge type.
#[must_use]
pub fn attributes(id: &str, charge_type: &str, created: &str) -> InstanceAttributes {
    InstanceAttributes {
        billing: BillingModel::from_provider(charge_type),
        creation_time: created.to_string(),
        host_name: host_for(id),
        internal_ip: ip_for(id),
    }
}

fn host_for(id: &str) -> String {
    format!("node-{id}")
}

fn ip_for(id: &str) -> String {
    let octet = id.bytes().fold(0_u8, u8::wrapping_add);
    format!("10.0.0.{octet}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_share_identity() {
        let listed = candidate("i-1");
        let described = pay_as_you_go("i-1", "2021-01-01T00:00Z");
        assert_eq!(listed.host_name, described.host_name);
        assert_eq!(listed.internal_ip, described.internal_ip);
        assert!(described.billing.is_pay_as_you_go());
        assert!(!prepaid("i-1", "2021-01-01T00:00Z").billing.is_pay_as_you_go());
    }

    #[test]
    fn candidates_are_numbered_from_one() {
        let ids: Vec<String> = candidates("vm", 3)
            .into_iter()
            .map(|candidate| candidate.id.to_string())
            .collect();
        assert_eq!(ids, vec!["vm-1", "vm-2", "vm-3"]);
    }
}
