//! JSON response shapes returned by the ECS API.

use nodecull_core::{BillingModel, Candidate, InstanceAttributes, InstanceId, ProviderError};
use serde::Deserialize;

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorBody {
    /// Provider error code.
    pub code: String,
    /// Provider error message.
    #[serde(default)]
    pub message: String,
    /// Request identifier.
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Code returned when a dry-run request passed validation.
pub const DRY_RUN_PASSED: &str = "DryRunOperation";

/// `{"IpAddress": [...]}` wrapper.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IpAddressSet {
    /// Addresses in provider order.
    #[serde(default)]
    pub ip_address: Vec<String>,
}

/// VPC attributes of an instance.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcAttributes {
    /// Private addresses assigned in the VPC.
    #[serde(default)]
    pub private_ip_address: IpAddressSet,
}

/// Fields shared by list entries and describe responses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceBody {
    /// Instance identifier.
    #[serde(default)]
    pub instance_id: String,
    /// Host name.
    #[serde(default)]
    pub host_name: String,
    /// Billing model (`PostPaid`, `PrePaid`).
    #[serde(default)]
    pub instance_charge_type: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub creation_time: Option<String>,
    /// VPC attributes.
    #[serde(default)]
    pub vpc_attributes: VpcAttributes,
    /// Classic-network internal addresses.
    #[serde(default)]
    pub inner_ip_address: IpAddressSet,
}

impl InstanceBody {
    /// First VPC private address, else first classic internal address.
    #[must_use]
    pub fn internal_ip(&self) -> Option<&str> {
        self.vpc_attributes
            .private_ip_address
            .ip_address
            .first()
            .or_else(|| self.inner_ip_address.ip_address.first())
            .map(String::as_str)
            .filter(|ip| !ip.is_empty())
    }

    /// Convert a list entry; a missing address becomes empty and is resolved by the probe.
    #[must_use]
    pub fn into_candidate(self) -> Candidate {
        let internal_ip = self.internal_ip().unwrap_or_default().to_string();
        Candidate {
            id: InstanceId::from(self.instance_id),
            internal_ip,
            host_name: self.host_name,
        }
    }

    /// Convert a describe response, requiring every attribute the selector needs.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingField`] for an absent charge type,
    /// creation time, or internal address.
    pub fn into_attributes(
        self,
        operation: &'static str,
    ) -> Result<InstanceAttributes, ProviderError> {
        let internal_ip = self
            .internal_ip()
            .ok_or(ProviderError::MissingField {
                operation,
                field: "VpcAttributes.PrivateIpAddress",
            })?
            .to_string();
        let charge_type = self.instance_charge_type.ok_or(ProviderError::MissingField {
            operation,
            field: "InstanceChargeType",
        })?;
        let creation_time = self.creation_time.ok_or(ProviderError::MissingField {
            operation,
            field: "CreationTime",
        })?;
        Ok(InstanceAttributes {
            billing: BillingModel::from_provider(&charge_type),
            creation_time,
            host_name: self.host_name,
            internal_ip,
        })
    }
}

/// `DescribeInstances` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeInstancesResponse {
    /// Page of instances.
    #[serde(default)]
    pub instances: InstanceList,
    /// Total instances in scope.
    #[serde(default)]
    pub total_count: u32,
}

/// `{"Instance": [...]}` wrapper.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceList {
    /// Instances on this page.
    #[serde(default)]
    pub instance: Vec<InstanceBody>,
}

/// Acknowledgement returned by mutating calls.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ack {
    /// Request identifier.
    #[serde(default)]
    pub request_id: Option<String>,
}
