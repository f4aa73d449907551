//! `CloudProvider` implementation over the signed ECS RPC API.
//!
//! # Design
//! - One `reqwest::Client` per process; every call is a signed `POST` with an empty body.
//! - Non-success responses are decoded into the provider's error body when possible.
//! - `DryRunOperation` on a mutating call means validation passed and is reported as success.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use nodecull_core::{
    Candidate, CloudProvider, InstanceAttributes, InstanceId, ProviderError, ProviderResult,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::error::{EcsError, EcsResult};
use crate::signer::{Credentials, RequestParts, canonical_query, sign};
use crate::wire::{Ack, DRY_RUN_PASSED, DescribeInstancesResponse, ErrorBody, InstanceBody};

/// ECS API version targeted by every call.
pub const API_VERSION: &str = "2014-05-26";

/// Public endpoint for a region.
#[must_use]
pub fn default_endpoint(region_id: &str) -> String {
    format!("https://ecs.{region_id}.aliyuncs.com/")
}

/// Inputs needed to build an [`EcsClient`].
#[derive(Debug, Clone)]
pub struct EcsSettings {
    /// Region identifier.
    pub region_id: String,
    /// Signing key pair.
    pub credentials: Credentials,
    /// Endpoint override; the regional public endpoint when absent.
    pub endpoint: Option<String>,
    /// Transport-level request timeout.
    pub request_timeout: Duration,
}

/// Alibaba Cloud ECS client.
#[derive(Debug, Clone)]
pub struct EcsClient {
    http: Client,
    endpoint: Url,
    host: String,
    region_id: String,
    credentials: Credentials,
}

enum Outcome<T> {
    Body(T),
    DryRunPassed,
}

impl EcsClient {
    /// Build a client for the configured region and endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidEndpoint`] for an endpoint that is not an
    /// absolute URL with a host, and [`EcsError::ClientBuild`] when the HTTP
    /// client cannot be constructed.
    pub fn new(settings: EcsSettings) -> EcsResult<Self> {
        let raw = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| default_endpoint(&settings.region_id));
        let endpoint = Url::parse(&raw).map_err(|source| EcsError::InvalidEndpoint {
            value: raw.clone(),
            source: Some(source),
        })?;
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(EcsError::InvalidEndpoint {
                    value: raw,
                    source: None,
                });
            }
        };
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|source| EcsError::ClientBuild { source })?;

        Ok(Self {
            http,
            endpoint,
            host,
            region_id: settings.region_id,
            credentials: settings.credentials,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        action: &'static str,
        mut params: Vec<(String, String)>,
    ) -> ProviderResult<Outcome<T>> {
        params.push(("RegionId".to_string(), self.region_id.clone()));
        let query = canonical_query(&params);
        let date = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let nonce = Uuid::new_v4().to_string();
        let headers = sign(
            &RequestParts {
                method: "POST",
                host: &self.host,
                path: self.endpoint.path(),
                query: &query,
                action,
                version: API_VERSION,
                date: &date,
                nonce: &nonce,
            },
            &self.credentials,
        );

        let mut url = self.endpoint.clone();
        url.set_query(Some(&query));
        let mut request = self.http.post(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ProviderError::Transport {
                operation: action,
                source: Box::new(err),
            })?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ProviderError::Transport {
                operation: action,
                source: Box::new(err),
            })?;

        if status.is_success() {
            return serde_json::from_slice(&bytes)
                .map(Outcome::Body)
                .map_err(|err| ProviderError::Decode {
                    operation: action,
                    source: Box::new(err),
                });
        }

        match serde_json::from_slice::<ErrorBody>(&bytes) {
            Ok(body) if body.code == DRY_RUN_PASSED => {
                debug!(action, request_id = ?body.request_id, "dry run passed validation");
                Ok(Outcome::DryRunPassed)
            }
            Ok(body) => Err(ProviderError::Api {
                operation: action,
                code: body.code,
                message: body.message,
                request_id: body.request_id,
            }),
            Err(_) => Err(ProviderError::Status {
                operation: action,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).trim().to_string(),
            }),
        }
    }

    async fn query<T: DeserializeOwned>(
        &self,
        action: &'static str,
        params: Vec<(String, String)>,
    ) -> ProviderResult<T> {
        match self.call(action, params).await? {
            Outcome::Body(body) => Ok(body),
            Outcome::DryRunPassed => Err(ProviderError::Api {
                operation: action,
                code: DRY_RUN_PASSED.to_string(),
                message: "unexpected dry-run response to a read-only call".to_string(),
                request_id: None,
            }),
        }
    }

    async fn mutate(
        &self,
        action: &'static str,
        params: Vec<(String, String)>,
    ) -> ProviderResult<()> {
        if let Outcome::Body(Ack { request_id }) = self.call::<Ack>(action, params).await? {
            debug!(action, request_id = ?request_id, "request accepted");
        }
        Ok(())
    }
}

fn param(key: impl Into<String>, value: impl ToString) -> (String, String) {
    (key.into(), value.to_string())
}

#[async_trait]
impl CloudProvider for EcsClient {
    async fn list_instances(
        &self,
        scope: &str,
        page_size: u32,
        page_number: u32,
    ) -> ProviderResult<Vec<Candidate>> {
        let page: DescribeInstancesResponse = self
            .query(
                "DescribeInstances",
                vec![
                    param("VpcId", scope),
                    param("PageSize", page_size),
                    param("PageNumber", page_number),
                ],
            )
            .await?;
        debug!(
            page_number,
            received = page.instances.instance.len(),
            total = page.total_count,
            "instances listed"
        );
        Ok(page
            .instances
            .instance
            .into_iter()
            .map(InstanceBody::into_candidate)
            .collect())
    }

    async fn describe_instance(&self, id: &InstanceId) -> ProviderResult<InstanceAttributes> {
        const ACTION: &str = "DescribeInstanceAttribute";
        let body: InstanceBody = self
            .query(ACTION, vec![param("InstanceId", id.as_str())])
            .await?;
        body.into_attributes(ACTION)
    }

    async fn stop_instance(&self, id: &InstanceId, dry_run: bool) -> ProviderResult<()> {
        self.mutate(
            "StopInstance",
            vec![param("InstanceId", id.as_str()), param("DryRun", dry_run)],
        )
        .await
    }

    async fn delete_instances(
        &self,
        ids: &[InstanceId],
        client_token: &str,
        dry_run: bool,
    ) -> ProviderResult<()> {
        let mut params: Vec<(String, String)> = ids
            .iter()
            .enumerate()
            .map(|(index, id)| param(format!("InstanceId.{}", index + 1), id.as_str()))
            .collect();
        params.push(param("ClientToken", client_token));
        params.push(param("DryRun", dry_run));
        self.mutate("DeleteInstances", params).await
    }
}
