//! Scripted collaborators that record every call in a shared log.
//!
//! # Design
//! - Provider and remover share one [`CallLog`] so tests can assert cross-collaborator ordering.
//! - Behaviour is scripted up front; the fakes never mutate their script.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use nodecull_core::{
    Candidate, CloudProvider, ClusterRemover, InstanceAttributes, InstanceId, NodeRef,
    ProviderError, ProviderResult, RemovalError,
};

/// One observed collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `list_instances` for a page.
    ListInstances {
        /// Scope passed in.
        scope: String,
        /// Requested page size.
        page_size: u32,
        /// Requested page number.
        page_number: u32,
    },
    /// `describe_instance`.
    Describe(InstanceId),
    /// `stop_instance`.
    Stop {
        /// Instance stopped.
        id: InstanceId,
        /// Dry-run flag passed in.
        dry_run: bool,
    },
    /// `delete_instances`.
    Delete {
        /// Batch submitted.
        ids: Vec<InstanceId>,
        /// Idempotency token passed in.
        client_token: String,
        /// Dry-run flag passed in.
        dry_run: bool,
    },
    /// `remove_nodes`.
    RemoveNodes(Vec<NodeRef>),
}

impl Call {
    /// True for calls that mutate cluster or provider state.
    #[must_use]
    pub const fn is_side_effect(&self) -> bool {
        matches!(
            self,
            Self::Stop { .. } | Self::Delete { .. } | Self::RemoveNodes(_)
        )
    }
}

/// Shared, ordered record of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    /// Append a call.
    pub fn record(&self, call: Call) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Snapshot of every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calls that changed state, in order.
    #[must_use]
    pub fn side_effects(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(Call::is_side_effect)
            .collect()
    }

    /// Page numbers requested, in order.
    #[must_use]
    pub fn pages_requested(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::ListInstances { page_number, .. } => Some(page_number),
                _ => None,
            })
            .collect()
    }

    /// Instances described, in call order.
    #[must_use]
    pub fn described(&self) -> Vec<InstanceId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Describe(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

/// Scripted response for one catalog page.
#[derive(Debug, Clone)]
pub enum PageScript {
    /// Return these instances.
    Items(Vec<Candidate>),
    /// Fail with a provider API error carrying this code.
    Fail(&'static str),
}

/// Scripted response for one describe call.
#[derive(Debug, Clone)]
pub enum DescribeScript {
    /// Return these attributes.
    Attributes(InstanceAttributes),
    /// Fail with a provider API error carrying this code.
    Fail(&'static str),
    /// Never answer.
    Hang,
    /// Panic inside the call.
    Panic,
}

/// In-memory [`CloudProvider`] driven by a script.
#[derive(Debug, Default)]
pub struct FakeProvider {
    log: CallLog,
    pages: Vec<PageScript>,
    describes: HashMap<InstanceId, DescribeScript>,
    stop_failures: HashSet<InstanceId>,
    stop_hangs: HashSet<InstanceId>,
    fail_delete: bool,
    hang_delete: bool,
    describe_delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeProvider {
    /// Provider recording into `log` with an empty script.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Script the catalog pages, page 1 first. Pages past the end are empty.
    #[must_use]
    pub fn with_pages(mut self, pages: Vec<PageScript>) -> Self {
        self.pages = pages;
        self
    }

    /// Script the describe response for one instance.
    #[must_use]
    pub fn with_describe(mut self, id: &str, script: DescribeScript) -> Self {
        self.describes.insert(InstanceId::from(id), script);
        self
    }

    /// Script successful describe responses for many instances.
    #[must_use]
    pub fn with_attributes(
        mut self,
        entries: impl IntoIterator<Item = (&'static str, InstanceAttributes)>,
    ) -> Self {
        for (id, attributes) in entries {
            self.describes
                .insert(InstanceId::from(id), DescribeScript::Attributes(attributes));
        }
        self
    }

    /// Make stopping `id` fail.
    #[must_use]
    pub fn failing_stop(mut self, id: &str) -> Self {
        self.stop_failures.insert(InstanceId::from(id));
        self
    }

    /// Make stopping `id` never answer.
    #[must_use]
    pub fn hanging_stop(mut self, id: &str) -> Self {
        self.stop_hangs.insert(InstanceId::from(id));
        self
    }

    /// Make the batch delete fail.
    #[must_use]
    pub const fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    /// Make the batch delete never answer.
    #[must_use]
    pub const fn hanging_delete(mut self) -> Self {
        self.hang_delete = true;
        self
    }

    /// Delay every describe call by `delay`.
    #[must_use]
    pub const fn with_describe_delay(mut self, delay: Duration) -> Self {
        self.describe_delay = Some(delay);
        self
    }

    /// Highest number of describe calls observed in flight at once.
    #[must_use]
    pub fn peak_describes_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn api_error(operation: &'static str, code: &'static str) -> ProviderError {
        ProviderError::Api {
            operation,
            code: code.to_string(),
            message: format!("scripted {code}"),
            request_id: None,
        }
    }
}

#[async_trait]
impl CloudProvider for FakeProvider {
    async fn list_instances(
        &self,
        scope: &str,
        page_size: u32,
        page_number: u32,
    ) -> ProviderResult<Vec<Candidate>> {
        self.log.record(Call::ListInstances {
            scope: scope.to_string(),
            page_size,
            page_number,
        });
        let index = usize::try_from(page_number.saturating_sub(1)).unwrap_or(usize::MAX);
        match self.pages.get(index) {
            Some(PageScript::Items(items)) => Ok(items.clone()),
            Some(PageScript::Fail(code)) => Err(Self::api_error("DescribeInstances", code)),
            None => Ok(Vec::new()),
        }
    }

    async fn describe_instance(&self, id: &InstanceId) -> ProviderResult<InstanceAttributes> {
        self.log.record(Call::Describe(id.clone()));
        let _in_flight = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        if let Some(delay) = self.describe_delay {
            tokio::time::sleep(delay).await;
        }
        match self.describes.get(id) {
            Some(DescribeScript::Attributes(attributes)) => Ok(attributes.clone()),
            Some(DescribeScript::Fail(code)) => {
                Err(Self::api_error("DescribeInstanceAttribute", code))
            }
            Some(DescribeScript::Hang) => std::future::pending().await,
            Some(DescribeScript::Panic) => panic!("scripted describe panic for {id}"),
            None => Err(Self::api_error(
                "DescribeInstanceAttribute",
                "InvalidInstanceId.NotFound",
            )),
        }
    }

    async fn stop_instance(&self, id: &InstanceId, dry_run: bool) -> ProviderResult<()> {
        self.log.record(Call::Stop {
            id: id.clone(),
            dry_run,
        });
        if self.stop_hangs.contains(id) {
            return std::future::pending().await;
        }
        if self.stop_failures.contains(id) {
            return Err(Self::api_error("StopInstance", "IncorrectInstanceStatus"));
        }
        Ok(())
    }

    async fn delete_instances(
        &self,
        ids: &[InstanceId],
        client_token: &str,
        dry_run: bool,
    ) -> ProviderResult<()> {
        self.log.record(Call::Delete {
            ids: ids.to_vec(),
            client_token: client_token.to_string(),
            dry_run,
        });
        if self.hang_delete {
            return std::future::pending().await;
        }
        if self.fail_delete {
            return Err(Self::api_error("DeleteInstances", "Forbidden.RAM"));
        }
        Ok(())
    }
}

/// Counts a describe call as in flight until dropped, including on cancellation.
struct InFlight<'a> {
    current: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(current: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { current }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RemoverScript {
    #[default]
    Succeed,
    Fail,
    Hang,
}

/// [`ClusterRemover`] that records its input and then succeeds, fails, or hangs.
#[derive(Debug, Default)]
pub struct RecordingRemover {
    log: CallLog,
    script: RemoverScript,
}

impl RecordingRemover {
    /// Remover recording into `log` and succeeding.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            script: RemoverScript::Succeed,
        }
    }

    /// Remover recording into `log` and failing with a non-zero exit.
    #[must_use]
    pub fn failing(log: CallLog) -> Self {
        Self {
            log,
            script: RemoverScript::Fail,
        }
    }

    /// Remover recording into `log` and never finishing.
    #[must_use]
    pub fn hanging(log: CallLog) -> Self {
        Self {
            log,
            script: RemoverScript::Hang,
        }
    }
}

#[async_trait]
impl ClusterRemover for RecordingRemover {
    async fn remove_nodes(&self, nodes: &[NodeRef]) -> Result<(), RemovalError> {
        self.log.record(Call::RemoveNodes(nodes.to_vec()));
        match self.script {
            RemoverScript::Succeed => Ok(()),
            RemoverScript::Fail => Err(RemovalError::Exit {
                program: "remove-nodes".to_string(),
                code: Some(1),
                stderr: "scripted failure".to_string(),
            }),
            RemoverScript::Hang => std::future::pending().await,
        }
    }
}
