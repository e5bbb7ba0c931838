//! Environment probing
//!
//! Detects the external tools the bootstrap depends on and whether the
//! network is reachable. Probing never fails: a missing tool is a normal
//! answer, not an error.

use crate::config::schema::ToolsConfig;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// What the host provides for this run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ToolAvailability {
    pub git_present: bool,
    pub package_manager_present: bool,
    pub internet_reachable: bool,
}

/// Host queries used by the prober
#[async_trait]
pub trait Environment: Send + Sync {
    /// Whether `name` resolves to an executable
    fn has_tool(&self, name: &str) -> bool;

    /// Whether `probe_url` answers within `timeout`
    async fn internet_reachable(&self, probe_url: &str, timeout: Duration) -> bool;
}

/// The real host: `PATH` lookup and an HTTP HEAD request
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

#[async_trait]
impl Environment for SystemEnvironment {
    fn has_tool(&self, name: &str) -> bool {
        which::which(name).is_ok()
    }

    async fn internet_reachable(&self, probe_url: &str, timeout: Duration) -> bool {
        let url = probe_url.to_string();
        let result = tokio::task::spawn_blocking(move || {
            let agent: ureq::Agent = ureq::Agent::config_builder()
                .timeout_global(Some(timeout))
                .build()
                .into();
            agent.head(url.as_str()).call()
        })
        .await;

        match result {
            Ok(Ok(_)) => true,
            // Any HTTP status means the request went through
            Ok(Err(ureq::Error::StatusCode(_))) => true,
            Ok(Err(e)) => {
                debug!("Network probe to {} failed: {}", probe_url, e);
                false
            }
            Err(e) => {
                debug!("Network probe task failed: {}", e);
                false
            }
        }
    }
}

/// Check for git, the package manager and network access
pub async fn probe(env: &dyn Environment, tools: &ToolsConfig) -> ToolAvailability {
    let availability = ToolAvailability {
        git_present: env.has_tool(&tools.git),
        package_manager_present: env.has_tool(&tools.package_manager),
        internet_reachable: env
            .internet_reachable(
                &tools.probe_url,
                Duration::from_secs(tools.probe_timeout_secs),
            )
            .await,
    };

    debug!("Probed environment: {:?}", availability);
    availability
}
