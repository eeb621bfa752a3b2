use std::collections::BTreeMap;

use lisa_search_space::{EnvironmentCapability, EnvironmentStatus, NodeCapability, OsType};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExecResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// One machine inside an environment.
pub trait Node {
    fn name(&self) -> &str;

    /// `None` until the node has been connected and its OS probed.
    fn os(&self) -> Option<OsType>;

    fn capability(&self) -> NodeCapability;

    fn execute(&self, cmd: &str, args: &[&str]) -> anyhow::Result<ExecResult>;
}

/// A provisioned set of nodes a suite runs against.
///
/// The orchestrator borrows an environment exclusively for the duration of one
/// suite run; provisioning and teardown belong to whoever owns it.
pub trait Environment {
    fn name(&self) -> &str;

    fn status(&self) -> EnvironmentStatus;

    fn nodes(&self) -> Vec<&dyn Node>;

    fn default_node(&self) -> Option<&dyn Node> {
        self.nodes().into_iter().next()
    }

    fn capability(&self) -> EnvironmentCapability {
        EnvironmentCapability {
            nodes: self.nodes().iter().map(|n| n.capability()).collect(),
        }
    }

    /// Platform identifier (`"local"`, `"azure"`, ...); empty if unknown.
    fn platform_type(&self) -> &str {
        ""
    }

    /// True until the first suite has run on this environment.
    fn is_new(&self) -> bool;

    fn mark_used(&mut self);

    /// Key/value facts merged into every result message.
    fn information(&self) -> BTreeMap<String, String> {
        let mut info = BTreeMap::new();
        info.insert("environment".to_string(), self.name().to_string());
        if !self.platform_type().is_empty() {
            info.insert("platform".to_string(), self.platform_type().to_string());
        }
        info
    }
}
