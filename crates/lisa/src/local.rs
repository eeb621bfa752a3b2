//! The machine the CLI runs on, exposed as a single-node environment.

use std::collections::BTreeMap;
use std::process::Command;

use anyhow::{Context, Result};
use lisa_search_space::{EnvironmentStatus, NodeCapability, OsType};
use lisa_suite::{Environment, ExecResult, Node};
use tracing::debug;

pub struct LocalNode {
    name: String,
    os: OsType,
    nic_count: u32,
}

impl LocalNode {
    pub fn detect(os_override: Option<OsType>) -> Self {
        let os = os_override.unwrap_or_else(detect_os);
        let nic_count = count_nics();
        debug!("local node os={os} nics={nic_count}");
        Self {
            name: "localhost".to_string(),
            os,
            nic_count,
        }
    }
}

impl Node for LocalNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn os(&self) -> Option<OsType> {
        Some(self.os)
    }

    fn capability(&self) -> NodeCapability {
        NodeCapability::new(self.name.clone()).with_nic_count(self.nic_count)
    }

    fn execute(&self, cmd: &str, args: &[&str]) -> Result<ExecResult> {
        debug!("execute on {}: {cmd} {}", self.name, args.join(" "));
        let out = Command::new(cmd)
            .args(args)
            .output()
            .with_context(|| format!("spawn {cmd}"))?;
        Ok(ExecResult {
            exit_code: out.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}

pub struct LocalEnvironment {
    node: LocalNode,
    is_new: bool,
}

impl LocalEnvironment {
    pub fn new(os_override: Option<OsType>) -> Self {
        Self {
            node: LocalNode::detect(os_override),
            is_new: true,
        }
    }
}

impl Environment for LocalEnvironment {
    fn name(&self) -> &str {
        "local"
    }

    fn status(&self) -> EnvironmentStatus {
        EnvironmentStatus::Connected
    }

    fn nodes(&self) -> Vec<&dyn Node> {
        vec![&self.node as &dyn Node]
    }

    fn platform_type(&self) -> &str {
        "local"
    }

    fn is_new(&self) -> bool {
        self.is_new
    }

    fn mark_used(&mut self) {
        self.is_new = false;
    }

    fn information(&self) -> BTreeMap<String, String> {
        let mut info = BTreeMap::new();
        info.insert("environment".to_string(), self.name().to_string());
        info.insert("platform".to_string(), self.platform_type().to_string());
        info.insert("os".to_string(), self.node.os.to_string());
        info
    }
}

fn detect_os() -> OsType {
    if let Ok(text) = std::fs::read_to_string("/etc/os-release") {
        if let Some(os) = detect_from_os_release(&text) {
            return os;
        }
    }
    match std::env::consts::OS {
        "linux" => OsType::Linux,
        "windows" => OsType::Windows,
        "freebsd" => OsType::FreeBsd,
        "openbsd" => OsType::OpenBsd,
        "macos" | "netbsd" | "dragonfly" => OsType::Posix,
        _ => OsType::OperatingSystem,
    }
}

fn detect_from_os_release(text: &str) -> Option<OsType> {
    let mut fields: BTreeMap<&str, &str> = BTreeMap::new();
    for line in text.lines() {
        if let Some((k, v)) = line.split_once('=') {
            fields.insert(k.trim(), v.trim().trim_matches('"'));
        }
    }
    let id = fields.get("ID").copied().unwrap_or_default();
    let name = fields
        .get("NAME")
        .and_then(|n| n.split_whitespace().next())
        .unwrap_or_default();
    OsType::detect(id)
        .or_else(|| OsType::detect(name))
        .or_else(|| (!id.is_empty()).then_some(OsType::Linux))
}

fn count_nics() -> u32 {
    let Ok(entries) = std::fs::read_dir("/sys/class/net") else {
        return 1;
    };
    let n = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name() != "lo")
        .count() as u32;
    n.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_release_prefers_id() {
        let text = "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\n";
        assert_eq!(detect_from_os_release(text), Some(OsType::Ubuntu));

        let text = "NAME=\"Red Hat Enterprise Linux\"\nID=\"rhel\"\n";
        assert_eq!(detect_from_os_release(text), Some(OsType::Redhat));

        let text = "NAME=\"Fedora Linux\"\nID=unknown-fork\n";
        assert_eq!(detect_from_os_release(text), Some(OsType::Fedora));

        let text = "NAME=Mystery\nID=mystery\n";
        assert_eq!(detect_from_os_release(text), Some(OsType::Linux));

        assert_eq!(detect_from_os_release(""), None);
    }

    #[test]
    fn override_wins_and_env_starts_new() {
        let mut env = LocalEnvironment::new(Some(OsType::Windows));
        assert!(env.is_new());
        assert_eq!(env.default_node().and_then(|n| n.os()), Some(OsType::Windows));
        env.mark_used();
        assert!(!env.is_new());
        assert_eq!(env.information()["os"], "windows");
    }
}
