use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::{IntRange, ResultReason, SetSpace};

/// Lifecycle state of an environment. Later states imply the earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentStatus {
    #[default]
    New,
    Prepared,
    Deployed,
    Connected,
    Deleted,
}

impl EnvironmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EnvironmentStatus::New => "new",
            EnvironmentStatus::Prepared => "prepared",
            EnvironmentStatus::Deployed => "deployed",
            EnvironmentStatus::Connected => "connected",
            EnvironmentStatus::Deleted => "deleted",
        }
    }

    /// True if an environment in this state meets a requirement for `required`.
    pub fn satisfies(self, required: EnvironmentStatus) -> bool {
        self != EnvironmentStatus::Deleted && self >= required
    }
}

impl fmt::Display for EnvironmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct EnvironmentStatusParseError {
    value: String,
}

impl fmt::Display for EnvironmentStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid environment status {:?} (expected one of: new, prepared, deployed, connected, deleted)",
            self.value
        )
    }
}

impl std::error::Error for EnvironmentStatusParseError {}

impl FromStr for EnvironmentStatus {
    type Err = EnvironmentStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "new" => Ok(EnvironmentStatus::New),
            "prepared" => Ok(EnvironmentStatus::Prepared),
            "deployed" => Ok(EnvironmentStatus::Deployed),
            "connected" => Ok(EnvironmentStatus::Connected),
            "deleted" => Ok(EnvironmentStatus::Deleted),
            _ => Err(EnvironmentStatusParseError { value: s }),
        }
    }
}

#[cfg(feature = "clap")]
impl clap::ValueEnum for EnvironmentStatus {
    fn value_variants<'a>() -> &'a [Self] {
        const ALL: [EnvironmentStatus; 5] = [
            EnvironmentStatus::New,
            EnvironmentStatus::Prepared,
            EnvironmentStatus::Deployed,
            EnvironmentStatus::Connected,
            EnvironmentStatus::Deleted,
        ];
        &ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// What a single node must offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSpace {
    /// How many nodes of this shape the environment needs.
    pub node_count: IntRange,
    pub nic_count: IntRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<SetSpace<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_features: Option<SetSpace<String>>,
}

impl Default for NodeSpace {
    fn default() -> Self {
        Self {
            node_count: IntRange::at_least(1),
            nic_count: IntRange::at_least(1),
            features: None,
            excluded_features: None,
        }
    }
}

impl NodeSpace {
    pub fn check(&self, capability: &NodeCapability) -> ResultReason {
        let mut out = ResultReason::ok();
        out.merge(self.nic_count.check(capability.nic_count), "nic_count");
        if let Some(features) = &self.features {
            out.merge(features.check(capability.features.iter()), "features");
        }
        if let Some(excluded) = &self.excluded_features {
            out.merge(excluded.check(capability.features.iter()), "features");
        }
        out
    }
}

/// What a single node actually offers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NodeCapability {
    pub name: String,
    pub nic_count: u32,
    pub features: BTreeSet<String>,
}

impl NodeCapability {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nic_count: 1,
            features: BTreeSet::new(),
        }
    }

    pub fn with_nic_count(mut self, nic_count: u32) -> Self {
        self.nic_count = nic_count;
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EnvironmentSpace {
    pub nodes: Vec<NodeSpace>,
}

impl EnvironmentSpace {
    /// Each node requirement must be met by at least `node_count` capability nodes.
    pub fn check(&self, capability: &EnvironmentCapability) -> ResultReason {
        let mut out = ResultReason::ok();
        for (idx, requirement) in self.nodes.iter().enumerate() {
            let mut matched: u32 = 0;
            let mut mismatches = ResultReason::ok();
            for node in &capability.nodes {
                let r = requirement.check(node);
                if r.result {
                    matched += 1;
                } else {
                    mismatches.merge(r, &node.name);
                }
            }
            let count = requirement.node_count.check(matched);
            if !count.result {
                out.merge(count, &format!("nodes[{idx}].node_count"));
                out.merge(mismatches, &format!("nodes[{idx}]"));
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EnvironmentCapability {
    pub nodes: Vec<NodeCapability>,
}
