use std::sync::Arc;

use lisa_search_space::{
    create_set_space, EnvironmentSpace, EnvironmentStatus, IntRange, NodeSpace, OsType,
    SetMatch, SetSpace,
};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::RequirementError;

pub(crate) static DEFAULT_REQUIREMENT: Lazy<Arc<TestCaseRequirement>> =
    Lazy::new(|| Arc::new(TestCaseRequirement::default()));

/// Shared requirement used by suites that don't declare one.
pub fn default_requirement() -> Arc<TestCaseRequirement> {
    Arc::clone(&DEFAULT_REQUIREMENT)
}

/// Capability predicate a candidate environment must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCaseRequirement {
    environment: EnvironmentSpace,
    environment_status: EnvironmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    platform_type: Option<SetSpace<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    os_type: Option<SetSpace<OsType>>,
}

impl Default for TestCaseRequirement {
    fn default() -> Self {
        Self {
            environment: EnvironmentSpace {
                nodes: vec![NodeSpace::default()],
            },
            environment_status: EnvironmentStatus::Connected,
            platform_type: None,
            os_type: None,
        }
    }
}

impl TestCaseRequirement {
    pub fn new(
        environment: EnvironmentSpace,
        environment_status: EnvironmentStatus,
        platform_type: Option<SetSpace<String>>,
        os_type: Option<SetSpace<OsType>>,
    ) -> Result<Self, RequirementError> {
        if environment_status == EnvironmentStatus::Deployed && os_type.is_some() {
            return Err(RequirementError::OsTypeNeedsConnected);
        }
        Ok(Self {
            environment,
            environment_status,
            platform_type,
            os_type,
        })
    }

    pub fn environment(&self) -> &EnvironmentSpace {
        &self.environment
    }

    pub fn environment_status(&self) -> EnvironmentStatus {
        self.environment_status
    }

    pub fn platform_type(&self) -> Option<&SetSpace<String>> {
        self.platform_type.as_ref()
    }

    pub fn os_type(&self) -> Option<&SetSpace<OsType>> {
        self.os_type.as_ref()
    }
}

/// Builder covering the requirements most cases need.
#[derive(Debug, Clone)]
pub struct SimpleRequirement {
    min_count: u32,
    min_nic_count: u32,
    node: NodeSpace,
    supported_platform_type: Vec<String>,
    unsupported_platform_type: Vec<String>,
    supported_os: Vec<OsType>,
    unsupported_os: Vec<OsType>,
    supported_features: Vec<String>,
    unsupported_features: Vec<String>,
    environment_status: EnvironmentStatus,
}

impl Default for SimpleRequirement {
    fn default() -> Self {
        Self {
            min_count: 1,
            min_nic_count: 1,
            node: NodeSpace::default(),
            supported_platform_type: Vec::new(),
            unsupported_platform_type: Vec::new(),
            supported_os: Vec::new(),
            unsupported_os: Vec::new(),
            supported_features: Vec::new(),
            unsupported_features: Vec::new(),
            environment_status: EnvironmentStatus::Connected,
        }
    }
}

impl SimpleRequirement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_count(mut self, min_count: u32) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn min_nic_count(mut self, min_nic_count: u32) -> Self {
        self.min_nic_count = min_nic_count;
        self
    }

    /// Starts from a custom node shape; counts and features set on the builder
    /// still override it.
    pub fn node(mut self, node: NodeSpace) -> Self {
        self.node = node;
        self
    }

    pub fn supported_platform_type<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_platform_type = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn unsupported_platform_type<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unsupported_platform_type = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn supported_os(mut self, items: impl IntoIterator<Item = OsType>) -> Self {
        self.supported_os = items.into_iter().collect();
        self
    }

    pub fn unsupported_os(mut self, items: impl IntoIterator<Item = OsType>) -> Self {
        self.unsupported_os = items.into_iter().collect();
        self
    }

    pub fn supported_features<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_features = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn unsupported_features<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unsupported_features = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn environment_status(mut self, status: EnvironmentStatus) -> Self {
        self.environment_status = status;
        self
    }

    pub fn build(self) -> Result<TestCaseRequirement, RequirementError> {
        let mut node = self.node;
        node.node_count = IntRange::at_least(self.min_count);
        node.nic_count = IntRange::at_least(self.min_nic_count);
        if !self.supported_features.is_empty() {
            node.features = Some(SetSpace::allow(self.supported_features, SetMatch::All));
        }
        if !self.unsupported_features.is_empty() {
            node.excluded_features = Some(SetSpace::deny(self.unsupported_features));
        }

        let platform_type = create_set_space(
            &self.supported_platform_type,
            &self.unsupported_platform_type,
            "platform type",
        )?;
        let os_type = create_set_space(
            &self.supported_os,
            &self.unsupported_os,
            "operating system",
        )?;

        TestCaseRequirement::new(
            EnvironmentSpace { nodes: vec![node] },
            self.environment_status,
            platform_type,
            os_type,
        )
    }
}
