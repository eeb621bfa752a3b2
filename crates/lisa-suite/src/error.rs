use std::fmt;

use lisa_search_space::SpaceError;

/// Configuration errors raised while the registry is being populated.
///
/// These are fatal: a process must not continue with an inconsistent registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    EmptySuiteName,
    DuplicateSuite { name: String },
    DuplicateCase { full_name: String },
    OrphanCase { full_name: String },
    AlreadyInstalled,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::EmptySuiteName => f.write_str("test suite name is empty"),
            RegistryError::DuplicateSuite { name } => {
                write!(f, "duplicate test suite name: {name}")
            }
            RegistryError::DuplicateCase { full_name } => {
                write!(f, "duplicate test case name: {full_name}")
            }
            RegistryError::OrphanCase { full_name } => {
                write!(f, "test case {full_name} has no registered test suite")
            }
            RegistryError::AlreadyInstalled => {
                f.write_str("a test registry is already installed for this process")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementError {
    /// OS type is only observable once an environment is connected.
    OsTypeNeedsConnected,
    Space(SpaceError),
}

impl fmt::Display for RequirementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementError::OsTypeNeedsConnected => {
                f.write_str("requirement doesn't support os_type, when status is deployed")
            }
            RequirementError::Space(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RequirementError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequirementError::OsTypeNeedsConnected => None,
            RequirementError::Space(err) => Some(err),
        }
    }
}

impl From<SpaceError> for RequirementError {
    fn from(err: SpaceError) -> Self {
        RequirementError::Space(err)
    }
}
