//! Load-time registry of suites and cases.
//!
//! Registration happens on a mutable [`Registry`]; `freeze` turns it into a
//! read-only [`FrozenRegistry`] that may be installed once per process.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::{CaseMetadata, RegistryError, SuiteMetadata};

static GLOBAL: OnceCell<FrozenRegistry> = OnceCell::new();

#[derive(Debug, Default)]
pub struct Registry {
    suites: Vec<Arc<SuiteMetadata>>,
    suite_index: BTreeMap<String, usize>,
    cases: Vec<Arc<CaseMetadata>>,
    case_index: BTreeMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_suite(
        &mut self,
        suite: SuiteMetadata,
    ) -> Result<Arc<SuiteMetadata>, RegistryError> {
        if suite.name().is_empty() {
            return Err(RegistryError::EmptySuiteName);
        }
        if self.suite_index.contains_key(suite.name()) {
            return Err(RegistryError::DuplicateSuite {
                name: suite.name().to_string(),
            });
        }

        let suite = Arc::new(suite);
        self.suite_index
            .insert(suite.name().to_string(), self.suites.len());
        self.suites.push(Arc::clone(&suite));

        let mut names = Vec::new();
        for case in &self.cases {
            if case.suite().is_none() && case.suite_name() == suite.name() {
                case.attach(Arc::clone(&suite));
            }
            if case.suite().is_some_and(|s| Arc::ptr_eq(s, &suite)) {
                names.push(case.name());
            }
        }
        info!(
            "registered test suite '{}' cases: [{}]",
            suite.name(),
            names.join(", ")
        );
        Ok(suite)
    }

    pub fn register_case(
        &mut self,
        case: CaseMetadata,
    ) -> Result<Arc<CaseMetadata>, RegistryError> {
        if self.case_index.contains_key(case.full_name()) {
            return Err(RegistryError::DuplicateCase {
                full_name: case.full_name().to_string(),
            });
        }

        let case = Arc::new(case);
        if let Some(&idx) = self.suite_index.get(case.suite_name()) {
            case.attach(Arc::clone(&self.suites[idx]));
            debug!("attached test case '{}'", case.full_name());
        }
        self.case_index
            .insert(case.full_name().to_string(), self.cases.len());
        self.cases.push(Arc::clone(&case));
        Ok(case)
    }

    pub fn suites(&self) -> &[Arc<SuiteMetadata>] {
        &self.suites
    }

    pub fn cases(&self) -> &[Arc<CaseMetadata>] {
        &self.cases
    }

    pub fn freeze(self) -> Result<FrozenRegistry, RegistryError> {
        if let Some(orphan) = self.cases.iter().find(|c| c.suite().is_none()) {
            return Err(RegistryError::OrphanCase {
                full_name: orphan.full_name().to_string(),
            });
        }
        Ok(FrozenRegistry {
            inner: Arc::new(self),
        })
    }
}

/// Read-only registry shared by everything that runs cases.
#[derive(Debug, Clone)]
pub struct FrozenRegistry {
    inner: Arc<Registry>,
}

impl FrozenRegistry {
    pub fn suites(&self) -> &[Arc<SuiteMetadata>] {
        self.inner.suites()
    }

    pub fn cases(&self) -> &[Arc<CaseMetadata>] {
        self.inner.cases()
    }

    pub fn suite(&self, name: &str) -> Option<&Arc<SuiteMetadata>> {
        let idx = *self.inner.suite_index.get(name)?;
        self.inner.suites.get(idx)
    }

    pub fn case(&self, full_name: &str) -> Option<&Arc<CaseMetadata>> {
        let idx = *self.inner.case_index.get(full_name)?;
        self.inner.cases.get(idx)
    }

    /// Cases of `suite_name` in declaration order.
    pub fn cases_of<'a>(
        &'a self,
        suite_name: &'a str,
    ) -> impl Iterator<Item = &'a Arc<CaseMetadata>> + 'a {
        self.inner
            .cases
            .iter()
            .filter(move |c| c.suite_name() == suite_name)
    }
}

/// Publishes `registry` for the rest of the process.
pub fn install(registry: FrozenRegistry) -> Result<&'static FrozenRegistry, RegistryError> {
    let mut installed = false;
    let out = GLOBAL.get_or_init(|| {
        installed = true;
        registry
    });
    if installed {
        Ok(out)
    } else {
        Err(RegistryError::AlreadyInstalled)
    }
}

pub fn global() -> Option<&'static FrozenRegistry> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(suite: &str, name: &str) -> CaseMetadata {
        CaseMetadata::new(suite, name, "", |_| Ok(()))
    }

    #[test]
    fn orphan_cases_are_claimed_by_suite_name() {
        let mut reg = Registry::new();
        reg.register_case(case("Net", "ping")).unwrap();
        reg.register_case(case("Netdev", "up")).unwrap();
        assert!(reg.cases()[0].suite().is_none());

        reg.register_suite(SuiteMetadata::new("Net", "network", "functional", ""))
            .unwrap();
        assert_eq!(reg.cases()[0].area(), "network");
        assert!(reg.cases()[1].suite().is_none());

        let err = reg.freeze().unwrap_err();
        assert_eq!(
            err,
            RegistryError::OrphanCase {
                full_name: "Netdev.up".to_string()
            }
        );
    }

    #[test]
    fn dotted_suite_names_do_not_claim_nested_cases() {
        let mut reg = Registry::new();
        reg.register_case(case("Net.sub", "x")).unwrap();
        reg.register_suite(SuiteMetadata::new("Net", "outer", "functional", ""))
            .unwrap();
        assert!(reg.cases()[0].suite().is_none());

        reg.register_suite(SuiteMetadata::new("Net.sub", "inner", "functional", ""))
            .unwrap();
        let frozen = reg.freeze().unwrap();
        let x = frozen.case("Net.sub.x").unwrap();
        assert_eq!(x.suite().map(|s| s.name()), Some("Net.sub"));
        assert_eq!(x.area(), "inner");
        let names: Vec<&str> = frozen.cases_of("Net.sub").map(|c| c.full_name()).collect();
        assert_eq!(names, ["Net.sub.x"]);
        assert_eq!(frozen.cases_of("Net").count(), 0);
    }

    #[test]
    fn empty_suite_name_is_rejected() {
        let mut reg = Registry::new();
        let err = reg
            .register_suite(SuiteMetadata::new("", "a", "c", ""))
            .unwrap_err();
        assert_eq!(err, RegistryError::EmptySuiteName);
        assert!(reg.suites().is_empty());
    }

    #[test]
    fn frozen_lookup_preserves_order() {
        let mut reg = Registry::new();
        reg.register_suite(SuiteMetadata::new("S", "a", "c", ""))
            .unwrap();
        reg.register_case(case("S", "b")).unwrap();
        reg.register_case(case("S", "a")).unwrap();
        let frozen = reg.freeze().unwrap();

        let names: Vec<&str> = frozen.cases_of("S").map(|c| c.name()).collect();
        assert_eq!(names, ["b", "a"]);
        assert!(frozen.case("S.a").is_some());
        assert!(frozen.case("S.z").is_none());
        assert!(frozen.suite("S").is_some());
    }
}
