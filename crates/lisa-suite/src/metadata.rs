//! Suite and case descriptors.
//!
//! A case owns only what it overrides. Everything else (classification, tags,
//! default requirement) is read from its owning suite through the accessors
//! below; nothing is copied at registration time.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::requirement::{default_requirement, DEFAULT_REQUIREMENT};
use crate::{CaseResult, NoHooks, TestCaseRequirement, TestContext, TestSuite};

pub const DEFAULT_PRIORITY: u32 = 2;

pub type CaseBody = Arc<dyn Fn(&TestContext<'_>) -> CaseResult + Send + Sync>;
pub type SuiteFactory = Arc<dyn Fn() -> Box<dyn TestSuite> + Send + Sync>;

pub struct SuiteMetadata {
    name: String,
    area: String,
    category: String,
    description: String,
    tags: Vec<String>,
    requirement: Arc<TestCaseRequirement>,
    factory: SuiteFactory,
}

impl SuiteMetadata {
    /// A suite without lifecycle hooks.
    pub fn new(
        name: impl Into<String>,
        area: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            area: area.into(),
            category: category.into(),
            description: description.into(),
            tags: Vec::new(),
            requirement: default_requirement(),
            factory: Arc::new(|| Box::new(NoHooks) as Box<dyn TestSuite>),
        }
    }

    /// A suite whose hooks come from `S`. The name defaults to the type's name.
    pub fn for_suite<S>(
        area: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self
    where
        S: TestSuite + Default + 'static,
    {
        let mut out = Self::new(short_type_name::<S>(), area, category, description);
        out.factory = Arc::new(|| Box::new(S::default()) as Box<dyn TestSuite>);
        out
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_requirement(mut self, requirement: TestCaseRequirement) -> Self {
        self.requirement = Arc::new(requirement);
        self
    }

    pub fn with_factory(mut self, factory: SuiteFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn requirement(&self) -> &Arc<TestCaseRequirement> {
        &self.requirement
    }

    /// Fresh hook object for one suite run.
    pub fn create_suite(&self) -> Box<dyn TestSuite> {
        (self.factory)()
    }
}

impl fmt::Debug for SuiteMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteMetadata")
            .field("name", &self.name)
            .field("area", &self.area)
            .field("category", &self.category)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

pub struct CaseMetadata {
    suite_name: String,
    name: String,
    full_name: String,
    priority: u32,
    description: String,
    requirement: Option<Arc<TestCaseRequirement>>,
    body: CaseBody,
    suite: OnceCell<Arc<SuiteMetadata>>,
}

impl CaseMetadata {
    pub fn new<F>(
        suite_name: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        body: F,
    ) -> Self
    where
        F: Fn(&TestContext<'_>) -> CaseResult + Send + Sync + 'static,
    {
        let suite_name = suite_name.into();
        let name = name.into();
        Self {
            full_name: format!("{suite_name}.{name}"),
            suite_name,
            name,
            priority: DEFAULT_PRIORITY,
            description: description.into(),
            requirement: None,
            body: Arc::new(body),
            suite: OnceCell::new(),
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_requirement(mut self, requirement: TestCaseRequirement) -> Self {
        self.requirement = Some(Arc::new(requirement));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn body(&self) -> &CaseBody {
        &self.body
    }

    /// Owning suite, once the registry has paired them.
    pub fn suite(&self) -> Option<&Arc<SuiteMetadata>> {
        self.suite.get()
    }

    pub fn has_own_requirement(&self) -> bool {
        self.requirement.is_some()
    }

    pub fn requirement(&self) -> &Arc<TestCaseRequirement> {
        if let Some(own) = &self.requirement {
            return own;
        }
        match self.suite() {
            Some(suite) => suite.requirement(),
            None => &*DEFAULT_REQUIREMENT,
        }
    }

    pub fn area(&self) -> &str {
        self.suite().map(|s| s.area()).unwrap_or_default()
    }

    pub fn category(&self) -> &str {
        self.suite().map(|s| s.category()).unwrap_or_default()
    }

    pub fn tags(&self) -> &[String] {
        self.suite().map(|s| s.tags()).unwrap_or_default()
    }

    pub(crate) fn attach(&self, suite: Arc<SuiteMetadata>) {
        let _ = self.suite.set(suite);
    }
}

impl fmt::Debug for CaseMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseMetadata")
            .field("full_name", &self.full_name)
            .field("priority", &self.priority)
            .field("attached", &self.suite.get().is_some())
            .finish_non_exhaustive()
    }
}

/// Per-selection knobs layered on top of a case descriptor.
#[derive(Debug, Clone)]
pub struct CaseRuntimeData {
    pub metadata: Arc<CaseMetadata>,
    pub select_action: String,
    pub times: u32,
    pub retry: u32,
    pub use_new_environment: bool,
    pub ignore_failure: bool,
    pub environment_name: String,
}

impl CaseRuntimeData {
    pub fn new(metadata: Arc<CaseMetadata>) -> Self {
        Self {
            metadata,
            select_action: String::new(),
            times: 1,
            retry: 0,
            use_new_environment: false,
            ignore_failure: false,
            environment_name: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    pub fn full_name(&self) -> &str {
        self.metadata.full_name()
    }
}

fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct HelloWorld;

    impl TestSuite for HelloWorld {}

    #[test]
    fn suite_name_defaults_to_type_name() {
        let s = SuiteMetadata::for_suite::<HelloWorld>("demo", "functional", "example");
        assert_eq!(s.name(), "HelloWorld");
        let s = s.with_name("hello_world");
        assert_eq!(s.name(), "hello_world");
    }

    #[test]
    fn detached_case_reads_defaults() {
        let case = CaseMetadata::new("HelloWorld", "hello", "say hello", |_| Ok(()));
        assert_eq!(case.full_name(), "HelloWorld.hello");
        assert_eq!(case.priority(), DEFAULT_PRIORITY);
        assert!(case.suite().is_none());
        assert_eq!(case.area(), "");
        assert!(case.tags().is_empty());
        assert_eq!(**case.requirement(), TestCaseRequirement::default());
    }

    #[test]
    fn attached_case_delegates_to_suite() {
        let suite = Arc::new(
            SuiteMetadata::new("Net", "network", "functional", "nic checks").with_tags(["nic"]),
        );
        let case = CaseMetadata::new("Net", "ping", "ping gateway", |_| Ok(())).with_priority(0);
        case.attach(Arc::clone(&suite));

        assert_eq!(case.area(), "network");
        assert_eq!(case.category(), "functional");
        assert_eq!(case.tags(), ["nic".to_string()]);
        assert_eq!(case.priority(), 0);
        assert!(Arc::ptr_eq(case.requirement(), suite.requirement()));
    }

    #[test]
    fn runtime_data_defaults() {
        let case = Arc::new(CaseMetadata::new("S", "c", "", |_| Ok(())));
        let rt = CaseRuntimeData::new(case);
        assert_eq!(rt.times, 1);
        assert_eq!(rt.retry, 0);
        assert!(!rt.ignore_failure);
        assert_eq!(rt.full_name(), "S.c");
        let cloned = rt.clone();
        assert!(Arc::ptr_eq(&cloned.metadata, &rt.metadata));
    }
}
