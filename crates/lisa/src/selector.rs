use std::sync::Arc;

use clap::Args;
use lisa_suite::{CaseMetadata, FrozenRegistry};

#[derive(Debug, Clone, Default, Args)]
pub struct SelectArgs {
    /// Substring of `<suite>.<case>`; with `--exact`, the whole full name.
    #[arg(long, value_name = "SUBSTR")]
    pub filter: Option<String>,

    #[arg(long)]
    pub exact: bool,

    /// May be passed multiple times.
    #[arg(long, value_name = "AREA")]
    pub area: Vec<String>,

    #[arg(long, value_name = "CATEGORY")]
    pub category: Vec<String>,

    #[arg(long, value_name = "TAG")]
    pub tag: Vec<String>,

    /// Keep cases whose priority is at most N (0 is most important).
    #[arg(long, value_name = "N")]
    pub priority: Option<u32>,
}

impl SelectArgs {
    pub fn matches(&self, case: &CaseMetadata) -> bool {
        if let Some(filter) = &self.filter {
            let hit = if self.exact {
                case.full_name() == filter
            } else {
                case.full_name().contains(filter.as_str())
            };
            if !hit {
                return false;
            }
        }
        if !self.area.is_empty() && !self.area.iter().any(|a| a == case.area()) {
            return false;
        }
        if !self.category.is_empty() && !self.category.iter().any(|c| c == case.category()) {
            return false;
        }
        if !self.tag.is_empty() && !case.tags().iter().any(|t| self.tag.contains(t)) {
            return false;
        }
        if self.priority.is_some_and(|max| case.priority() > max) {
            return false;
        }
        true
    }
}

/// Matching cases in declaration order.
pub fn select(registry: &FrozenRegistry, args: &SelectArgs) -> Vec<Arc<CaseMetadata>> {
    registry
        .cases()
        .iter()
        .filter(|c| args.matches(c))
        .cloned()
        .collect()
}
