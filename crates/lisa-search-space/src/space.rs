use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::ResultReason;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    BothIncludedAndExcluded { name: &'static str },
    EmptyRange { min: u32, max: u32 },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpaceError::BothIncludedAndExcluded { name } => {
                write!(f, "cannot set both supported and unsupported {name}")
            }
            SpaceError::EmptyRange { min, max } => {
                write!(f, "invalid range: min {min} is greater than max {max}")
            }
        }
    }
}

impl std::error::Error for SpaceError {}

/// Inclusive count range, open-ended when `max` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntRange {
    pub min: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl Default for IntRange {
    fn default() -> Self {
        Self::at_least(1)
    }
}

impl IntRange {
    pub fn at_least(min: u32) -> Self {
        Self { min, max: None }
    }

    pub fn exactly(value: u32) -> Self {
        Self {
            min: value,
            max: Some(value),
        }
    }

    pub fn between(min: u32, max: u32) -> Result<Self, SpaceError> {
        if min > max {
            return Err(SpaceError::EmptyRange { min, max });
        }
        Ok(Self {
            min,
            max: Some(max),
        })
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && !self.max.is_some_and(|max| value > max)
    }

    pub fn check(&self, value: u32) -> ResultReason {
        if self.contains(value) {
            ResultReason::ok()
        } else {
            ResultReason::failed(format!("{value} is not in range {self}"))
        }
    }
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}, {max}]", self.min),
            None => write!(f, "[{}, inf)", self.min),
        }
    }
}

/// How an allow-set is matched against candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetMatch {
    /// Every item of the requirement must be offered (features).
    All,
    /// At least one candidate must be listed (OS type, platform type).
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetSpace<T: Ord> {
    is_allow_set: bool,
    matching: SetMatch,
    items: BTreeSet<T>,
}

impl<T: Ord + Clone + fmt::Display> SetSpace<T> {
    pub fn allow(items: impl IntoIterator<Item = T>, matching: SetMatch) -> Self {
        Self {
            is_allow_set: true,
            matching,
            items: items.into_iter().collect(),
        }
    }

    pub fn deny(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            is_allow_set: false,
            matching: SetMatch::Any,
            items: items.into_iter().collect(),
        }
    }

    pub fn is_allow_set(&self) -> bool {
        self.is_allow_set
    }

    pub fn matching(&self) -> SetMatch {
        self.matching
    }

    pub fn items(&self) -> &BTreeSet<T> {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Checks the candidate items offered by a capability against this set.
    ///
    /// An empty set accepts everything.
    pub fn check<'a>(&self, candidates: impl IntoIterator<Item = &'a T>) -> ResultReason
    where
        T: 'a,
    {
        if self.items.is_empty() {
            return ResultReason::ok();
        }
        let candidates: BTreeSet<&T> = candidates.into_iter().collect();

        if !self.is_allow_set {
            let excluded: Vec<String> = candidates
                .iter()
                .filter(|c| self.items.contains(**c))
                .map(|c| c.to_string())
                .collect();
            if excluded.is_empty() {
                return ResultReason::ok();
            }
            return ResultReason::failed(format!(
                "requirement excludes [{}]",
                excluded.join(", ")
            ));
        }

        match self.matching {
            SetMatch::All => {
                let missing: Vec<String> = self
                    .items
                    .iter()
                    .filter(|item| !candidates.contains(item))
                    .map(ToString::to_string)
                    .collect();
                if missing.is_empty() {
                    ResultReason::ok()
                } else {
                    ResultReason::failed(format!(
                        "capability doesn't support [{}]",
                        missing.join(", ")
                    ))
                }
            }
            SetMatch::Any => {
                if candidates.iter().any(|c| self.items.contains(*c)) {
                    ResultReason::ok()
                } else {
                    ResultReason::failed(format!(
                        "capability [{}] matches none of [{}]",
                        join_display(candidates.iter().copied()),
                        join_display(self.items.iter())
                    ))
                }
            }
        }
    }
}

impl<T: Ord + fmt::Display> fmt::Display for SetSpace<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_allow_set { "allow" } else { "deny" };
        let items: Vec<String> = self.items.iter().map(ToString::to_string).collect();
        write!(f, "{kind}[{}]", items.join(", "))
    }
}

fn join_display<'a, T: fmt::Display + 'a>(items: impl Iterator<Item = &'a T>) -> String {
    items.map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Builds a set predicate from a supported list and an unsupported list.
///
/// At most one side may be non-empty; an empty pair means "no constraint".
pub fn create_set_space<T: Ord + Clone + fmt::Display>(
    supported: &[T],
    unsupported: &[T],
    name: &'static str,
) -> Result<Option<SetSpace<T>>, SpaceError> {
    match (supported.is_empty(), unsupported.is_empty()) {
        (true, true) => Ok(None),
        (false, true) => Ok(Some(SetSpace::allow(
            supported.iter().cloned(),
            SetMatch::Any,
        ))),
        (true, false) => Ok(Some(SetSpace::deny(unsupported.iter().cloned()))),
        (false, false) => Err(SpaceError::BothIncludedAndExcluded { name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn int_range_bounds() {
        let r = IntRange::at_least(2);
        assert!(!r.contains(1));
        assert!(r.contains(2));
        assert!(r.contains(200));

        let r = IntRange::between(1, 1).unwrap();
        assert!(r.contains(1));
        assert!(!r.contains(2));
        assert_eq!(r, IntRange::exactly(1));
        assert!(!r.check(3).result);

        assert_eq!(
            IntRange::between(3, 1),
            Err(SpaceError::EmptyRange { min: 3, max: 1 })
        );
    }

    #[test]
    fn allow_all_needs_every_item() {
        let req = SetSpace::allow(names(&["gpu", "sriov"]), SetMatch::All);
        let offered = names(&["gpu", "sriov", "serial_console"]);
        assert!(req.check(offered.iter()).result);

        let offered = names(&["gpu"]);
        let r = req.check(offered.iter());
        assert!(!r.result);
        assert!(r.explain().contains("sriov"));
    }

    #[test]
    fn allow_any_needs_one_item() {
        let req = SetSpace::allow(names(&["azure", "ready"]), SetMatch::Any);
        assert!(req.check(names(&["ready"]).iter()).result);
        assert!(!req.check(names(&["qemu"]).iter()).result);
    }

    #[test]
    fn deny_rejects_intersection() {
        let req = SetSpace::deny(names(&["gpu"]));
        assert!(req.check(names(&["sriov"]).iter()).result);
        let r = req.check(names(&["gpu", "sriov"]).iter());
        assert!(!r.result);
        assert_eq!(r.explain(), "requirement excludes [gpu]");
    }

    #[test]
    fn empty_set_accepts_anything() {
        let req: SetSpace<String> = SetSpace::allow(Vec::new(), SetMatch::All);
        assert!(req.check(std::iter::empty()).result);
    }

    #[test]
    fn create_set_space_rejects_both_sides() {
        let a = names(&["azure"]);
        let b = names(&["qemu"]);
        assert_eq!(
            create_set_space(&a, &b, "platform type"),
            Err(SpaceError::BothIncludedAndExcluded {
                name: "platform type"
            })
        );
        assert_eq!(create_set_space::<String>(&[], &[], "platform type"), Ok(None));
        let deny = create_set_space(&[], &b, "platform type").unwrap().unwrap();
        assert!(!deny.is_allow_set());
    }
}
