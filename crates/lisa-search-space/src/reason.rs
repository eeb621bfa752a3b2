use std::fmt;

use serde::Serialize;

/// Outcome of a requirement check, with the reasons collected along the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultReason {
    pub result: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl Default for ResultReason {
    fn default() -> Self {
        Self::ok()
    }
}

impl ResultReason {
    pub fn ok() -> Self {
        Self {
            result: true,
            reasons: Vec::new(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        let mut out = Self::ok();
        out.add_reason(reason);
        out
    }

    /// Records a mismatch. Any recorded reason turns the result into a failure.
    pub fn add_reason(&mut self, reason: impl Into<String>) {
        self.result = false;
        self.reasons.push(reason.into());
    }

    /// Folds `other` into `self`. Reasons of `other` are prefixed with `label`
    /// when one is given, so merged explanations stay attributable.
    pub fn merge(&mut self, other: ResultReason, label: &str) {
        if !other.result {
            self.result = false;
        }
        for reason in other.reasons {
            if label.is_empty() {
                self.reasons.push(reason);
            } else {
                self.reasons.push(format!("{label}: {reason}"));
            }
        }
    }

    pub fn explain(&self) -> String {
        self.reasons.join("; ")
    }
}

impl fmt::Display for ResultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.result {
            f.write_str("ok")
        } else {
            write!(f, "failed: {}", self.explain())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_reason_marks_failure() {
        let mut r = ResultReason::ok();
        assert!(r.result);
        r.add_reason("no nic");
        assert!(!r.result);
        assert_eq!(r.explain(), "no nic");
    }

    #[test]
    fn merge_prefixes_label_and_keeps_failure() {
        let mut r = ResultReason::ok();
        r.merge(ResultReason::ok(), "os_type");
        assert!(r.result);
        assert!(r.reasons.is_empty());

        r.merge(ResultReason::failed("windows excluded"), "os_type");
        r.merge(ResultReason::failed("second"), "");
        assert!(!r.result);
        assert_eq!(r.reasons, vec!["os_type: windows excluded", "second"]);
        assert_eq!(r.to_string(), "failed: os_type: windows excluded; second");
    }
}
