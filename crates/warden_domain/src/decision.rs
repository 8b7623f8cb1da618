use std::fmt::{Display, Formatter};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::level::SpecificityLevel;

/// The two outcomes a check can produce.
///
/// There is deliberately no "ask the user" middle ground here: ambiguity
/// and failure both collapse to `Deny`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Deny,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Deny => write!(f, "deny"),
        }
    }
}

/// Result of checking a single path.
///
/// `reason` is a complete, self-contained line; deny reasons always begin
/// with `Blocked by` so every adapter can surface them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Decision {
    pub verdict: Verdict,
    pub reason: String,
    /// Source text of the matched pattern, if a catalog entry decided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Level the decision was made at, if any entry or probe fired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<SpecificityLevel>,
}

impl Decision {
    pub fn pass_unmatched() -> Self {
        Self {
            verdict: Verdict::Pass,
            reason: "no matching pattern".to_string(),
            pattern: None,
            level: None,
        }
    }

    pub fn denied_by_pattern(source: &str, description: &str, level: SpecificityLevel) -> Self {
        Self {
            verdict: Verdict::Deny,
            reason: format!("Blocked by pattern {source}: {description}"),
            pattern: Some(source.to_string()),
            level: Some(level),
        }
    }

    pub fn allowed_by_pattern(source: &str, description: &str, level: SpecificityLevel) -> Self {
        Self {
            verdict: Verdict::Pass,
            reason: format!("Allowed by pattern {source}: {description}"),
            pattern: Some(source.to_string()),
            level: Some(level),
        }
    }

    pub fn denied_by_probe(mode: u32) -> Self {
        Self {
            verdict: Verdict::Deny,
            reason: format!(
                "Blocked by permissions probe: restrictive file permissions (mode 0o{mode:03o})"
            ),
            pattern: None,
            level: Some(SpecificityLevel::Permissions),
        }
    }

    /// A deny produced by the canonicalizer rather than the catalog.
    pub fn denied_by_canonicalizer(detail: impl Display) -> Self {
        Self {
            verdict: Verdict::Deny,
            reason: format!("Blocked by path canonicalizer: {detail}"),
            pattern: None,
            level: None,
        }
    }

    pub fn is_deny(&self) -> bool {
        self.verdict == Verdict::Deny
    }
}

/// Result of checking a batch of paths for one tool call.
///
/// The top-level verdict and reason come from the first denied path;
/// `details` keeps every per-path decision so adapters can log rejected
/// siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BatchDecision {
    pub verdict: Verdict,
    pub reason: String,
    pub details: Vec<PathDecision>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PathDecision {
    pub path: String,
    #[serde(flatten)]
    pub decision: Decision,
}

impl BatchDecision {
    pub fn from_decisions(details: Vec<PathDecision>) -> Self {
        let first_deny = details.iter().find(|d| d.decision.is_deny());
        let (verdict, reason) = match first_deny {
            Some(denied) => (Verdict::Deny, denied.decision.reason.clone()),
            None => (Verdict::Pass, "no matching pattern".to_string()),
        };
        Self { verdict, reason, details }
    }

    pub fn is_deny(&self) -> bool {
        self.verdict == Verdict::Deny
    }

    /// First denied path, if any.
    pub fn denied(&self) -> Option<&PathDecision> {
        self.details.iter().find(|d| d.decision.is_deny())
    }
}
