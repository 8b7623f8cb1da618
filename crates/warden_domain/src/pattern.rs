use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::decision::Verdict;
use crate::error::CatalogError;
use crate::level::SpecificityLevel;
use crate::operation::Operation;

/// Extensions treated as source code by the substring deny patterns.
///
/// A `password_hasher.rs` is code and stays readable; prose formats like
/// `.md` are not in the set, so a `password_reset.md` is still denied.
const CODE_EXTENSIONS: [&str; 12] = [
    "c", "cc", "cpp", "h", "hpp", "rs", "go", "ts", "js", "py", "java", "rb",
];

/// True when the final path component carries a known code extension.
pub fn has_code_extension(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        // A leading dot is a hidden file, not an extension.
        Some((stem, ext)) if !stem.is_empty() => {
            CODE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        }
        _ => false,
    }
}

/// A single catalog entry as declared (and as it would appear in a future
/// catalog file).
///
/// The level is always explicit; it is never inferred from the regex. `ops`
/// restricts which operations the entry applies to (`None` means all).
/// `exempt_source_code` implements the substring carve-out: the `regex`
/// crate has no lookaround, so "matches unless the path is code" is a flag
/// checked next to the regex instead of part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PatternSpec {
    pub regex: String,
    pub level: SpecificityLevel,
    pub verdict: Verdict,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ops: Option<Vec<Operation>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exempt_source_code: bool,
}

impl PatternSpec {
    pub fn deny(regex: &str, level: SpecificityLevel, description: &str) -> Self {
        Self {
            regex: regex.to_string(),
            level,
            verdict: Verdict::Deny,
            description: description.to_string(),
            ops: None,
            exempt_source_code: false,
        }
    }

    pub fn pass(regex: &str, level: SpecificityLevel, description: &str) -> Self {
        Self { verdict: Verdict::Pass, ..Self::deny(regex, level, description) }
    }

    /// Restrict the entry to read-shaped operations.
    pub fn read_shaped(mut self) -> Self {
        self.ops = Some(Operation::READ_SHAPED.to_vec());
        self
    }

    /// Apply the source-code carve-out to this entry.
    pub fn exempting_source_code(mut self) -> Self {
        self.exempt_source_code = true;
        self
    }
}

/// A compiled catalog entry.
#[derive(Debug, Clone)]
pub struct PatternEntry {
    spec: PatternSpec,
    regex: Regex,
}

impl PatternEntry {
    /// Source text of the pattern as declared (tilde form preserved).
    pub fn source(&self) -> &str {
        &self.spec.regex
    }

    pub fn level(&self) -> SpecificityLevel {
        self.spec.level
    }

    pub fn verdict(&self) -> Verdict {
        self.spec.verdict
    }

    pub fn description(&self) -> &str {
        &self.spec.description
    }

    /// Whether this entry matches a canonical path under an operation.
    pub fn matches(&self, path: &str, op: Operation) -> bool {
        if let Some(ops) = &self.spec.ops {
            if !ops.contains(&op) {
                return false;
            }
        }
        if self.spec.exempt_source_code && has_code_extension(path) {
            return false;
        }
        self.regex.is_match(path)
    }
}

/// The immutable pattern catalog, built once at process start.
///
/// Iteration order is irrelevant to correctness; the resolver groups
/// entries by level before deciding.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<PatternEntry>,
}

impl Catalog {
    /// Compile a catalog from declared entries.
    ///
    /// Patterns anchored at `^~/` are spliced with the escaped home prefix.
    /// When no home directory is determinable those entries are omitted:
    /// tilde input paths already fail canonicalization, and absolute paths
    /// cannot land inside a home that does not exist.
    pub fn from_specs(
        specs: Vec<PatternSpec>,
        home: Option<&Path>,
    ) -> Result<Self, CatalogError> {
        let mut seen: HashSet<(String, SpecificityLevel)> = HashSet::new();
        let mut entries = Vec::with_capacity(specs.len());

        for spec in specs {
            if !seen.insert((spec.regex.clone(), spec.level)) {
                return Err(CatalogError::DuplicateEntry {
                    pattern: spec.regex,
                    level: spec.level,
                });
            }

            let expanded = match spec.regex.strip_prefix("^~/") {
                Some(rest) => match home {
                    Some(home) => {
                        format!("^{}/{}", regex::escape(&home.to_string_lossy()), rest)
                    }
                    None => continue,
                },
                None => spec.regex.clone(),
            };

            let regex = Regex::new(&expanded).map_err(|source| CatalogError::InvalidRegex {
                pattern: spec.regex.clone(),
                source,
            })?;
            entries.push(PatternEntry { spec, regex });
        }

        Ok(Self { entries })
    }

    /// The compiled-in baseline catalog.
    pub fn builtin(home: Option<&Path>) -> Result<Self, CatalogError> {
        Self::from_specs(builtin_specs(), home)
    }

    /// All entries matching a canonical path under an operation.
    pub fn matching(&self, path: &str, op: Operation) -> Vec<&PatternEntry> {
        self.entries.iter().filter(|e| e.matches(path, op)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Baseline entries shipped with the filter.
fn builtin_specs() -> Vec<PatternSpec> {
    use SpecificityLevel::*;

    vec![
        // Exact file names
        PatternSpec::deny(
            r"(^|/)id_(rsa|dsa|ecdsa|ed25519|ecdsa_sk|ed25519_sk)$",
            FileName,
            "SSH private key",
        ),
        PatternSpec::deny(r"(^|/)\.netrc$", FileName, "netrc credential store"),
        // Extensions
        PatternSpec::deny(r"\.env$", FileExtension, "dotenv secrets file"),
        PatternSpec::deny(r"\.env\.[^/]+$", FileExtension, "dotenv environment variant"),
        PatternSpec::pass(r"\.pub$", FileExtension, "public key material"),
        PatternSpec::pass(r"\.pem$", FileExtension, "PEM-encoded certificate"),
        // Security-critical directory names and substrings
        PatternSpec::deny(r"/\.?secrets?/", SecurityDirectory, "secrets directory"),
        PatternSpec::deny("credential", SecurityDirectory, "credential store")
            .exempting_source_code(),
        PatternSpec::deny("password", SecurityDirectory, "password store")
            .exempting_source_code(),
        // Credential directories under home
        PatternSpec::deny(r"^~/\.ssh/", DirGlob, "SSH configuration directory"),
        PatternSpec::deny(r"^~/\.gnupg/", DirGlob, "GnuPG keyring directory"),
        PatternSpec::deny(r"^~/\.aws/", DirGlob, "AWS credentials directory"),
        PatternSpec::deny(r"^~/\.config/gcloud/", DirGlob, "gcloud credentials directory"),
        PatternSpec::deny(r"^~/\.azure/", DirGlob, "Azure credentials directory"),
        PatternSpec::deny(r"^~/\.config/sops/", DirGlob, "sops keys directory"),
        // Trusted agent-data directories, reads only
        PatternSpec::pass(r"^~/dotfiles/", TrustedDir, "trusted dotfiles checkout").read_shaped(),
        PatternSpec::pass(r"^~/codebases/", TrustedDir, "trusted code checkout").read_shaped(),
        PatternSpec::pass(r"^~/\.claude/projects/", TrustedDir, "trusted agent data directory")
            .read_shaped(),
    ]
}
