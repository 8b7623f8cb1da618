use std::path::{Path, PathBuf};

use anyhow::Context;
use derive_setters::Setters;
use tracing::debug;
use warden_domain::{
    resolve, BatchDecision, Catalog, Decision, Operation, PathDecision,
};
use warden_fs::{CanonError, WardenFS};

/// The filter facade: canonicalize, probe, resolve.
///
/// This is the only place canonicalizer and stat failures exist; every one
/// of them is mapped to a deny here, so callers never see an error, only a
/// `Decision`. Aside from `stat`/`readlink` during resolution the facade
/// has no side effects.
#[derive(Setters)]
#[setters(strip_option, into)]
pub struct SecurityFilter {
    #[setters(skip)]
    catalog: Catalog,
    /// Home directory used for `~` expansion.
    home: Option<PathBuf>,
    /// Default base directory for resolving relative paths.
    base_dir: Option<PathBuf>,
}

impl SecurityFilter {
    /// Facade over the builtin catalog, with home taken from the
    /// environment.
    pub fn new() -> anyhow::Result<Self> {
        let home = dirs::home_dir();
        let catalog =
            Catalog::builtin(home.as_deref()).context("failed to build pattern catalog")?;
        Ok(Self { catalog, home, base_dir: None })
    }

    /// Facade over a caller-supplied catalog. Home and base default to
    /// unset; use the setters.
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self { catalog, home: None, base_dir: None }
    }

    /// Decide one path under one operation.
    pub fn check(&self, op: Operation, raw_path: &str) -> Decision {
        self.check_in(op, raw_path, None)
    }

    /// Decide one path, overriding the base directory for this call.
    pub fn check_in(&self, op: Operation, raw_path: &str, base: Option<&Path>) -> Decision {
        let base = base.or(self.base_dir.as_deref());

        let canonical = match WardenFS::canonicalize(raw_path, self.home.as_deref(), base) {
            Ok(path) => path,
            Err(error) => {
                debug!(path = raw_path, %error, "canonicalization failed");
                return Decision::denied_by_canonicalizer(error);
            }
        };

        let restrictive = match WardenFS::restrictive_mode(&canonical) {
            Ok(mode) => mode,
            Err(error) => {
                debug!(path = %canonical.display(), %error, "permission probe failed");
                return Decision::denied_by_canonicalizer(CanonError::from(error));
            }
        };

        let decision = resolve(&canonical.to_string_lossy(), op, restrictive, &self.catalog);
        debug!(
            path = %canonical.display(),
            op = %op,
            verdict = %decision.verdict,
            "checked path"
        );
        decision
    }

    /// Decide a batch of paths for one tool call.
    ///
    /// Each path is evaluated independently; the batch verdict is the first
    /// deny, and every per-path decision is retained for logging.
    pub fn check_many(&self, op: Operation, raw_paths: &[String]) -> BatchDecision {
        self.check_many_in(op, raw_paths, None)
    }

    pub fn check_many_in(
        &self,
        op: Operation,
        raw_paths: &[String],
        base: Option<&Path>,
    ) -> BatchDecision {
        let details = raw_paths
            .iter()
            .map(|path| PathDecision {
                path: path.clone(),
                decision: self.check_in(op, path, base),
            })
            .collect();
        BatchDecision::from_decisions(details)
    }
}
