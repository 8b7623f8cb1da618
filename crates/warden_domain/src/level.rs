use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Specificity levels for catalog entries, declared most-specific-first.
///
/// The derived ordering follows declaration order, so a smaller level is a
/// more specific one and wins resolution. `TrustedDir` is a pseudo-level:
/// it never participates in deny decisions and the resolver only consults
/// it for read-shaped operations, after every more specific level has had
/// its chance.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecificityLevel {
    /// Exact file name, e.g. `id_ed25519`.
    FileName,
    /// File extension, e.g. `.env`, `.pub`.
    FileExtension,
    /// Exact directory.
    Directory,
    /// Security-critical directory names and substrings, e.g. `secrets/`,
    /// `credential`.
    SecurityDirectory,
    /// Trusted agent-data directories; allow-only, read-shaped only.
    TrustedDir,
    /// Synthetic level populated by the permission-mode probe, not by regex.
    Permissions,
    /// Directory prefix globs, e.g. `~/.ssh/`.
    DirGlob,
    /// Everything less specific.
    GlobMiddle,
}

impl SpecificityLevel {
    /// Lattice levels above the trusted-dir gate, scanned first.
    pub(crate) const BEFORE_TRUSTED: [SpecificityLevel; 4] = [
        SpecificityLevel::FileName,
        SpecificityLevel::FileExtension,
        SpecificityLevel::Directory,
        SpecificityLevel::SecurityDirectory,
    ];

    /// Lattice levels below the permission probe, scanned last.
    pub(crate) const AFTER_PERMISSIONS: [SpecificityLevel; 2] =
        [SpecificityLevel::DirGlob, SpecificityLevel::GlobMiddle];
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_more_specific_levels_order_first() {
        assert!(SpecificityLevel::FileName < SpecificityLevel::FileExtension);
        assert!(SpecificityLevel::FileExtension < SpecificityLevel::DirGlob);
        assert!(SpecificityLevel::SecurityDirectory < SpecificityLevel::Permissions);
        assert!(SpecificityLevel::Permissions < SpecificityLevel::DirGlob);
        assert!(SpecificityLevel::DirGlob < SpecificityLevel::GlobMiddle);
    }

    #[test]
    fn test_wire_format_is_screaming_snake_case() {
        let actual = serde_json::to_string(&SpecificityLevel::FileExtension).unwrap();

        assert_eq!(actual, "\"FILE_EXTENSION\"");
    }

    #[test]
    fn test_display_matches_wire_format() {
        let actual = SpecificityLevel::SecurityDirectory.to_string();

        assert_eq!(actual, "SECURITY_DIRECTORY");
    }
}
