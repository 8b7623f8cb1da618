use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Tool operations that reach the filter.
///
/// Each operation is either read-shaped (observes the filesystem) or
/// mutating (writes to it or runs arbitrary commands). Only read-shaped
/// operations honor trusted-directory allow entries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Operation {
    #[serde(alias = "Read")]
    Read,
    #[serde(alias = "Write")]
    Write,
    #[serde(alias = "Edit")]
    Edit,
    #[serde(alias = "Glob")]
    Glob,
    #[serde(alias = "Grep")]
    Grep,
    #[serde(alias = "Bash")]
    Bash,
}

impl Operation {
    /// All operations, used as the default applicability set for catalog
    /// entries.
    pub const ALL: [Operation; 6] = [
        Operation::Read,
        Operation::Write,
        Operation::Edit,
        Operation::Glob,
        Operation::Grep,
        Operation::Bash,
    ];

    /// Operations that observe but do not mutate state.
    pub const READ_SHAPED: [Operation; 3] = [Operation::Read, Operation::Glob, Operation::Grep];

    pub fn is_read_shaped(self) -> bool {
        matches!(self, Operation::Read | Operation::Glob | Operation::Grep)
    }

    pub fn is_mutating(self) -> bool {
        !self.is_read_shaped()
    }

    /// Classify an agent tool name into an operation.
    ///
    /// Covers both the capitalized tool names used by hook envelopes and the
    /// lowercase variants some agents emit. `MultiEdit` and `NotebookEdit`
    /// are edit-shaped. Unrecognized tools return `None`; the hook adapter
    /// treats those as having nothing to check.
    pub fn from_tool_name(tool_name: &str) -> Option<Operation> {
        match tool_name {
            "Read" | "read_file" => Some(Operation::Read),
            "Write" | "write_file" => Some(Operation::Write),
            "Edit" | "edit_file" | "MultiEdit" | "NotebookEdit" => Some(Operation::Edit),
            "Glob" => Some(Operation::Glob),
            "Grep" => Some(Operation::Grep),
            "Bash" => Some(Operation::Bash),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_read_shaped_operations() {
        let actual: Vec<bool> = Operation::ALL.iter().map(|op| op.is_read_shaped()).collect();
        let expected = vec![true, false, false, true, true, false];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_mutating_is_complement_of_read_shaped() {
        for op in Operation::iter() {
            assert_eq!(op.is_mutating(), !op.is_read_shaped());
        }
    }

    #[test]
    fn test_all_covers_every_operation() {
        let actual: Vec<Operation> = Operation::iter().collect();

        assert_eq!(actual, Operation::ALL.to_vec());
    }

    #[test]
    fn test_from_tool_name_capitalized() {
        let actual = Operation::from_tool_name("Read");

        assert_eq!(actual, Some(Operation::Read));
    }

    #[test]
    fn test_from_tool_name_edit_aliases() {
        assert_eq!(Operation::from_tool_name("MultiEdit"), Some(Operation::Edit));
        assert_eq!(Operation::from_tool_name("NotebookEdit"), Some(Operation::Edit));
        assert_eq!(Operation::from_tool_name("edit_file"), Some(Operation::Edit));
    }

    #[test]
    fn test_from_tool_name_unknown() {
        let actual = Operation::from_tool_name("WebFetch");

        assert_eq!(actual, None);
    }

    #[test]
    fn test_from_tool_name_empty() {
        let actual = Operation::from_tool_name("");

        assert_eq!(actual, None);
    }

    #[test]
    fn test_wire_format_is_lowercase() {
        let actual = serde_json::to_string(&Operation::Bash).unwrap();

        assert_eq!(actual, "\"bash\"");
    }

    #[test]
    fn test_deserializes_capitalized_alias() {
        let actual: Operation = serde_json::from_str("\"Grep\"").unwrap();

        assert_eq!(actual, Operation::Grep);
    }

    #[test]
    fn test_from_str_case_insensitive() {
        let actual = Operation::from_str("WRITE").unwrap();

        assert_eq!(actual, Operation::Write);
    }
}
