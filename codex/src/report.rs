//! Human-readable dump of a registry's contents.

use crate::error::CodexResult;
use codex_types::EntryId;
use serde::Serialize;
use std::fmt;

const RULE: &str = "+---------------------------------------------";

/// One registered entry as it appears in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub id: EntryId,
    pub description: String,
}

/// Snapshot of `(identifier, description)` pairs, sorted by identifier.
///
/// `Display` renders the table:
///
/// ```text
/// +---------------------------------------------
/// | Codex:
/// |    [<id>] <description>
/// +---------------------------------------------
/// ```
///
/// Continuation lines of a multi-line description are indented to line up
/// with its first line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub entries: Vec<ReportLine>,
}

impl Report {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Description of `id`, if it is part of the report.
    #[must_use]
    pub fn description(&self, id: EntryId) -> Option<&str> {
        self.entries
            .binary_search_by(|line| line.id.cmp(&id))
            .ok()
            .map(|idx| self.entries[idx].description.as_str())
    }

    /// Pretty-printed JSON rendering.
    pub fn to_json(&self) -> CodexResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl FromIterator<(EntryId, String)> for Report {
    fn from_iter<I: IntoIterator<Item = (EntryId, String)>>(iter: I) -> Self {
        let mut entries: Vec<ReportLine> = iter
            .into_iter()
            .map(|(id, description)| ReportLine { id, description })
            .collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        Self { entries }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "| Codex:")?;
        for line in &self.entries {
            let id = line.id.to_string();
            let indent = format!("\n|{}", " ".repeat(id.len() + 7));
            writeln!(f, "|    [{id}] {}", line.description.replace('\n', &indent))?;
        }
        write!(f, "{RULE}")
    }
}
