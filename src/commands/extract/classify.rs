use super::*;

const BOILERPLATE_PREFIXES: &[&str] = &["Prefix", "Effective"];

const BOILERPLATE_MARKERS: &[&str] = &[
    "Entity Code",
    "ITU Zone",
    "CQ Zone",
    "Zone Notes can be found",
    "Credit for",
    "See also",
    "QSL Service",
    "third-party traffic",
    "CURRENT ENTITIES",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LineClass {
    Blank,
    TableSeparator,
    DeletedHeader,
    NotesHeader,
    Noise,
    FootnoteDefinition,
    EntityData,
}

#[derive(Debug)]
pub(super) struct LinePatterns {
    pub(super) edition: Regex,
    pub(super) footnote_definition: Regex,
}

impl LinePatterns {
    pub(super) fn new() -> Result<Self> {
        Ok(Self {
            edition: Regex::new(
                r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4}(?:\s+Edition)?\b",
            )
            .context("failed to compile edition regex")?,
            footnote_definition: Regex::new(r"^(\d+)\s+(.+)$")
                .context("failed to compile footnote definition regex")?,
        })
    }

    // Noise before footnotes, footnotes before entity rows.
    pub(super) fn classify(&self, line: &str) -> LineClass {
        if line.is_empty() {
            return LineClass::Blank;
        }

        if line.contains(TABLE_RULE) {
            return LineClass::TableSeparator;
        }

        if line.contains(DELETED_HEADER) {
            return LineClass::DeletedHeader;
        }

        if line == NOTES_HEADER {
            return LineClass::NotesHeader;
        }

        if starts_with_marker(line) || self.edition.is_match(line) || is_boilerplate(line) {
            return LineClass::Noise;
        }

        if self.footnote_definition.is_match(line) {
            return LineClass::FootnoteDefinition;
        }

        LineClass::EntityData
    }

    pub(super) fn find_edition(&self, lines: &[&str]) -> Option<String> {
        lines.iter().find_map(|line| {
            self.edition
                .find(line)
                .map(|found| collapse_whitespace(found.as_str()))
        })
    }
}

pub(super) fn starts_with_marker(line: &str) -> bool {
    line.starts_with(['*', '#', '^'])
}

fn is_boilerplate(line: &str) -> bool {
    BOILERPLATE_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
        || BOILERPLATE_MARKERS
            .iter()
            .any(|marker| line.contains(marker))
}

pub(super) fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}
