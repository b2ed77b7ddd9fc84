use super::*;

#[derive(Debug, Clone, Default)]
pub(super) struct ExtractConfig {
    pub(super) filter: FilterMode,
    pub(super) zone_legend: ZoneLegend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct UnmatchedLine {
    pub(super) line_number: usize,
    pub(super) text: String,
}

// Soft anomalies; fatal cases bail instead.
#[derive(Debug, Default)]
pub(super) struct ExtractionReport {
    pub(super) unmatched_lines: Vec<UnmatchedLine>,
    pub(super) duplicate_symbol_notes: Vec<String>,
    pub(super) duplicate_footnotes: Vec<String>,
    pub(super) duplicate_entity_codes: Vec<u32>,
    pub(super) missing_sections: Vec<String>,
    pub(super) metadata_defaults: Vec<String>,
}

impl ExtractionReport {
    pub(super) fn anomaly_count(&self) -> usize {
        self.unmatched_lines.len()
            + self.duplicate_symbol_notes.len()
            + self.duplicate_footnotes.len()
            + self.duplicate_entity_codes.len()
            + self.missing_sections.len()
            + self.metadata_defaults.len()
    }

    pub(super) fn log_summary(&self) {
        if !self.unmatched_lines.is_empty() {
            for unmatched in &self.unmatched_lines {
                debug!(line = unmatched.line_number, text = %unmatched.text, "unmatched entity line");
            }
            warn!(
                count = self.unmatched_lines.len(),
                "entity lines skipped after all row strategies failed"
            );
        }
        if !self.duplicate_symbol_notes.is_empty() {
            warn!(keys = ?self.duplicate_symbol_notes, "symbol notes defined more than once; last definition kept");
        }
        if !self.duplicate_footnotes.is_empty() {
            warn!(keys = ?self.duplicate_footnotes, "footnotes defined more than once; last definition kept");
        }
        if !self.duplicate_entity_codes.is_empty() {
            warn!(codes = ?self.duplicate_entity_codes, "duplicate entity codes dropped");
        }
        if !self.missing_sections.is_empty() {
            warn!(sections = ?self.missing_sections, "footnote sections not found");
        }
        if !self.metadata_defaults.is_empty() {
            warn!(fields = ?self.metadata_defaults, "metadata fields defaulted");
        }
    }
}

#[derive(Debug)]
pub(super) struct Extraction {
    pub(super) result: DocumentResult,
    pub(super) report: ExtractionReport,
}

#[derive(Debug)]
pub(super) struct DocumentAssembler {
    pub(super) lines: LinePatterns,
    pub(super) rows: EntityRowParser,
}

#[derive(Debug)]
struct ScanState {
    is_current_section: bool,
    data_start: Option<usize>,
    current_notes_start: Option<usize>,
    deleted_notes_start: Option<usize>,
    entities: Vec<Entity>,
    seen_codes: HashSet<u32>,
}

impl ScanState {
    fn new() -> Self {
        Self {
            is_current_section: true,
            data_start: None,
            current_notes_start: None,
            deleted_notes_start: None,
            entities: Vec::new(),
            seen_codes: HashSet::new(),
        }
    }

    fn scope(&self) -> NoteScope {
        if self.is_current_section {
            NoteScope::Current
        } else {
            NoteScope::Deleted
        }
    }
}

impl DocumentAssembler {
    pub(super) fn new() -> Result<Self> {
        Ok(Self {
            lines: LinePatterns::new()?,
            rows: EntityRowParser::new()?,
        })
    }

    pub(super) fn assemble(&self, text: &str, config: &ExtractConfig) -> Result<Extraction> {
        let lines = text.lines().collect::<Vec<&str>>();
        let mut report = ExtractionReport::default();
        let state = self.scan(&lines, &mut report);

        let Some(data_start) = state.data_start else {
            bail!("table separator line not found; input is not a recognizable DXCC list");
        };
        if state.entities.is_empty() {
            bail!("no entity rows found after the table separator on line {}", data_start + 1);
        }

        let current_notes = self.scoped_footnotes(
            &lines,
            state.current_notes_start,
            NoteScope::Current,
            &mut report,
        );
        let deleted_notes = self.scoped_footnotes(
            &lines,
            state.deleted_notes_start,
            NoteScope::Deleted,
            &mut report,
        );
        let symbol_scan = extract_symbol_notes(&lines, &self.lines);
        report.duplicate_symbol_notes = symbol_scan.duplicates;

        let title = lines[..data_start]
            .iter()
            .map(|line| line.trim())
            .find(|line| line.contains("DXCC"))
            .map(collapse_whitespace)
            .unwrap_or_else(|| {
                report.metadata_defaults.push("title".to_string());
                DEFAULT_TITLE.to_string()
            });
        let edition = self.lines.find_edition(&lines[..data_start]).unwrap_or_else(|| {
            report.metadata_defaults.push("edition".to_string());
            DEFAULT_EDITION.to_string()
        });

        let entities = state
            .entities
            .into_iter()
            .filter(|entity| config.filter.keeps(entity.is_current))
            .collect::<Vec<Entity>>();

        let statistics = Statistics {
            current_entities: entities.iter().filter(|entity| entity.is_current).count(),
            deleted_entities: entities.iter().filter(|entity| !entity.is_current).count(),
            continents: continent_counts(&entities),
            current_footnotes: current_notes.len(),
            deleted_footnotes: deleted_notes.len(),
            symbol_notes: symbol_scan.notes.len(),
            unmatched_lines: report.unmatched_lines.len(),
        };

        let mut notes = symbol_scan.notes;
        if config.filter != FilterMode::Deleted {
            notes.extend(current_notes);
        }
        if config.filter != FilterMode::Current {
            notes.extend(deleted_notes);
        }

        info!(
            current = statistics.current_entities,
            deleted = statistics.deleted_entities,
            footnotes = statistics.current_footnotes + statistics.deleted_footnotes,
            filter = config.filter.as_str(),
            "document assembled"
        );

        Ok(Extraction {
            result: DocumentResult {
                metadata: Metadata {
                    title,
                    edition,
                    total_entities: entities.len(),
                    generated_at: now_utc_string(),
                    filter: config.filter.as_str().to_string(),
                    source_file: None,
                    source_sha256: None,
                    statistics,
                    notes,
                    zone_legend: config.zone_legend.clone(),
                },
                entities,
            },
            report,
        })
    }

    fn scan(&self, lines: &[&str], report: &mut ExtractionReport) -> ScanState {
        let mut state = ScanState::new();

        for (index, raw_line) in lines.iter().enumerate() {
            let line = raw_line.trim();

            match self.lines.classify(line) {
                LineClass::Blank | LineClass::Noise | LineClass::FootnoteDefinition => {}
                LineClass::TableSeparator => {
                    if state.data_start.is_none() && state.entities.is_empty() {
                        state.data_start = Some(index);
                    }
                }
                LineClass::DeletedHeader => {
                    state.is_current_section = false;
                }
                LineClass::NotesHeader => {
                    if state.is_current_section {
                        state.current_notes_start = Some(index);
                    } else {
                        state.deleted_notes_start = Some(index);
                        break;
                    }
                }
                LineClass::EntityData => {
                    if state.data_start.is_none() {
                        continue;
                    }
                    self.accept_entity_line(index, line, &mut state, report);
                }
            }
        }

        state
    }

    fn accept_entity_line(
        &self,
        index: usize,
        line: &str,
        state: &mut ScanState,
        report: &mut ExtractionReport,
    ) {
        let Some(entity) = self.rows.parse_entity_line(line, state.scope()) else {
            if self.rows.looks_like_row(line) {
                report.unmatched_lines.push(UnmatchedLine {
                    line_number: index + 1,
                    text: line.to_string(),
                });
            } else {
                trace!(line = index + 1, text = line, "ignoring non-row text");
            }
            return;
        };

        if !state.seen_codes.insert(entity.entity_code) {
            debug!(code = entity.entity_code, line = index + 1, "entity code already used");
            report.duplicate_entity_codes.push(entity.entity_code);
            return;
        }

        state.entities.push(entity);
    }

    fn scoped_footnotes(
        &self,
        lines: &[&str],
        start: Option<usize>,
        scope: NoteScope,
        report: &mut ExtractionReport,
    ) -> BTreeMap<String, String> {
        let Some(start) = start else {
            report
                .missing_sections
                .push(format!("{} notes", scope.as_str()));
            return BTreeMap::new();
        };

        let scan = extract_footnotes(lines, start, scope, &self.lines);
        report.duplicate_footnotes.extend(scan.duplicates);
        scan.notes
    }
}

fn continent_counts(entities: &[Entity]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::<String, usize>::new();
    for entity in entities.iter().filter(|entity| entity.is_current) {
        for continent in entity.continent.iter() {
            *counts.entry(continent.as_str().to_string()).or_default() += 1;
        }
    }
    counts
}
