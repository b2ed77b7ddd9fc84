use super::*;

#[derive(Debug, Default)]
pub(super) struct SymbolNoteScan {
    pub(super) notes: BTreeMap<String, String>,
    pub(super) duplicates: Vec<String>,
}

impl SymbolNoteScan {
    fn record(&mut self, kind: SymbolNote, text: String) {
        let key = kind.key().to_string();
        if let Some(previous) = self.notes.insert(key.clone(), text) {
            debug!(key = %key, previous = %previous, "symbol note redefined; keeping last");
            self.duplicates.push(key);
        }
    }
}

pub(super) fn extract_symbol_notes(lines: &[&str], patterns: &LinePatterns) -> SymbolNoteScan {
    let mut scan = SymbolNoteScan::default();
    let mut index = 0usize;

    while index < lines.len() {
        let line = lines[index].trim();
        index += 1;

        if let Some(body) = line.strip_prefix('^') {
            let mut text = body.trim().to_string();
            while index < lines.len() {
                let next = lines[index].trim();
                if ends_antarctica_block(next, patterns) {
                    break;
                }
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(next);
                index += 1;
            }
            scan.record(SymbolNote::AntarcticaSpecial, text);
            continue;
        }

        if line.contains("QSL") && line.contains("Service") && line.contains('*') {
            scan.record(SymbolNote::QslService, line.to_string());
            continue;
        }

        if line.contains("third-party") && line.contains("traffic") && line.contains('#') {
            scan.record(SymbolNote::ThirdPartyTraffic, line.to_string());
        }
    }

    scan
}

fn ends_antarctica_block(line: &str, patterns: &LinePatterns) -> bool {
    line.is_empty()
        || starts_with_marker(line)
        || patterns.footnote_definition.is_match(line)
        || line.contains("Zone Notes")
}

pub(super) fn load_zone_legend(path: &Path) -> Result<ZoneLegend> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let entries: BTreeMap<String, String> = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse zone legend {}", path.display()))?;

    for letter in entries.keys() {
        if !matches!(ZoneRef::parse(letter), Some(ZoneRef::Letter(_))) {
            bail!(
                "zone legend {} has key {:?}; keys must be single uppercase letters",
                path.display(),
                letter
            );
        }
    }

    Ok(ZoneLegend::new(entries))
}
