use std::collections::{BTreeMap, HashSet};
use std::fs;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::ValidateArgs;
use crate::model::{ContinentSet, ZoneLegend, ZoneRef};
use crate::util::write_json_stdout;

const REQUIRED_METADATA_FIELDS: &[&str] = &[
    "title",
    "edition",
    "totalEntities",
    "generatedAt",
    "statistics.currentEntities",
    "statistics.deletedEntities",
];

const REQUIRED_ENTITY_FIELDS: &[&str] = &[
    "prefix",
    "entityName",
    "continent",
    "zoneITU",
    "zoneCQ",
    "entityCode",
    "isCurrent",
];

#[derive(Debug, Clone, Serialize)]
struct ValidationCheck {
    check_id: String,
    name: String,
    result: String,
    detail: Option<String>,
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    source: String,
    entity_count: usize,
    warnings: Vec<String>,
    checks: Vec<ValidationCheck>,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let raw = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let document: Value = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;

    let mut report = validate_document(&document, args.sample_size)?;
    report.source = args.input.display().to_string();

    for warning in &report.warnings {
        warn!(warning = %warning, "document warning");
    }
    write_json_stdout(&report)?;

    let failed = report
        .checks
        .iter()
        .filter(|check| check.result == "failed")
        .map(|check| check.check_id.as_str())
        .collect::<Vec<&str>>();
    if !failed.is_empty() {
        bail!("validation failed: {}", failed.join(", "));
    }

    info!(
        entities = report.entity_count,
        warnings = report.warnings.len(),
        "validation passed"
    );
    Ok(())
}

fn validate_document(document: &Value, sample_size: usize) -> Result<ValidationReport> {
    let Some(metadata) = document.get("metadata").filter(|value| value.is_object()) else {
        bail!("document has no `metadata` object");
    };
    let Some(entities) = document.get("entities").and_then(Value::as_array) else {
        bail!("document has no `entities` array");
    };

    let mut warnings = Vec::new();
    for field in REQUIRED_METADATA_FIELDS {
        if lookup_path(metadata, field).is_none() {
            warnings.push(format!("metadata.{field} is missing"));
        }
    }
    for (index, entity) in entities.iter().take(sample_size).enumerate() {
        for field in REQUIRED_ENTITY_FIELDS {
            if entity.get(field).is_none() {
                warnings.push(format!("entities[{index}].{field} is missing"));
            }
        }
    }

    let checks = vec![
        check_entity_codes(entities),
        check_continents(entities),
        check_statistics(metadata, entities),
        check_filter(metadata, entities),
        check_note_references(metadata, entities),
        check_zone_letters(metadata, entities),
    ];

    Ok(ValidationReport {
        source: String::new(),
        entity_count: entities.len(),
        warnings,
        checks,
    })
}

fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
        .filter(|found| !found.is_null())
}

fn check(check_id: &str, name: &str, result: &str, detail: Option<String>) -> ValidationCheck {
    ValidationCheck {
        check_id: check_id.to_string(),
        name: name.to_string(),
        result: result.to_string(),
        detail,
    }
}

fn pass_or_fail(check_id: &str, name: &str, offenders: Vec<String>) -> ValidationCheck {
    if offenders.is_empty() {
        check(check_id, name, "pass", None)
    } else {
        check(check_id, name, "failed", Some(offenders.join("; ")))
    }
}

fn check_entity_codes(entities: &[Value]) -> ValidationCheck {
    let mut seen = HashSet::new();
    let mut offenders = Vec::new();

    for (index, entity) in entities.iter().enumerate() {
        match entity.get("entityCode").and_then(Value::as_u64) {
            Some(code) if code > 0 => {
                if !seen.insert(code) {
                    offenders.push(format!("entities[{index}] repeats code {code}"));
                }
            }
            _ => offenders.push(format!("entities[{index}] has no positive entityCode")),
        }
    }

    pass_or_fail("V-001", "Entity codes positive and unique", offenders)
}

fn check_continents(entities: &[Value]) -> ValidationCheck {
    let offenders = entities
        .iter()
        .enumerate()
        .filter(|(_, entity)| {
            entity
                .get("continent")
                .and_then(Value::as_str)
                .and_then(ContinentSet::parse)
                .is_none()
        })
        .map(|(index, _)| format!("entities[{index}] has an invalid continent"))
        .collect::<Vec<String>>();

    pass_or_fail("V-002", "Continent codes well formed", offenders)
}

fn check_statistics(metadata: &Value, entities: &[Value]) -> ValidationCheck {
    let name = "Statistics match entity list";
    let current = lookup_path(metadata, "statistics.currentEntities").and_then(Value::as_u64);
    let deleted = lookup_path(metadata, "statistics.deletedEntities").and_then(Value::as_u64);

    let (Some(current), Some(deleted)) = (current, deleted) else {
        return check("V-003", name, "pending", None);
    };

    if (current + deleted) as usize == entities.len() {
        check("V-003", name, "pass", None)
    } else {
        check(
            "V-003",
            name,
            "failed",
            Some(format!(
                "current {current} + deleted {deleted} != {} entities",
                entities.len()
            )),
        )
    }
}

fn check_filter(metadata: &Value, entities: &[Value]) -> ValidationCheck {
    let name = "Filtered entities share one status";
    let expected = match metadata.get("filter").and_then(Value::as_str) {
        Some("current") => true,
        Some("deleted") => false,
        _ => return check("V-004", name, "pending", None),
    };

    let offenders = entities
        .iter()
        .enumerate()
        .filter(|(_, entity)| entity.get("isCurrent").and_then(Value::as_bool) != Some(expected))
        .map(|(index, _)| format!("entities[{index}] isCurrent != {expected}"))
        .collect::<Vec<String>>();

    pass_or_fail("V-004", name, offenders)
}

fn check_note_references(metadata: &Value, entities: &[Value]) -> ValidationCheck {
    let name = "Note references resolve";
    let Some(notes) = metadata.get("notes").and_then(Value::as_object) else {
        return check("V-005", name, "pending", None);
    };

    let mut offenders = Vec::new();
    for (index, entity) in entities.iter().enumerate() {
        let keys = entity
            .get("notes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for key in keys.iter().filter_map(Value::as_str) {
            if !notes.contains_key(key) {
                offenders.push(format!("entities[{index}] references {key}"));
            }
        }
    }

    pass_or_fail("V-005", name, offenders)
}

fn check_zone_letters(metadata: &Value, entities: &[Value]) -> ValidationCheck {
    let legend = metadata
        .get("zoneLegend")
        .and_then(|value| serde_json::from_value::<BTreeMap<String, String>>(value.clone()).ok())
        .map(ZoneLegend::new)
        .unwrap_or_default();

    let mut offenders = Vec::new();
    for (index, entity) in entities.iter().enumerate() {
        for field in ["zoneITU", "zoneCQ"] {
            let Some(raw) = entity.get(field) else {
                continue;
            };
            let resolved = serde_json::from_value::<ZoneRef>(raw.clone())
                .ok()
                .and_then(|zone| legend.resolve(&zone));
            if resolved.is_none() {
                offenders.push(format!("entities[{index}].{field} = {raw}"));
            }
        }
    }

    pass_or_fail("V-006", "Zone references resolve", offenders)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_document() -> Value {
        json!({
            "metadata": {
                "title": "ARRL DXCC List",
                "edition": "January 2024 Edition",
                "totalEntities": 2,
                "generatedAt": "2024-01-01T00:00:00Z",
                "filter": "all",
                "statistics": { "currentEntities": 1, "deletedEntities": 1 },
                "notes": { "qsl_service": "* QSL Service via bureau", "deleted_note_2": "Deleted." },
                "zoneLegend": { "E": "33, 42, 43, 44" }
            },
            "entities": [
                {
                    "prefix": "3A", "entityName": "Monaco", "continent": "EU",
                    "zoneITU": 27, "zoneCQ": 14, "entityCode": 260,
                    "notes": ["qsl_service"], "isCurrent": true
                },
                {
                    "prefix": "BV9M", "entityName": "Old Island", "continent": "AS",
                    "zoneITU": "E", "zoneCQ": 24, "entityCode": 501,
                    "notes": ["deleted_note_2"], "isCurrent": false
                }
            ]
        })
    }

    fn result_of<'a>(report: &'a ValidationReport, check_id: &str) -> &'a str {
        report
            .checks
            .iter()
            .find(|check| check.check_id == check_id)
            .map(|check| check.result.as_str())
            .unwrap_or("missing")
    }

    #[test]
    fn well_formed_document_passes_every_check() {
        let report = validate_document(&sample_document(), 10).unwrap();
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        for id in ["V-001", "V-002", "V-003", "V-005", "V-006"] {
            assert_eq!(result_of(&report, id), "pass", "{id}");
        }
        assert_eq!(result_of(&report, "V-004"), "pending");
    }

    #[test]
    fn missing_entities_array_is_fatal() {
        let document = json!({ "metadata": {} });
        assert!(validate_document(&document, 10).is_err());
    }

    #[test]
    fn missing_optional_fields_only_warn() {
        let mut document = sample_document();
        document["metadata"].as_object_mut().unwrap().remove("edition");
        document["entities"][0].as_object_mut().unwrap().remove("zoneCQ");

        let report = validate_document(&document, 10).unwrap();
        assert!(report.warnings.contains(&"metadata.edition is missing".to_string()));
        assert!(report.warnings.contains(&"entities[0].zoneCQ is missing".to_string()));
    }

    #[test]
    fn duplicate_codes_and_bad_statistics_fail() {
        let mut document = sample_document();
        document["entities"][1]["entityCode"] = json!(260);
        document["metadata"]["statistics"]["deletedEntities"] = json!(4);

        let report = validate_document(&document, 10).unwrap();
        assert_eq!(result_of(&report, "V-001"), "failed");
        assert_eq!(result_of(&report, "V-003"), "failed");
    }

    #[test]
    fn filter_mode_requires_matching_status() {
        let mut document = sample_document();
        document["metadata"]["filter"] = json!("current");

        let report = validate_document(&document, 10).unwrap();
        assert_eq!(result_of(&report, "V-004"), "failed");
    }

    #[test]
    fn unknown_zone_letters_fail() {
        let mut document = sample_document();
        document["entities"][1]["zoneITU"] = json!("Q");

        let report = validate_document(&document, 10).unwrap();
        assert_eq!(result_of(&report, "V-006"), "failed");
    }
}
