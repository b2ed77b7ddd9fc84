use super::*;

pub fn run(args: ExtractArgs) -> Result<()> {
    info!(input = %args.input.display(), filter = args.filter.as_str(), "starting extract");

    let raw = read_source(&args.input)?;
    let source_sha256 = sha256_hex(&raw);
    let text = String::from_utf8(raw)
        .with_context(|| format!("{} is not valid UTF-8 text", args.input.display()))?;

    let zone_legend = match &args.zone_legend {
        Some(path) => {
            let legend = load_zone_legend(path)?;
            info!(path = %path.display(), letters = legend.entries().len(), "loaded zone legend override");
            legend
        }
        None => ZoneLegend::default(),
    };
    let config = ExtractConfig {
        filter: args.filter,
        zone_legend,
    };

    let assembler = DocumentAssembler::new()?;
    let Extraction { mut result, report } = assembler
        .assemble(&text, &config)
        .with_context(|| format!("failed to extract entities from {}", args.input.display()))?;
    result.metadata.source_file = Some(args.input.display().to_string());
    result.metadata.source_sha256 = Some(source_sha256);

    report.log_summary();
    if args.strict && report.anomaly_count() > 0 {
        bail!(
            "{} anomalies found in {} and --strict is set; no output written",
            report.anomaly_count(),
            args.input.display()
        );
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("json"));
    if output.as_os_str() == "-" {
        write_json_stdout(&result)?;
    } else {
        write_json_pretty(&output, &result)?;
        info!(path = %output.display(), "wrote entity list");
    }

    if let Some(db_path) = &args.db_path {
        let mut connection = open_index(db_path)?;
        ensure_schema(&connection)?;
        store_result(&mut connection, &result)?;
        info!(path = %db_path.display(), entities = result.entities.len(), "refreshed entity index");
    }

    info!(
        entities = result.metadata.total_entities,
        edition = %result.metadata.edition,
        anomalies = report.anomaly_count(),
        "extract completed"
    );

    Ok(())
}

fn read_source(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| {
        let candidates = similar_files(path);
        if candidates.is_empty() {
            format!("failed to read {}", path.display())
        } else {
            format!(
                "failed to read {}; similar files nearby: {}",
                path.display(),
                candidates.join(", ")
            )
        }
    })
}
