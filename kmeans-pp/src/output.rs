use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};
use kmeans::{FitReport, KmeansParams};
use serde::Serialize;

#[derive(Serialize)]
struct RunSummary<'a> {
    params: &'a KmeansParams,
    report: &'a FitReport,
}

/// Seed identifiers on the first line, then one line per centroid with
/// coordinates at 4 decimals
pub fn format_report(report: &FitReport) -> String {
    let seeds = report.seeds.iter().map(|id| id.to_string()).collect::<Vec<String>>().join(",");
    let centroids: String = report.centroids.iter()
        .map(|centroid| {
            let line = centroid.iter().map(|c| format!("{:.4}", c)).collect::<Vec<String>>().join(",");
            line + "\n"
        })
        .collect();
    format!("{}\n{}", seeds, centroids)
}

pub fn write_json(params: &KmeansParams, report: &FitReport, path: &Path) -> Result<()> {
    let data_file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut data_file = BufWriter::new(data_file);
    serde_json::to_writer_pretty(&mut data_file, &RunSummary { params, report })
        .with_context(|| format!("writing {}", path.display()))?;
    data_file.flush()?;
    log::info!("{:<32}{}", "saved report", path.display());
    Ok(())
}
