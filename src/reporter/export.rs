use std::collections::BTreeSet;
use std::fs;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;
use tera::{Context as TeraContext, Tera};
use tracing::{error, info};

use crate::config::OutputFormat;
use crate::models::{DiscoveryRecord, Severity};
use crate::scanner::ResultSink;

pub fn output_path(base: &str, format: OutputFormat) -> String {
    let ext = format!(".{}", format.extension());
    if base.to_lowercase().ends_with(&ext) {
        base.to_string()
    } else {
        format!("{}{}", base, ext)
    }
}

pub struct JsonExporter;

impl JsonExporter {
    pub fn export(records: &[DiscoveryRecord], path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        fs::write(path, json).with_context(|| format!("Failed to write to {}", path))?;
        Ok(())
    }

    pub fn load(path: &str) -> Result<Vec<DiscoveryRecord>> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;

        let records: Vec<DiscoveryRecord> = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a saved result file", path))?;
        Ok(records)
    }
}

pub struct CsvExporter;

impl CsvExporter {
    pub fn export(records: &[DiscoveryRecord], path: &str) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to write to {}", path))?;

        let columns: Vec<&str> = records
            .iter()
            .flat_map(|r| r.field_names())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        writer.write_record(&columns)?;

        for record in records {
            let row: Vec<String> = columns
                .iter()
                .map(|column| Self::field(record, column))
                .collect();
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn field(record: &DiscoveryRecord, column: &str) -> String {
        match column {
            "url" => record.url.clone(),
            "status" => record.status.map(|s| s.to_string()).unwrap_or_default(),
            "severity" => record.severity().map(|s| s.to_string()).unwrap_or_default(),
            "bypass" => record.technique().unwrap_or_default().to_string(),
            _ => String::new(),
        }
    }
}

pub struct TxtExporter;

impl TxtExporter {
    pub fn export(records: &[DiscoveryRecord], path: &str) -> Result<()> {
        let mut file =
            fs::File::create(path).with_context(|| format!("Failed to write to {}", path))?;

        for line in Self::lines(records) {
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    pub fn lines(records: &[DiscoveryRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| {
                let status = r.status.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string());
                let severity = r.severity().map(|s| s.to_string()).unwrap_or_default();
                format!("{}\t{}\t{}", status, r.url, severity)
            })
            .collect()
    }
}

pub struct HtmlExporter;

impl HtmlExporter {
    pub fn export(records: &[DiscoveryRecord], path: &str) -> Result<()> {
        let html = Self::render(records)?;
        fs::write(path, html).with_context(|| format!("Failed to write to {}", path))?;
        Ok(())
    }

    pub fn render(records: &[DiscoveryRecord]) -> Result<String> {
        let mut tera = Tera::default();
        tera.add_raw_template("report", Self::get_template())?;

        let count = |severity: Severity| {
            records
                .iter()
                .filter(|r| r.severity() == Some(severity))
                .count()
        };

        let mut context = TeraContext::new();
        context.insert("scan_time", &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string());
        context.insert("total", &records.len());
        context.insert("high_count", &count(Severity::High));
        context.insert("medium_count", &count(Severity::Medium));
        context.insert("low_count", &count(Severity::Low));
        context.insert("bypass_count", &records.iter().filter(|r| r.is_bypass()).count());

        let rows: Vec<HtmlRow> = records
            .iter()
            .map(|r| HtmlRow {
                url: r.url.clone(),
                status: r.status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
                finding: match (r.severity(), r.technique()) {
                    (Some(severity), _) => severity.to_string(),
                    (None, Some(technique)) => format!("bypass: {}", technique),
                    (None, None) => String::new(),
                },
                class: r
                    .severity()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "bypass".to_string()),
            })
            .collect();

        context.insert("rows", &rows);

        Ok(tera.render("report", &context)?)
    }

    fn get_template() -> &'static str {
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>PathHunter Scan Report</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #0d1117; color: #c9d1d9; line-height: 1.6; }
        .container { max-width: 1200px; margin: 0 auto; padding: 2rem; }
        h1 { color: #58a6ff; margin-bottom: 0.5rem; }
        .subtitle { color: #8b949e; margin-bottom: 2rem; }
        .summary { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 1rem; margin-bottom: 2rem; }
        .stat { background: #161b22; border: 1px solid #30363d; border-radius: 6px; padding: 1rem; text-align: center; }
        .stat-value { font-size: 2rem; font-weight: bold; }
        .stat-label { color: #8b949e; font-size: 0.875rem; }
        .high .stat-value { color: #f85149; }
        .medium .stat-value { color: #d29922; }
        .low .stat-value { color: #58a6ff; }
        .bypass .stat-value { color: #f0883e; }
        table { width: 100%; border-collapse: collapse; background: #161b22; border: 1px solid #30363d; border-radius: 6px; overflow: hidden; }
        th, td { padding: 0.75rem 1rem; text-align: left; border-bottom: 1px solid #30363d; }
        th { background: #21262d; color: #c9d1d9; font-weight: 600; }
        tr:hover { background: #21262d; }
        .tag { padding: 0.25rem 0.5rem; border-radius: 4px; font-size: 0.75rem; font-weight: 600; }
        .tag.high { background: #f8514933; color: #f85149; }
        .tag.medium { background: #d2992233; color: #d29922; }
        .tag.low { background: #58a6ff33; color: #58a6ff; }
        .tag.bypass { background: #f0883e33; color: #f0883e; }
    </style>
</head>
<body>
    <div class="container">
        <h1>PathHunter Scan Report</h1>
        <p class="subtitle">Generated: {{ scan_time }}</p>

        <div class="summary">
            <div class="stat">
                <div class="stat-value">{{ total }}</div>
                <div class="stat-label">Results</div>
            </div>
            <div class="stat high">
                <div class="stat-value">{{ high_count }}</div>
                <div class="stat-label">High</div>
            </div>
            <div class="stat medium">
                <div class="stat-value">{{ medium_count }}</div>
                <div class="stat-label">Medium</div>
            </div>
            <div class="stat low">
                <div class="stat-value">{{ low_count }}</div>
                <div class="stat-label">Low</div>
            </div>
            <div class="stat bypass">
                <div class="stat-value">{{ bypass_count }}</div>
                <div class="stat-label">Bypasses</div>
            </div>
        </div>

        <table>
            <thead>
                <tr>
                    <th>Status</th>
                    <th>URL</th>
                    <th>Finding</th>
                </tr>
            </thead>
            <tbody>
                {% for row in rows %}
                <tr>
                    <td>{{ row.status }}</td>
                    <td>{{ row.url }}</td>
                    <td><span class="tag {{ row.class }}">{{ row.finding }}</span></td>
                </tr>
                {% endfor %}
            </tbody>
        </table>
    </div>
</body>
</html>"#
    }
}

#[derive(serde::Serialize)]
struct HtmlRow {
    url: String,
    status: String,
    finding: String,
    class: String,
}

pub struct ReportWriter {
    base: String,
    formats: Vec<OutputFormat>,
}

impl ReportWriter {
    pub fn new(base: impl Into<String>, formats: Vec<OutputFormat>) -> Self {
        Self {
            base: base.into(),
            formats,
        }
    }

    pub fn paths(&self) -> Vec<(OutputFormat, String)> {
        self.formats
            .iter()
            .map(|f| (*f, output_path(&self.base, *f)))
            .collect()
    }

    pub fn write(format: OutputFormat, records: &[DiscoveryRecord], path: &str) -> Result<()> {
        match format {
            OutputFormat::Json => JsonExporter::export(records, path),
            OutputFormat::Csv => CsvExporter::export(records, path),
            OutputFormat::Txt => TxtExporter::export(records, path),
            OutputFormat::Html => HtmlExporter::export(records, path),
        }
    }
}

impl ResultSink for ReportWriter {
    fn export(&self, records: &[DiscoveryRecord]) {
        if records.is_empty() {
            info!("No results to save.");
            return;
        }

        for (format, path) in self.paths() {
            match Self::write(format, records, &path) {
                Ok(()) => info!("{} results saved to {}", format.extension().to_uppercase(), path),
                Err(e) => error!("Failed to save {}: {:#}", format.extension().to_uppercase(), e),
            }
        }
    }
}
