//! Scan command
//!
//! Validates every project file below a directory. Files are validated
//! concurrently on the blocking pool; results are reported in path order.

use anyhow::{anyhow, Context as _, Result};
use camino::{Utf8Path, Utf8PathBuf};
use genconf_core::config::is_project_file;
use genconf_core::types::SchemaKind;
use genconf_core::{ConfigValidator, Error, ProjectFile};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use tokio::task::JoinSet;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::{error_rows, Context, ErrorRow};
use crate::cli::ScanArgs;
use crate::output;

/// Outcome for one scanned file
#[derive(Debug, Serialize)]
struct ScanResult {
    path: Utf8PathBuf,
    valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ErrorRow>,
    /// Set when the file could not be read or decoded
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
}

#[derive(Tabled)]
struct ScanRow {
    file: String,
    status: String,
    detail: String,
}

impl From<&ScanResult> for ScanRow {
    fn from(result: &ScanResult) -> Self {
        let (status, detail) = match (&result.failure, result.errors.as_slice()) {
            (Some(failure), _) => ("unreadable".to_string(), failure.clone()),
            (None, []) => ("valid".to_string(), String::new()),
            (None, [first]) => ("invalid".to_string(), first.to_string()),
            (None, [first, rest @ ..]) => (
                "invalid".to_string(),
                format!("{} (+{} more)", first, rest.len()),
            ),
        };

        Self {
            file: result.path.to_string(),
            status,
            detail,
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Project files below `dir`, skipping hidden directories
fn collect_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = entry.with_context(|| format!("Failed to scan {}", dir))?;
        if !entry.file_type().is_file() {
            continue;
        }

        match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) if is_project_file(&path) => files.push(path),
            Ok(_) => {}
            Err(path) => warn!("Skipping non UTF-8 path {}", path.display()),
        }
    }

    files.sort();
    Ok(files)
}

fn check_file(path: Utf8PathBuf, validator: ConfigValidator, kind: SchemaKind) -> ScanResult {
    let outcome = ProjectFile::load(&path).and_then(|project| project.validate(&validator, kind));

    let (errors, failure) = match outcome {
        Ok(_) => (Vec::new(), None),
        Err(Error::Validation(errors)) => (error_rows(&errors), None),
        Err(e) => (Vec::new(), Some(e.to_string())),
    };

    ScanResult {
        valid: errors.is_empty() && failure.is_none(),
        path,
        errors,
        failure,
    }
}

pub async fn run(args: ScanArgs, ctx: &Context) -> Result<()> {
    if !args.dir.is_dir() {
        return Err(anyhow!("{} is not a directory", args.dir));
    }

    let files = collect_files(&args.dir)?;
    if files.is_empty() {
        if args.json {
            println!("[]");
        } else {
            output::warning(&format!("No project files found in {}", args.dir));
        }
        return Ok(());
    }

    debug!(files = files.len(), kind = %args.kind, "scanning project files");
    let progress = (!args.json).then(|| output::progress_bar(files.len() as u64, "Validating"));

    let mut tasks = JoinSet::new();
    for path in files {
        let validator = ctx.validator;
        let kind = args.kind;
        tasks.spawn_blocking(move || check_file(path, validator, kind));
    }

    let mut results = Vec::new();
    while let Some(result) = tasks.join_next().await {
        results.push(result.context("Validation task failed")?);
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    results.sort_by(|a, b| a.path.cmp(&b.path));

    let failed = results.iter().filter(|r| !r.valid).count();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        output::header(&format!("Scanned {} as {} documents", args.dir, args.kind));
        let rows: Vec<ScanRow> = results.iter().map(ScanRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::sharp());
        println!("{}", table);

        if failed == 0 {
            output::success(&format!("All {} file(s) are valid", results.len()));
        } else {
            output::info(&format!(
                "{} of {} file(s) are valid",
                results.len() - failed,
                results.len()
            ));
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} file(s) failed validation", failed));
    }
    Ok(())
}
