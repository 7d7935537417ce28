//! Source file provider for CSV exports of the report sheet.
//!
//! One CSV file holds one sheet grid, no header row. Files are discovered
//! recursively under a root directory and yielded in path order, which by
//! naming convention is report-date order.
//!
//! An export named `<workbook>__<sheet>.csv` is only taken when `<sheet>` is
//! the configured report sheet; plain `<name>.csv` files are always taken.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use dpr_extract::{Cell, Grid};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    Io { path: PathBuf, message: String },
    Csv { path: PathBuf, message: String },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io { path, message } => write!(f, "io error on {}: {message}", path.display()),
            SourceError::Csv { path, message } => {
                write!(f, "csv error in {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// One loaded sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetFile {
    pub path: PathBuf,
    pub grid: Grid,
}

impl SheetFile {
    pub fn name(&self) -> String {
        self.path.display().to_string()
    }
}

/// Sheet separator in exported file stems.
const SHEET_SEPARATOR: &str = "__";

fn sheet_matches(path: &Path, sheet_name: &str) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    match stem.rsplit_once(SHEET_SEPARATOR) {
        Some((_, sheet)) => sheet == sheet_name,
        None => true,
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Every CSV export of `sheet_name` under `root`, sorted by path.
pub fn discover_csv(root: &Path, sheet_name: &str) -> Result<Vec<PathBuf>, SourceError> {
    let mut out = Vec::new();
    walk(root, &mut out)?;
    out.retain(|p| is_csv(p) && sheet_matches(p, sheet_name));
    out.sort();
    Ok(out)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SourceError> {
    let io = |e: std::io::Error| SourceError::Io {
        path: dir.to_path_buf(),
        message: e.to_string(),
    };
    for entry in fs::read_dir(dir).map_err(io)? {
        let path = entry.map_err(io)?.path();
        if path.is_dir() {
            walk(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Parse CSV content into a grid. Ragged rows are kept as they are.
pub fn parse_csv_grid(content: &str, path: &Path) -> Result<Grid, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(|e| SourceError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        rows.push(rec.iter().map(Cell::from_csv_field).collect());
    }
    Ok(Grid::new(rows))
}

pub fn load_csv_grid(path: &Path) -> Result<SheetFile, SourceError> {
    let content = fs::read_to_string(path).map_err(|e| SourceError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(SheetFile {
        path: path.to_path_buf(),
        grid: parse_csv_grid(&content, path)?,
    })
}

/// Lazily loads the discovered CSV files, one sheet at a time.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    files: std::vec::IntoIter<PathBuf>,
}

impl CsvDirSource {
    pub fn open(root: &Path, sheet_name: &str) -> Result<Self, SourceError> {
        Ok(Self {
            files: discover_csv(root, sheet_name)?.into_iter(),
        })
    }
}

impl Iterator for CsvDirSource {
    type Item = Result<SheetFile, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.files.next().map(|p| load_csv_grid(&p))
    }
}
