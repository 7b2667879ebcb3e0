//! Input plates from CSV tables.
//!
//! One file per plate. The header names a `well` column, an `id` column and
//! any number of other attributes; the file stem becomes the plate name.
//!
//! ```text
//! well,id,plasmid
//! A1,p1,pSB1C3
//! B1,p2,pSB1C3
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::model::*;
use crate::storage::{Plate, PlateRegistry};
use crate::{Error, Result};

/// More rows than this selects a 384-well plate.
pub const PLATE_96_ROWS: usize = 96;

const WELL: &str = "well";

/// Read one plate table.
pub fn plate_from_table(path: impl AsRef<Path>) -> Result<Plate> {
    let path = path.as_ref();
    let name = plate_name(path);
    let mut reader = csv::Reader::from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_owned()).collect();
    let well_col = headers.iter().position(|h| h == WELL).ok_or_else(|| Error::InvalidTable {
        path: path.display().to_string(),
        reason: format!("no '{WELL}' column"),
    })?;
    if !headers.iter().any(|h| h == ID) {
        return Err(Error::MissingIdentifier { plate: name });
    }

    let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
    let shape = if records.len() > PLATE_96_ROWS { Shape::PLATE_384 } else { Shape::PLATE_96 };

    let properties: Vec<&str> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != well_col)
        .map(|(_, h)| h.as_str())
        .collect();
    let mut plate = Plate::with_layout(&name, shape, FillOrder::DownColumns, &properties)?;

    for record in &records {
        let well = record.get(well_col).unwrap_or_default().trim();
        let mut component = Component::new();
        for (i, header) in headers.iter().enumerate() {
            if i == well_col {
                continue;
            }
            let cell = record.get(i).unwrap_or_default();
            let value = if header == ID {
                // ids are always strings, even when they look numeric
                Value::String(cell.trim().to_owned())
            } else {
                Value::from_cell(cell)
            };
            component.insert(header.clone(), value);
        }
        plate.add(&component, Some(well))?;
    }

    info!(plate = %name, rows = records.len(), "imported plate table");
    Ok(plate)
}

/// Every `*.csv` under `dir`, recursively, in path order.
pub fn load_input_plates(dir: impl AsRef<Path>) -> Result<PlateRegistry> {
    let mut files = Vec::new();
    collect_csv(dir.as_ref(), &mut files)?;
    files.sort();

    let mut registry = PlateRegistry::new();
    for file in files {
        let plate = plate_from_table(&file)?;
        debug!(path = %file.display(), plate = plate.name(), "loaded input plate");
        registry.insert(plate);
    }
    Ok(registry)
}

fn collect_csv(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_csv(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "csv") {
            out.push(path);
        }
    }
    Ok(())
}

/// File name up to the first `.`.
fn plate_name(path: &Path) -> String {
    let file = path.file_name().map(|f| f.to_string_lossy()).unwrap_or_default();
    file.split('.').next().unwrap_or_default().to_owned()
}
