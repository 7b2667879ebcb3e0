//! CSV export — plates and worklists.
//!
//! ```text
//! Plate    → <dir>/<plate>.csv     well,id,<attr>...   one row per well
//! Worklist → <dir>/<writer>.csv    src_well,src_plate,dst_well,dst_plate,volume,src_id,dst_id
//! ```
//!
//! A plate file has the same layout `import::plate_from_table` reads, so an
//! output plate can seed a later run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::graph::Worklist;
use crate::model::Well;
use crate::storage::Plate;
use crate::Result;

/// Write every well of `plate`, empty ones included, row by row.
pub fn write_plate(plate: &Plate, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.csv", plate.name()));
    let mut writer = csv::Writer::from_path(&path)?;

    let mut header = vec!["well".to_owned()];
    header.extend(plate.properties().iter().cloned());
    writer.write_record(&header)?;

    let shape = plate.shape();
    for row in 0..shape.rows {
        for col in 0..shape.cols {
            let props = plate.get(row, col)?;
            let mut record = vec![Well::new(row, col).name()];
            record.extend(
                plate
                    .properties()
                    .iter()
                    .map(|key| props.get(key).map(|v| v.to_cell()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }
    }

    writer.flush()?;
    debug!(path = %path.display(), "wrote plate");
    Ok(path)
}

/// Write one row per transfer, in worklist order.
pub fn write_worklist(worklist: &Worklist, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.csv", worklist.name));
    let mut writer = csv::Writer::from_path(&path)?;
    for entry in worklist {
        writer.serialize(entry)?;
    }
    if worklist.is_empty() {
        writer.write_record(WORKLIST_HEADER)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), entries = worklist.len(), "wrote worklist");
    Ok(path)
}

const WORKLIST_HEADER: [&str; 7] = [
    "src_well", "src_plate", "dst_well", "dst_plate", "volume", "src_id", "dst_id",
];

impl Plate {
    /// Serialize this plate to `<dir>/<name>.csv`.
    pub fn to_csv(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        write_plate(self, dir.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::WorklistEntry;
    use crate::import::plate_from_table;
    use crate::model::{component, Value};
    use crate::storage::{place, PlateRegistry};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plate_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut plate = Plate::new("out");
        let mut c = component("p1");
        c.insert("conc".into(), Value::Int(5));
        plate.add(&c, None).unwrap();
        plate.add(&component("p2"), Some("A2")).unwrap();

        let path = plate.to_csv(dir.path()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(path.file_name().unwrap(), "out.csv");
        assert_eq!(lines.len(), 1 + 96);
        assert_eq!(lines[0], "well,id,conc");
        assert_eq!(lines[1], "A1,p1,5");
        assert_eq!(lines[2], "A2,p2,");
        assert_eq!(lines[3], "A3,,");
    }

    #[test]
    fn test_plate_csv_reimports() {
        let dir = tempfile::tempdir().unwrap();
        let mut plate = Plate::new("round");
        plate.add(&component("x"), Some("B3")).unwrap();
        plate.add_line(&component("buffer")).unwrap();

        let path = plate.to_csv(dir.path()).unwrap();
        let back = plate_from_table(&path).unwrap();
        assert_eq!(back.get_all(), plate.get_all());
    }

    #[test]
    fn test_reimported_plate_still_matches_floats() {
        let dir = tempfile::tempdir().unwrap();
        let mut buffer = component("buffer");
        buffer.insert("conc".into(), Value::Float(2.0));

        let mut plates = PlateRegistry::new();
        let first = place(&buffer, "reagents", true, &mut plates, None).unwrap();
        let path = plates.get("reagents").unwrap().to_csv(dir.path()).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("A1,buffer,2.0"));

        let mut again: PlateRegistry = [plate_from_table(&path).unwrap()].into_iter().collect();
        let second = place(&buffer, "reagents", true, &mut again, None).unwrap();
        assert_eq!(second, first);
        assert_eq!(again.get("reagents").unwrap().find(&buffer).len(), 8);
    }

    #[test]
    fn test_worklist_csv() {
        let dir = tempfile::tempdir().unwrap();
        let worklist = Worklist {
            name: "qc".into(),
            entries: vec![WorklistEntry {
                src_well: "H12".into(),
                src_plate: "reagents".into(),
                dst_well: "H12".into(),
                dst_plate: "qc".into(),
                volume: 2.0,
                src_id: "ladder".into(),
                dst_id: "ladder_product".into(),
            }],
        };

        let path = write_worklist(&worklist, dir.path()).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(
            text,
            "src_well,src_plate,dst_well,dst_plate,volume,src_id,dst_id\n\
             H12,reagents,H12,qc,2.0,ladder,ladder_product\n"
        );
    }

    #[test]
    fn test_empty_worklist_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_worklist(&Worklist::new("empty"), dir.path()).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text.trim_end(), WORKLIST_HEADER.join(","));
    }
}
