//! A named, fixed-size grid of wells.
//!
//! Each well holds an attribute bag. Sequential allocation walks the
//! plate's [`FillOrder`] from a cursor that never moves backwards:
//!
//! - `add` without a well writes at the first empty index at or after the cursor.
//! - `add_line` writes a whole line at the first empty, line-aligned
//!   position at or after the cursor.
//! - `add` with an explicit well writes there and leaves the cursor alone.
//!
//! Sequential allocation never lands on an occupied well, so an explicitly
//! pinned well (a ladder in `H12`, say) is never overwritten and never
//! exhausts the plate.

use std::fmt;

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::model::*;
use crate::{Error, Result};

/// Wells written by one `add_line` call. A line is at most 24 wells.
pub type Line = SmallVec<[Well; 24]>;

#[derive(Debug, Clone, PartialEq)]
pub struct Plate {
    name: String,
    shape: Shape,
    order: FillOrder,
    /// Attribute columns, `id` always among them.
    properties: Vec<String>,
    /// Storage index is `row * cols + col`, independent of `order`.
    wells: Vec<PropertyMap>,
    /// Next free linear index under `order`.
    next: usize,
}

impl Plate {
    /// An empty 96-well plate filled down columns, with only an `id` column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: Shape::PLATE_96,
            order: FillOrder::DownColumns,
            properties: vec![ID.to_owned()],
            wells: vec![PropertyMap::new(); Shape::PLATE_96.capacity()],
            next: 0,
        }
    }

    /// A plate with explicit dimensions, order and attribute columns.
    /// `properties` must contain `id`; an empty list means `["id"]`.
    /// The shape needs at least one row and column and at most 26 rows.
    pub fn with_layout(
        name: impl Into<String>,
        shape: Shape,
        order: FillOrder,
        properties: &[&str],
    ) -> Result<Self> {
        let name = name.into();
        if !shape.is_addressable() {
            return Err(Error::InvalidShape {
                plate: name,
                rows: shape.rows,
                cols: shape.cols,
            });
        }
        let properties: Vec<String> = if properties.is_empty() {
            vec![ID.to_owned()]
        } else {
            properties.iter().map(|p| (*p).to_owned()).collect()
        };
        if !properties.iter().any(|p| p == ID) {
            return Err(Error::MissingIdentifier { plate: name });
        }
        Ok(Self {
            name,
            shape,
            order,
            properties,
            wells: vec![PropertyMap::new(); shape.capacity()],
            next: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn order(&self) -> FillOrder {
        self.order
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    /// The allocation cursor.
    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Linear index of a well under this plate's order.
    pub fn index_of(&self, well: Well) -> usize {
        rowcol_to_index(well.row, well.col, self.shape, self.order)
    }

    /// Well at a linear index under this plate's order.
    pub fn well_at(&self, idx: usize) -> Well {
        let (row, col) = index_to_rowcol(idx, self.shape, self.order);
        Well::new(row, col)
    }

    // ========================================================================
    // Raw access
    // ========================================================================

    /// Write every attribute of `component` into (row, col) and advance the
    /// cursor past that well if it was at or beyond it.
    pub fn set(&mut self, component: &Component, row: usize, col: usize) -> Result<()> {
        let slot = self.slot(row, col)?;
        self.write(slot, component);
        self.next = self.next.max(rowcol_to_index(row, col, self.shape, self.order) + 1);
        Ok(())
    }

    /// Attributes present at (row, col). Absent attributes are omitted.
    pub fn get(&self, row: usize, col: usize) -> Result<PropertyMap> {
        let slot = self.slot(row, col)?;
        Ok(present(&self.wells[slot]))
    }

    pub fn get_by_well(&self, well_name: &str) -> Result<PropertyMap> {
        let well = Well::parse(well_name, self.shape)?;
        self.get(well.row, well.col)
    }

    /// Every non-empty well, scanned row by row (A1, A2, … B1, …).
    pub fn get_all(&self) -> Vec<(Well, PropertyMap)> {
        let mut out = Vec::new();
        for row in 0..self.shape.rows {
            for col in 0..self.shape.cols {
                let props = present(&self.wells[row * self.shape.cols + col]);
                if !props.is_empty() {
                    out.push((Well::new(row, col), props));
                }
            }
        }
        out
    }

    pub fn is_occupied(&self, well: Well) -> bool {
        self.shape.contains(well.row, well.col)
            && self.wells[well.row * self.shape.cols + well.col]
                .values()
                .any(Value::has_value)
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    /// Place a component.
    ///
    /// With a well name the component is written there and the cursor is not
    /// touched, even when that well lies at or past the cursor. Use [`set`]
    /// for a write that does advance it. Without a well name the component
    /// goes to the next empty well along the fill order, so pinned wells are
    /// skipped rather than overwritten. Either way the well written is
    /// returned.
    ///
    /// [`set`]: Plate::set
    pub fn add(&mut self, component: &Component, well_name: Option<&str>) -> Result<Well> {
        if let Some(name) = well_name {
            let well = Well::parse(name, self.shape)?;
            let slot = self.slot(well.row, well.col)?;
            let existing = self.wells[slot].get(ID).filter(|v| v.has_value());
            if let (Some(old), Some(new)) = (existing, component.get(ID)) {
                if old != new {
                    warn!(plate = %self.name, %well, %old, %new, "explicit placement over occupied well");
                }
            }
            self.write(slot, component);
            return Ok(well);
        }

        let capacity = self.shape.capacity();
        let idx = (self.next..capacity)
            .find(|&idx| !self.is_occupied(self.well_at(idx)))
            .ok_or_else(|| Error::PlateFull {
                plate: self.name.clone(),
                capacity,
            })?;

        let well = self.well_at(idx);
        self.set(component, well.row, well.col)?;
        Ok(well)
    }

    /// Fill one whole line (a column under `DownColumns`, a row under
    /// `AcrossRows`) with copies of `component`.
    ///
    /// The line starts at `ceil(cursor / len) * len`, skipping forward a line
    /// at a time past lines that already hold anything.
    pub fn add_line(&mut self, component: &Component) -> Result<Line> {
        let len = self.order.line_len(self.shape);
        let capacity = self.shape.capacity();
        let full = || Error::PlateFull {
            plate: self.name.clone(),
            capacity,
        };
        if len == 0 {
            return Err(full());
        }

        let mut start = self.next.div_ceil(len) * len;
        while start + len <= capacity
            && (start..start + len).any(|idx| self.is_occupied(self.well_at(idx)))
        {
            start += len;
        }
        if start + len > capacity {
            return Err(full());
        }

        let mut line = Line::new();
        for idx in start..start + len {
            let well = self.well_at(idx);
            self.set(component, well.row, well.col)?;
            line.push(well);
        }
        debug!(plate = %self.name, start = %self.well_at(start), len, "allocated line");
        Ok(line)
    }

    /// Wells whose attributes match every key of `criteria`, row by row.
    pub fn find(&self, criteria: &PropertyMap) -> Vec<Well> {
        self.get_all()
            .into_iter()
            .filter(|(_, props)| matches(criteria, props))
            .map(|(well, _)| well)
            .collect()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn slot(&self, row: usize, col: usize) -> Result<usize> {
        if !self.shape.contains(row, col) {
            return Err(Error::InvalidAddress {
                address: format!("row {row}, col {col}"),
                reason: format!(
                    "outside {}x{} plate '{}'",
                    self.shape.rows, self.shape.cols, self.name
                ),
            });
        }
        Ok(row * self.shape.cols + col)
    }

    fn write(&mut self, slot: usize, component: &Component) {
        let mut new_keys: Vec<&String> = component
            .keys()
            .filter(|key| !self.properties.contains(key))
            .collect();
        new_keys.sort();
        self.properties.extend(new_keys.into_iter().cloned());

        for (key, val) in component {
            self.wells[slot].insert(key.clone(), val.clone());
        }
    }
}

fn present(props: &PropertyMap) -> PropertyMap {
    props
        .iter()
        .filter(|(_, v)| v.has_value())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Plate '{}' ({}x{}, {:?})",
            self.name, self.shape.rows, self.shape.cols, self.order
        )?;
        for (well, props) in self.get_all() {
            writeln!(f, "  {well}: {}", describe(&props))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(wells: &[Well]) -> Vec<String> {
        wells.iter().map(Well::name).collect()
    }

    #[test]
    fn test_new_plate_defaults() {
        let plate = Plate::new("out");
        assert_eq!(plate.shape(), Shape::PLATE_96);
        assert_eq!(plate.order(), FillOrder::DownColumns);
        assert_eq!(plate.properties(), ["id".to_string()]);
        assert_eq!(plate.next_index(), 0);
        assert!(plate.get_all().is_empty());
    }

    #[test]
    fn test_layout_requires_id() {
        let err = Plate::with_layout("bad", Shape::PLATE_96, FillOrder::DownColumns, &["name"])
            .unwrap_err();
        assert!(matches!(err, Error::MissingIdentifier { ref plate } if plate == "bad"));

        let ok = Plate::with_layout("ok", Shape::PLATE_96, FillOrder::DownColumns, &[]).unwrap();
        assert_eq!(ok.properties(), ["id".to_string()]);
    }

    #[test]
    fn test_layout_rejects_unaddressable_shape() {
        for shape in [Shape::new(30, 1), Shape::new(0, 12), Shape::new(8, 0)] {
            let err = Plate::with_layout("odd", shape, FillOrder::DownColumns, &[]).unwrap_err();
            assert!(matches!(err, Error::InvalidShape { ref plate, .. } if plate == "odd"));
        }
        let widest = Plate::with_layout("z", Shape::new(26, 48), FillOrder::AcrossRows, &[]).unwrap();
        assert_eq!(widest.well_at(widest.shape().capacity() - 1).name(), "Z48");
    }

    #[test]
    fn test_set_and_get() {
        let mut plate = Plate::new("p");
        plate.set(&component("a"), 2, 11).unwrap();
        assert_eq!(plate.get(2, 11).unwrap(), component("a"));
        assert_eq!(plate.get_by_well("C12").unwrap(), component("a"));
        assert_eq!(plate.next_index(), 11 * 8 + 2 + 1);
        assert!(plate.get(8, 0).is_err());
    }

    #[test]
    fn test_set_merges_attributes() {
        let mut plate = Plate::new("p");
        plate.set(&component("a"), 0, 0).unwrap();
        let mut extra = PropertyMap::new();
        extra.insert("conc".into(), Value::Float(2.5));
        plate.set(&extra, 0, 0).unwrap();

        let got = plate.get(0, 0).unwrap();
        assert_eq!(got.get("id"), Some(&Value::from("a")));
        assert_eq!(got.get("conc"), Some(&Value::Float(2.5)));
        assert_eq!(plate.properties(), ["id".to_string(), "conc".to_string()]);
    }

    #[test]
    fn test_get_omits_absent_values() {
        let mut plate = Plate::new("p");
        let mut c = component("a");
        c.insert("note".into(), Value::Null);
        c.insert("conc".into(), Value::Float(f64::NAN));
        plate.set(&c, 0, 0).unwrap();
        assert_eq!(plate.get(0, 0).unwrap(), component("a"));
    }

    #[test]
    fn test_sequential_add_follows_order() {
        let mut down = Plate::new("down");
        let mut across =
            Plate::with_layout("across", Shape::PLATE_96, FillOrder::AcrossRows, &["id"]).unwrap();

        let d: Vec<Well> = (0..3).map(|i| down.add(&component(format!("x{i}")), None).unwrap()).collect();
        let a: Vec<Well> = (0..3).map(|i| across.add(&component(format!("x{i}")), None).unwrap()).collect();

        assert_eq!(names(&d), ["A1", "B1", "C1"]);
        assert_eq!(names(&a), ["A1", "A2", "A3"]);
        assert_eq!(down.next_index(), 3);
    }

    #[test]
    fn test_explicit_add_leaves_cursor() {
        let mut plate = Plate::new("p");
        let well = plate.add(&component("ladder"), Some("H12")).unwrap();
        assert_eq!(well.name(), "H12");
        assert_eq!(plate.next_index(), 0);

        let next = plate.add(&component("s1"), None).unwrap();
        assert_eq!(next.name(), "A1");
    }

    #[test]
    fn test_sequential_add_skips_occupied() {
        let mut plate = Plate::new("p");
        plate.add(&component("pinned"), Some("B1")).unwrap();
        assert_eq!(plate.add(&component("s1"), None).unwrap().name(), "A1");
        assert_eq!(plate.add(&component("s2"), None).unwrap().name(), "C1");
        assert_eq!(plate.get_by_well("B1").unwrap(), component("pinned"));
    }

    #[test]
    fn test_explicit_add_rejects_bad_well() {
        let mut plate = Plate::new("p");
        assert!(matches!(
            plate.add(&component("a"), Some("Z1")),
            Err(Error::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_plate_full() {
        let mut plate = Plate::with_layout("tiny", Shape::new(2, 2), FillOrder::DownColumns, &[]).unwrap();
        for i in 0..4 {
            plate.add(&component(format!("x{i}")), None).unwrap();
        }
        let err = plate.add(&component("overflow"), None).unwrap_err();
        assert!(matches!(err, Error::PlateFull { capacity: 4, .. }));
    }

    #[test]
    fn test_add_line_aligns_down_columns() {
        let mut plate = Plate::new("p");
        for i in 0..5 {
            plate.add(&component(format!("s{i}")), None).unwrap();
        }
        let line = plate.add_line(&component("buffer")).unwrap();
        assert_eq!(line.len(), 8);
        assert_eq!(line[0].name(), "A2");
        assert_eq!(line[7].name(), "H2");
        assert_eq!(plate.next_index(), 16);
    }

    #[test]
    fn test_add_line_aligns_across_rows() {
        let mut plate =
            Plate::with_layout("p", Shape::PLATE_96, FillOrder::AcrossRows, &["id"]).unwrap();
        for i in 0..5 {
            plate.add(&component(format!("s{i}")), None).unwrap();
        }
        let line = plate.add_line(&component("buffer")).unwrap();
        assert_eq!(line.len(), 12);
        assert_eq!(line[0].name(), "B1");
        assert_eq!(line[11].name(), "B12");
    }

    #[test]
    fn test_add_line_on_aligned_cursor() {
        let mut plate = Plate::new("p");
        let first = plate.add_line(&component("a")).unwrap();
        let second = plate.add_line(&component("b")).unwrap();
        assert_eq!(first[0].name(), "A1");
        assert_eq!(second[0].name(), "A2");
    }

    #[test]
    fn test_add_line_skips_line_with_pinned_well() {
        let mut plate = Plate::new("p");
        plate.add(&component("ladder"), Some("D1")).unwrap();
        let line = plate.add_line(&component("buffer")).unwrap();
        assert_eq!(line[0].name(), "A2");
        assert_eq!(plate.get_by_well("D1").unwrap(), component("ladder"));
    }

    #[test]
    fn test_add_line_full() {
        let mut plate = Plate::with_layout("tiny", Shape::new(2, 2), FillOrder::DownColumns, &[]).unwrap();
        plate.add_line(&component("a")).unwrap();
        plate.add_line(&component("b")).unwrap();
        assert!(matches!(plate.add_line(&component("c")), Err(Error::PlateFull { .. })));
    }

    #[test]
    fn test_find_exact() {
        let mut plate = Plate::new("p");
        plate.add(&component("X"), None).unwrap();
        plate.add(&component("Y"), None).unwrap();
        let mut other = PropertyMap::new();
        other.insert("name".into(), Value::from("X"));
        plate.add(&other, None).unwrap();
        plate.add(&component("X"), Some("A2")).unwrap();

        assert_eq!(names(&plate.find(&component("X"))), ["A1", "A2"]);
        assert!(plate.find(&component("Z")).is_empty());
    }

    #[test]
    fn test_display_lists_wells() {
        let mut plate = Plate::new("p");
        plate.add(&component("a"), None).unwrap();
        let text = plate.to_string();
        assert!(text.contains("Plate 'p' (8x12"));
        assert!(text.contains("A1: {id: a}"));
    }
}
