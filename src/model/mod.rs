//! # Plate Data Model
//!
//! Plain data shared by plates, protocol graphs and the resolver:
//! attribute values, attribute bags, and well addressing.
//!
//! Design rule: this module is pure data. No I/O, no plate state.

pub mod value;
pub mod property_map;
pub mod well;

pub use value::{Value, has_value};
pub use property_map::{Component, PropertyMap, ID, component, describe, matches};
pub use well::{
    FillOrder, Shape, Well,
    well_name, parse_well, index_to_rowcol, rowcol_to_index,
};
