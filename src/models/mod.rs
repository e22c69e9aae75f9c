//! Data models for the cunli harvester.

mod lookup;
mod region;

pub use lookup::{LookupKey, MappedRow, ReferenceEntry};
pub use region::{HarvestRow, PackedInfoEntry, Region, RegionLevel};
