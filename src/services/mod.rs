//! Service layer for cunli business logic.
//!
//! Services are independent of the CLI and can be driven from tests or
//! other front ends.

pub mod reconcile;

pub use reconcile::{
    load_overrides, load_reference, reconcile, reconcile_files, ManualOverride, ReconcileInputs,
    ReconcileReport, Reconciliation, ReferenceIndex, VillageLookup,
};
