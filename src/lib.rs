//! cunli - village-level hierarchy harvester and VILLCODE reconciler.
//!
//! Two stages run in sequence: [`scrapers`] crawls the Taipower RangeInfo API
//! into a flat village table, and [`services::reconcile`] joins that table
//! against a reference TopoJSON dataset to attach canonical village codes.

pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod services;
pub mod storage;
pub mod utils;
