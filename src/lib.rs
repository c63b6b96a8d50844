//! Projects Years of Potential Life Lost (YPLL) for U.S. states in a target
//! year, decomposes the projection across the five leading causes of death,
//! and rescales each cause's contribution under user-supplied
//! percentage-change scenarios.
//!
//! Data flow: [`data`] loads the panel table, [`project`] applies the trained
//! regressor ([`model`]) to the target-year rows, [`decompose`] splits state
//! totals across causes by observed death shares, [`scenario`] rescales, and
//! [`summary`] reduces to display metrics. [`engine`] owns the read-only
//! artifacts and the memoized baseline.

#![deny(dead_code)]
#![deny(unused_imports)]

pub mod data;
pub mod decompose;
pub mod engine;
pub mod model;
pub mod project;
pub mod scenario;
pub mod summary;
pub mod types;
