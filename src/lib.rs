//! Core library for the parts-sandbox command line application.
//!
//! The library exposes high-level orchestration helpers that power the
//! command-line interface as well as the unit tests. The modules are structured
//! to keep responsibilities narrow and composable: spreadsheet IO adapters live
//! under [`parts::sandbox::io`], data representations inside
//! [`parts::sandbox::model`], the persistent alias store in
//! [`parts::sandbox::store`], the batch reconciliation orchestration under
//! [`parts::sandbox::refresh`], and the read-only query surface in
//! [`parts::sandbox::query`].

pub mod parts;

pub use parts::sandbox::{Result, SandboxError, error, io, model, query, refresh, store};
