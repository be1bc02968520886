//! Series Journal
//!
//! A personal catalog of watched television series: record entries, search
//! and sort them, and compute statistics over the collection. Persistence is
//! either a local JSON file or a remote `/series` CRUD service.

pub mod catalog;
pub mod core;
pub mod database;
