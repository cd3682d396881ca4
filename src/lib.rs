//! Cragflat - OpenBeta climb exporter
//!
//! This crate turns the OpenBeta area tree into a flat Parquet table through:
//! - A GraphQL client that walks countries and splits oversized regions
//! - A per-row flattener projecting nested climbs onto fixed scalar columns
//! - Optional row filtering by country and discipline
//! - An Arrow-backed Parquet writer with export statistics

pub mod climb_model;
pub mod config;
pub mod flattener;
pub mod openbeta_client;
pub mod parquet_writer;
pub mod row_filter;
