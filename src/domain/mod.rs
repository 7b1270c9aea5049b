//! Core domain types for the scraping pipeline.

pub mod product;

pub use product::{
    ProductRecord, RunResult, RunStage, RunStats, NOT_FOUND, PRODUCT_NAME_MISSING, UNIT_NA,
};
