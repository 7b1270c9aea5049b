//! HTML extraction layer: selector configuration, the record extractor, and
//! the product URL collector.
//!
//! The design contract is "try, fallback, sentinel, never abort": a single
//! missing DOM fragment never fails a whole record. Selector knowledge is
//! table data in [`config`], not control flow.

pub mod config;
pub mod context;
pub mod detail;
pub mod error;
pub mod list;

pub use config::{FieldRule, ListPageSelectors, ParsingConfig, ProductPageSelectors};
pub use context::{DetailParseContext, ListParseContext};
pub use detail::{category_from_url, ProductRecordParser};
pub use error::{ExtractError, ExtractResult, ExtractionReport, FieldOutcome, FieldStatus};
pub use list::ProductUrlCollector;
