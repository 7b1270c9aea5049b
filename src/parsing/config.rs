//! Selector configuration for IndiaMART page layouts.
//!
//! The page coupling lives entirely in this data: each field is a
//! (primary selector, optional fallback, sentinel) rule, so layout drift is
//! fixed by editing rule tables rather than extraction control flow.

use serde::{Deserialize, Serialize};

use crate::domain::{NOT_FOUND, PRODUCT_NAME_MISSING};

/// Extraction rule for one record field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRule {
    /// Record field this rule populates.
    pub field: String,
    /// Primary CSS selector.
    pub primary: String,
    /// Optional fallback selector tried when the primary misses.
    pub fallback: Option<String>,
    /// When set, only elements whose text contains this needle match.
    /// Stands in for the XPath `contains(text(), ..)` the site layout needs.
    pub contains: Option<String>,
    /// When set, a value of any other length is rejected to the sentinel.
    pub exact_len: Option<usize>,
    /// Value stored when every lookup fails.
    pub sentinel: String,
}

impl FieldRule {
    fn simple(field: &str, primary: &str) -> Self {
        Self {
            field: field.to_string(),
            primary: primary.to_string(),
            fallback: None,
            contains: None,
            exact_len: None,
            sentinel: NOT_FOUND.to_string(),
        }
    }

    fn with_contains(field: &str, primary: &str, needle: &str) -> Self {
        Self {
            contains: Some(needle.to_string()),
            ..Self::simple(field, primary)
        }
    }
}

/// Selectors for product detail pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPageSelectors {
    /// Product heading rule (primary heading, generic `h1` fallback).
    pub product_name: FieldRule,
    /// Price element; its text is matched against the currency pattern.
    pub price: String,
    /// Price unit element, rendered as `Per {unit}`.
    pub price_unit: String,
    /// Currency-amount pattern applied to the price element text.
    pub price_pattern: String,
    /// Key/value specification table body.
    pub spec_table: String,
    /// Rating value and review-count pair, rendered as `{value} ({count} reviews)`.
    pub rating_value: String,
    pub rating_count: String,
    /// Single-selector supplier and company fields.
    pub supplier_fields: Vec<FieldRule>,
}

impl Default for ProductPageSelectors {
    fn default() -> Self {
        let factsheet = "h4.cmpfvalh4.fs13.bo.mt5";
        Self {
            product_name: FieldRule {
                field: "product_name".to_string(),
                primary: "h1.bo.center-heading.centerHeadHeight".to_string(),
                fallback: Some("h1".to_string()),
                contains: None,
                exact_len: None,
                sentinel: PRODUCT_NAME_MISSING.to_string(),
            },
            price: "span.bo.price-unit".to_string(),
            price_unit: "span.units.pcl76".to_string(),
            price_pattern: r"₹\s*([\d,]+(?:\.\d+)?)".to_string(),
            spec_table: "table tbody".to_string(),
            rating_value: "span.bo.color".to_string(),
            rating_count: "span.tcund".to_string(),
            supplier_fields: vec![
                FieldRule::simple("supplier_name", "div.pdflx1.pdBw.asc h2.fs15"),
                FieldRule::simple("supplier_location", "span.city-highlight"),
                FieldRule {
                    exact_len: Some(15),
                    ..FieldRule::simple("gst_number", "span.fs11.color1")
                },
                FieldRule::with_contains("trustseal_verified", "span.lh11", "TrustSEAL"),
                FieldRule::with_contains("years_experience", "span.fs11", "yrs"),
                FieldRule::with_contains(
                    "response_rate",
                    "span.lh11.fs11.on.color1",
                    "Response Rate",
                ),
                FieldRule::simple("legal_status", factsheet),
                FieldRule::simple(
                    "gst_registration_date",
                    &format!("li#Template3_compfactsheet_1 {factsheet}"),
                ),
                FieldRule::simple(
                    "annual_turnover",
                    &format!("li#Template3_compfactsheet_2 {factsheet}"),
                ),
                FieldRule::simple(
                    "member_since",
                    &format!("li#Template3_compfactsheet_3 {factsheet}"),
                ),
            ],
        }
    }
}

/// Selectors and URL markers for category listing pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPageSelectors {
    /// Hyperlink elements scanned for product detail links.
    pub anchor: String,
    /// Path marker identifying a product detail link.
    pub detail_marker: String,
}

impl Default for ListPageSelectors {
    fn default() -> Self {
        Self {
            anchor: "a[href]".to_string(),
            detail_marker: "/proddetail/".to_string(),
        }
    }
}

/// URL path markers used to derive a record's category.
pub mod markers {
    /// Category listing pages: `/impcat/{category-slug}.html`.
    pub const CATEGORY_LISTING: &str = "impcat";
    /// Product detail pages: `/proddetail/{product}.html`.
    pub const PRODUCT_DETAIL: &str = "proddetail";
    /// Suffix stripped from category slugs.
    pub const PAGE_SUFFIX: &str = ".html";
}

/// Complete parsing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingConfig {
    pub product_page: ProductPageSelectors,
    pub list_page: ListPageSelectors,
}
