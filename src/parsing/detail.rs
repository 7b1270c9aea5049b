//! Product detail page extraction.
//!
//! Every field follows the same policy: try the primary selector, then the
//! fallback, then settle on the field's sentinel. A missing DOM fragment
//! never fails the record; each resolution is logged to the
//! [`ExtractionReport`] so misses stay observable.

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::config::{markers, FieldRule, ProductPageSelectors};
use super::context::DetailParseContext;
use super::error::{ExtractError, ExtractResult, ExtractionReport, FieldStatus};
use crate::domain::ProductRecord;

/// Note stored in `specifications` when the table is absent or empty.
const NO_SPECIFICATIONS: (&str, &str) = ("Note", "No specifications found");

/// A field rule with its selectors compiled.
struct CompiledRule {
    field: String,
    primary: Selector,
    fallback: Option<Selector>,
    contains: Option<String>,
    exact_len: Option<usize>,
    sentinel: String,
}

/// Parser turning one rendered product page into a [`ProductRecord`].
pub struct ProductRecordParser {
    name_rule: CompiledRule,
    supplier_rules: Vec<CompiledRule>,
    price_selector: Selector,
    unit_selector: Selector,
    price_pattern: Regex,
    spec_table_selector: Selector,
    row_selector: Selector,
    cell_selector: Selector,
    rating_value_selector: Selector,
    rating_count_selector: Selector,
}

impl ProductRecordParser {
    pub fn new() -> ExtractResult<Self> {
        Self::with_config(&ProductPageSelectors::default())
    }

    pub fn with_config(selectors: &ProductPageSelectors) -> ExtractResult<Self> {
        Ok(Self {
            name_rule: compile_rule(&selectors.product_name)?,
            supplier_rules: selectors
                .supplier_fields
                .iter()
                .map(compile_rule)
                .collect::<ExtractResult<Vec<_>>>()?,
            price_selector: compile(&selectors.price)?,
            unit_selector: compile(&selectors.price_unit)?,
            price_pattern: Regex::new(&selectors.price_pattern)
                .map_err(|e| ExtractError::invalid_pattern(&selectors.price_pattern, e))?,
            spec_table_selector: compile(&selectors.spec_table)?,
            row_selector: compile("tr")?,
            cell_selector: compile("td")?,
            rating_value_selector: compile(&selectors.rating_value)?,
            rating_count_selector: compile(&selectors.rating_count)?,
        })
    }

    /// Extract a record from a rendered product page. Infallible by design:
    /// missing fields degrade to sentinels, never to errors.
    pub fn parse(&self, html: &Html, context: &DetailParseContext) -> (ProductRecord, ExtractionReport) {
        debug!(url = %context.url, "extracting product record");

        let mut record = ProductRecord::skeleton(
            &context.url,
            category_from_url(&context.url),
            chrono::Local::now().format("%Y-%m-%d").to_string(),
        );
        let mut report = ExtractionReport::default();

        self.extract_with_rule(html, &self.name_rule, &mut record, &mut report);
        self.extract_price(html, &mut record, &mut report);
        self.extract_specifications(html, &mut record, &mut report);
        self.extract_rating(html, &mut record, &mut report);
        for rule in &self.supplier_rules {
            self.extract_with_rule(html, rule, &mut record, &mut report);
        }

        if report.defaulted_fields().next().is_some() {
            debug!(
                url = %context.url,
                missing = ?report.defaulted_fields().collect::<Vec<_>>(),
                "fields resolved to sentinels"
            );
        }

        (record, report)
    }

    /// Primary selector, fallback selector, sentinel.
    fn extract_with_rule(
        &self,
        html: &Html,
        rule: &CompiledRule,
        record: &mut ProductRecord,
        report: &mut ExtractionReport,
    ) {
        let (value, status) = match self.lookup(html, &rule.primary, rule.contains.as_deref()) {
            Some(text) => (Some(text), FieldStatus::Extracted),
            None => match &rule.fallback {
                Some(fallback) => match self.lookup(html, fallback, rule.contains.as_deref()) {
                    Some(text) => (Some(text), FieldStatus::FellBack),
                    None => (None, FieldStatus::Defaulted),
                },
                None => (None, FieldStatus::Defaulted),
            },
        };

        // Post-extraction validation can still reject to the sentinel.
        let (value, status) = match (value, rule.exact_len) {
            (Some(text), Some(len)) if text.chars().count() != len => {
                (None, FieldStatus::Defaulted)
            }
            (value, _) => (value, status),
        };

        let final_value = value.unwrap_or_else(|| rule.sentinel.clone());
        assign_field(record, &rule.field, final_value);
        report.record(&rule.field, status);
    }

    /// First matching element with non-empty trimmed text (and, when the
    /// rule asks for it, text containing the expected needle).
    fn lookup(&self, html: &Html, selector: &Selector, contains: Option<&str>) -> Option<String> {
        html.select(selector)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .find(|text| !text.is_empty() && contains.is_none_or(|needle| text.contains(needle)))
    }

    /// Currency amount from the price element, plus the `Per {unit}` suffix.
    fn extract_price(&self, html: &Html, record: &mut ProductRecord, report: &mut ExtractionReport) {
        let amount = self
            .lookup(html, &self.price_selector, None)
            .and_then(|text| {
                self.price_pattern
                    .captures(&text)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().replace(',', ""))
            });

        match amount {
            Some(amount) => {
                record.price = amount;
                report.record("price", FieldStatus::Extracted);

                match self.lookup(html, &self.unit_selector, None) {
                    Some(unit) => {
                        record.price_unit = format!("Per {unit}");
                        report.record("price_unit", FieldStatus::Extracted);
                    }
                    None => {
                        record.price_unit = "Per Unit".to_string();
                        report.record("price_unit", FieldStatus::FellBack);
                    }
                }
            }
            None => {
                // Sentinels already in place from the skeleton.
                report.record("price", FieldStatus::Defaulted);
                report.record("price_unit", FieldStatus::Defaulted);
            }
        }
    }

    /// Key/value rows from the specification table. Rows with fewer than two
    /// cells or blank cells are skipped without aborting the scan.
    fn extract_specifications(
        &self,
        html: &Html,
        record: &mut ProductRecord,
        report: &mut ExtractionReport,
    ) {
        let mut specifications = std::collections::BTreeMap::new();

        if let Some(table) = html.select(&self.spec_table_selector).next() {
            for row in table.select(&self.row_selector) {
                let cells: Vec<_> = row.select(&self.cell_selector).collect();
                if cells.len() < 2 {
                    continue;
                }
                let key = cells[0].text().collect::<String>().trim().to_string();
                let value = cells[1].text().collect::<String>().trim().to_string();
                if key.is_empty() || value.is_empty() {
                    continue;
                }
                specifications.insert(key, value);
            }
        }

        if specifications.is_empty() {
            record.specifications.insert(
                NO_SPECIFICATIONS.0.to_string(),
                NO_SPECIFICATIONS.1.to_string(),
            );
            report.record("specifications", FieldStatus::Defaulted);
        } else {
            record.specifications = specifications;
            report.record("specifications", FieldStatus::Extracted);
        }
    }

    /// Supplier rating is composite: value and review count must both be
    /// present to render `{value} ({count} reviews)`.
    fn extract_rating(&self, html: &Html, record: &mut ProductRecord, report: &mut ExtractionReport) {
        let value = self.lookup(html, &self.rating_value_selector, None);
        let count = self.lookup(html, &self.rating_count_selector, None);

        match (value, count) {
            (Some(value), Some(count)) => {
                record.supplier_rating = format!("{value} ({count} reviews)");
                report.record("supplier_rating", FieldStatus::Extracted);
            }
            _ => report.record("supplier_rating", FieldStatus::Defaulted),
        }
    }
}

/// Derive the record category from its source URL path.
///
/// Category listing URLs yield the title-cased final path segment, product
/// detail URLs yield `"Product Detail"`, anything else `"General"`; URLs
/// that fail to parse yield `"Unknown"`.
pub fn category_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return "Unknown".to_string();
    };
    let path = parsed.path();

    if path.contains(markers::CATEGORY_LISTING) {
        let last = path.trim_matches('/').rsplit('/').next().unwrap_or_default();
        let slug = last.strip_suffix(markers::PAGE_SUFFIX).unwrap_or(last);
        title_case(&slug.replace('-', " "))
    } else if path.contains(markers::PRODUCT_DETAIL) {
        "Product Detail".to_string()
    } else {
        "General".to_string()
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn compile(selector: &str) -> ExtractResult<Selector> {
    Selector::parse(selector).map_err(|e| ExtractError::invalid_selector(selector, e))
}

fn compile_rule(rule: &FieldRule) -> ExtractResult<CompiledRule> {
    Ok(CompiledRule {
        field: rule.field.clone(),
        primary: compile(&rule.primary)?,
        fallback: rule.fallback.as_deref().map(compile).transpose()?,
        contains: rule.contains.clone(),
        exact_len: rule.exact_len,
        sentinel: rule.sentinel.clone(),
    })
}

/// Route a rule's value into the matching record field.
fn assign_field(record: &mut ProductRecord, field: &str, value: String) {
    match field {
        "product_name" => record.product_name = value,
        "supplier_name" => record.supplier_name = value,
        "supplier_location" => record.supplier_location = value,
        "gst_number" => record.gst_number = value,
        "gst_registration_date" => record.gst_registration_date = value,
        "response_rate" => record.response_rate = value,
        "trustseal_verified" => record.trustseal_verified = value,
        "member_since" => record.member_since = value,
        "years_experience" => record.years_experience = value,
        "legal_status" => record.legal_status = value,
        "annual_turnover" => record.annual_turnover = value,
        other => warn!("field rule targets unknown record field '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NOT_FOUND, PRODUCT_NAME_MISSING, UNIT_NA};

    const DETAIL_URL: &str = "https://www.indiamart.com/proddetail/steel-elbow-111.html";

    fn parse(html: &str) -> (ProductRecord, ExtractionReport) {
        let parser = ProductRecordParser::new().unwrap();
        let document = Html::parse_document(html);
        parser.parse(&document, &DetailParseContext::new(DETAIL_URL))
    }

    fn full_page() -> &'static str {
        r#"<html><body>
            <h1 class="bo center-heading centerHeadHeight">Stainless Steel Male Elbow</h1>
            <span class="bo price-unit">₹ 1,250.50</span>
            <span class="units pcl76">Piece</span>
            <table><tbody>
                <tr><td>Material</td><td>SS 304</td></tr>
                <tr><td>Size</td><td>1/2 inch</td></tr>
                <tr><td>Empty</td><td>  </td></tr>
                <tr><td>OnlyOneCell</td></tr>
            </tbody></table>
            <div class="pdflx1 pdBw asc"><h2 class="fs15">Sharma Pipe Fittings</h2></div>
            <span class="city-highlight">Mumbai, Maharashtra</span>
            <span class="fs11 color1">27AABCS1234A1Z5</span>
            <span class="lh11">TrustSEAL Verified</span>
            <span class="fs11">12 yrs</span>
            <span class="bo color">4.3</span>
            <span class="tcund">187</span>
            <span class="lh11 fs11 on color1">92% Response Rate</span>
            <h4 class="cmpfvalh4 fs13 bo mt5">Partnership</h4>
            <li id="Template3_compfactsheet_1"><h4 class="cmpfvalh4 fs13 bo mt5">01-07-2017</h4></li>
            <li id="Template3_compfactsheet_2"><h4 class="cmpfvalh4 fs13 bo mt5">1.5 - 5 Cr</h4></li>
            <li id="Template3_compfactsheet_3"><h4 class="cmpfvalh4 fs13 bo mt5">2014</h4></li>
        </body></html>"#
    }

    #[test]
    fn extracts_every_field_from_a_complete_page() {
        let (record, report) = parse(full_page());

        assert_eq!(record.product_name, "Stainless Steel Male Elbow");
        assert_eq!(record.price, "1250.50");
        assert_eq!(record.price_unit, "Per Piece");
        assert_eq!(record.supplier_name, "Sharma Pipe Fittings");
        assert_eq!(record.supplier_location, "Mumbai, Maharashtra");
        assert_eq!(record.gst_number, "27AABCS1234A1Z5");
        assert_eq!(record.trustseal_verified, "TrustSEAL Verified");
        assert_eq!(record.years_experience, "12 yrs");
        assert_eq!(record.supplier_rating, "4.3 (187 reviews)");
        assert_eq!(record.response_rate, "92% Response Rate");
        assert_eq!(record.legal_status, "Partnership");
        assert_eq!(record.gst_registration_date, "01-07-2017");
        assert_eq!(record.annual_turnover, "1.5 - 5 Cr");
        assert_eq!(record.member_since, "2014");
        assert_eq!(record.category, "Product Detail");
        assert_eq!(record.specifications.get("Material").unwrap(), "SS 304");
        assert_eq!(record.specifications.get("Size").unwrap(), "1/2 inch");
        assert!(!record.specifications.contains_key("Empty"));
        assert_eq!(
            report.status_of("product_name"),
            Some(FieldStatus::Extracted)
        );
    }

    #[test]
    fn missing_price_element_yields_sentinels_without_panic() {
        let (record, report) = parse("<html><body><h1>Unpriced Widget</h1></body></html>");

        assert_eq!(record.price, NOT_FOUND);
        assert_eq!(record.price_unit, UNIT_NA);
        assert_eq!(report.status_of("price"), Some(FieldStatus::Defaulted));
        assert_eq!(report.status_of("price_unit"), Some(FieldStatus::Defaulted));
    }

    #[test]
    fn price_without_unit_element_defaults_to_per_unit() {
        let html = r#"<html><body>
            <h1>Widget</h1>
            <span class="bo price-unit">₹ 99</span>
        </body></html>"#;
        let (record, report) = parse(html);

        assert_eq!(record.price, "99");
        assert_eq!(record.price_unit, "Per Unit");
        assert_eq!(report.status_of("price_unit"), Some(FieldStatus::FellBack));
    }

    #[test]
    fn price_element_without_currency_match_is_not_found() {
        let html = r#"<html><body>
            <span class="bo price-unit">Ask for price</span>
        </body></html>"#;
        let (record, _) = parse(html);

        assert_eq!(record.price, NOT_FOUND);
        assert_eq!(record.price_unit, UNIT_NA);
    }

    #[test]
    fn product_name_falls_back_to_generic_heading() {
        let (record, report) = parse("<html><body><h1>Plain Heading Product</h1></body></html>");
        assert_eq!(record.product_name, "Plain Heading Product");
        assert_eq!(report.status_of("product_name"), Some(FieldStatus::FellBack));
    }

    #[test]
    fn absent_headings_yield_the_rejection_sentinel() {
        let (record, report) = parse("<html><body><p>no headings here</p></body></html>");
        assert_eq!(record.product_name, PRODUCT_NAME_MISSING);
        assert!(record.is_rejected());
        assert_eq!(
            report.status_of("product_name"),
            Some(FieldStatus::Defaulted)
        );
    }

    #[test]
    fn gst_number_must_be_exactly_fifteen_characters() {
        let html = r#"<html><body>
            <span class="fs11 color1">SHORT-GST</span>
        </body></html>"#;
        let (record, report) = parse(html);

        assert_eq!(record.gst_number, NOT_FOUND);
        assert_eq!(report.status_of("gst_number"), Some(FieldStatus::Defaulted));
    }

    #[test]
    fn contains_filter_skips_unrelated_elements() {
        // Several span.fs11 elements; only the one mentioning "yrs" counts.
        let html = r#"<html><body>
            <span class="fs11">something else</span>
            <span class="fs11">8 yrs</span>
        </body></html>"#;
        let (record, _) = parse(html);
        assert_eq!(record.years_experience, "8 yrs");
    }

    #[test]
    fn empty_spec_table_gets_the_note_sentinel() {
        let (record, report) = parse("<html><body><table><tbody></tbody></table></body></html>");
        assert_eq!(
            record.specifications.get("Note").unwrap(),
            "No specifications found"
        );
        assert_eq!(
            report.status_of("specifications"),
            Some(FieldStatus::Defaulted)
        );
    }

    #[test]
    fn category_derivation_three_way() {
        assert_eq!(
            category_from_url("https://dir.indiamart.com/impcat/pipe-fittings.html"),
            "Pipe Fittings"
        );
        assert_eq!(
            category_from_url("https://www.indiamart.com/proddetail/x.html"),
            "Product Detail"
        );
        assert_eq!(
            category_from_url("https://www.indiamart.com/about.html"),
            "General"
        );
        assert_eq!(category_from_url("not a url"), "Unknown");
    }

    #[test]
    fn category_title_cases_mixed_slugs() {
        assert_eq!(
            category_from_url("https://dir.indiamart.com/impcat/STAINLESS-steel-ELBOW.html"),
            "Stainless Steel Elbow"
        );
    }
}
