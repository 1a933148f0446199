//! Printable, paginated packing list.
//!
//! Each printed page repeats the header block and lays its items out in two
//! side-by-side tables. Item ids repeated on the same page are highlighted so
//! packers catch split cartons. Only the last page carries the total row.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::Write;

use tracing::debug;

use crate::error::RenderError;
use crate::models::config::HtmlConfig;
use crate::models::record::total_quantity;
use crate::models::{LineRecord, ShipmentParameters};

use super::packing_list::{freight_line, total_cell, tracking_line, weight_line, TABLE_HEADER};
use super::ArtifactKind;

const ARTIFACT: ArtifactKind = ArtifactKind::PackingListHtml;

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
table { border-collapse: collapse; width: 100%; margin-bottom: 10px; }
td, th { padding: 4px 8px; text-align: left; }
.header-info { border: 2px solid #000; background-color: #f8f8f8; }
.freight-info { border: 2px solid #000; background-color: #f8f8f8; }
.page-info { border: 2px solid #000; font-weight: bold; text-align: right; }
.columns { display: flex; gap: 16px; }
.column { flex: 1; }
.data-table { border: 1px solid #000; }
.data-table th { border: 2px solid #000; background-color: #f0f0f0; font-weight: bold; }
.data-table td { border: 1px solid #000; }
.duplicate td { background-color: #ffe08a; font-weight: bold; }
.total-row td { border: 2px solid #000; font-weight: bold; }
.page-break { break-before: page; page-break-before: always; }
@media print { body { margin: 0; } }
";

/// Page geometry of the HTML packing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlLayout {
    /// Items per page; values below 1 are treated as 1.
    pub page_size: usize,
    /// Days between the PO date and the printed arrival code.
    pub arrival_offset_days: i64,
}

impl HtmlLayout {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    fn effective_page_size(&self) -> usize {
        self.page_size.max(1)
    }

    /// Number of pages for `count` records. Zero records still fill one page.
    pub fn page_count(&self, count: usize) -> usize {
        count.div_ceil(self.effective_page_size()).max(1)
    }
}

impl Default for HtmlLayout {
    fn default() -> Self {
        Self {
            page_size: 72,
            arrival_offset_days: 7,
        }
    }
}

impl From<&HtmlConfig> for HtmlLayout {
    fn from(config: &HtmlConfig) -> Self {
        Self {
            page_size: config.page_size,
            arrival_offset_days: config.arrival_offset_days,
        }
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Item ids occurring more than once in `page`.
fn duplicate_ids<R: LineRecord>(page: &[R]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in page {
        *counts.entry(record.item_id()).or_insert(0) += 1;
    }
    counts.retain(|_, n| *n > 1);
    counts
}

/// Write the HTML packing list.
pub fn write_packing_list_html<W: Write, R: LineRecord>(
    mut out: W,
    shipment: &ShipmentParameters,
    records: &[R],
    layout: &HtmlLayout,
) -> Result<(), RenderError> {
    let html = build_document(shipment, records, layout);

    out.write_all(html.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|source| RenderError::Write { artifact: ARTIFACT, source })
}

fn build_document<R: LineRecord>(shipment: &ShipmentParameters, records: &[R], layout: &HtmlLayout) -> String {
    let page_size = layout.effective_page_size();
    let page_count = layout.page_count(records.len());
    let arrival = shipment.shifted_arrival_code(layout.arrival_offset_days);
    let total = total_quantity(records);

    debug!("Rendering {} records on {} HTML pages", records.len(), page_count);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
    let _ = writeln!(
        html,
        "<title>Packing List - {}</title>",
        escape_html(&shipment.date_stamp)
    );
    let _ = write!(html, "<style>\n{}</style>\n</head>\n<body>\n", STYLE);

    let pages: Vec<&[R]> = if records.is_empty() {
        vec![records]
    } else {
        records.chunks(page_size).collect()
    };

    for (i, page) in pages.iter().enumerate() {
        let number = i + 1;
        let class = if i == 0 { "page" } else { "page page-break" };
        let _ = writeln!(html, "<div class=\"{}\">", class);

        write_header(&mut html, shipment, &arrival, number, page_count);

        let duplicates = duplicate_ids(page);
        let (left, right) = page.split_at(page.len().div_ceil(2));

        html.push_str("<div class=\"columns\">\n");
        for column in [left, right] {
            html.push_str("<div class=\"column\">\n");
            if !column.is_empty() {
                write_item_table(&mut html, column, &duplicates);
            }
            html.push_str("</div>\n");
        }
        html.push_str("</div>\n");

        if number == page_count {
            html.push_str("<table class=\"data-table\">\n<tr class=\"total-row\">\n");
            let _ = writeln!(
                html,
                "<td></td>\n<td></td>\n<td>{}</td>\n<td></td>\n<td></td>",
                total_cell(total)
            );
            html.push_str("</tr>\n</table>\n");
        }

        html.push_str("</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn write_header(
    html: &mut String,
    shipment: &ShipmentParameters,
    arrival: &str,
    number: usize,
    page_count: usize,
) {
    html.push_str("<table>\n");
    let _ = writeln!(
        html,
        "<tr><td class=\"header-info\">ARRIVAL#: {}</td></tr>",
        escape_html(arrival)
    );
    html.push_str("<tr><td class=\"header-info\">AMNT:</td></tr>\n");
    html.push_str("<tr><td class=\"header-info\">DATE:</td></tr>\n");
    html.push_str("</table>\n");

    html.push_str("<table>\n");
    for line in [freight_line(shipment), weight_line(shipment), tracking_line(shipment)] {
        let _ = writeln!(
            html,
            "<tr><td class=\"freight-info\">{}</td></tr>",
            escape_html(&line)
        );
    }
    html.push_str("</table>\n");

    html.push_str("<table>\n");
    let _ = writeln!(
        html,
        "<tr><td class=\"header-info\">P.O#: {}</td></tr>",
        escape_html(&shipment.po_code())
    );
    if page_count > 1 {
        let _ = writeln!(
            html,
            "<tr><td class=\"page-info\">PAGE {} OF {}</td></tr>",
            number, page_count
        );
    }
    html.push_str("</table>\n");
}

fn write_item_table<R: LineRecord>(html: &mut String, items: &[R], duplicates: &HashMap<&str, usize>) {
    html.push_str("<table class=\"data-table\">\n<tr>\n");
    for title in TABLE_HEADER {
        if title.is_empty() {
            html.push_str("<th>&nbsp;</th>\n");
        } else {
            let _ = writeln!(html, "<th>{}</th>", escape_html(title));
        }
    }
    html.push_str("</tr>\n");

    for record in items {
        if duplicates.contains_key(record.item_id()) {
            html.push_str("<tr class=\"duplicate\">\n");
        } else {
            html.push_str("<tr>\n");
        }
        let _ = writeln!(
            html,
            "<td>{}</td>\n<td>{}</td>\n<td>{}</td>\n<td></td>\n<td>{}</td>",
            escape_html(record.purchase_order()),
            escape_html(record.item_id()),
            record.quantity(),
            escape_html(record.notes())
        );
        html.push_str("</tr>\n");
    }

    html.push_str("</table>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::testing::FailingSink;
    use crate::models::PackingRecord;
    use pretty_assertions::assert_eq;

    fn shipment() -> ShipmentParameters {
        ShipmentParameters::new("250115")
            .with_tracking("1Z999AA12345678901")
            .with_weight(12.0, 3)
            .with_freight_rate(40.0, 7.2)
    }

    fn records(count: usize) -> Vec<PackingRecord> {
        (0..count)
            .map(|i| PackingRecord::new(format!("PO{:03}", i), format!("{:04}", i), 1, ""))
            .collect()
    }

    fn render(records: &[PackingRecord], layout: &HtmlLayout) -> String {
        let mut out = Vec::new();
        write_packing_list_html(&mut out, &shipment(), records, layout).unwrap();
        String::from_utf8(out).unwrap()
    }

    /// Page bodies, in order.
    fn pages(html: &str) -> Vec<&str> {
        html.split("<div class=\"page").skip(1).collect()
    }

    #[test]
    fn test_page_count() {
        let layout = HtmlLayout::new(72);
        assert_eq!(layout.page_count(0), 1);
        assert_eq!(layout.page_count(72), 1);
        assert_eq!(layout.page_count(73), 2);
        assert_eq!(HtmlLayout::new(0).page_count(3), 3);
    }

    #[test]
    fn test_single_page_has_no_page_label() {
        let html = render(&records(3), &HtmlLayout::default());

        assert_eq!(pages(&html).len(), 1);
        assert!(!html.contains("PAGE 1 OF"));
        assert!(!html.contains("page-break\""));
        assert_eq!(html.matches("TOTAL QTY: 3").count(), 1);
    }

    #[test]
    fn test_pagination_73_records() {
        let html = render(&records(73), &HtmlLayout::default());
        let pages = pages(&html);

        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("PAGE 1 OF 2"));
        assert!(pages[1].contains("PAGE 2 OF 2"));
        assert!(pages[1].starts_with(" page-break\""));

        assert_eq!(pages[0].matches("<td>PO").count(), 72);
        assert_eq!(pages[1].matches("<td>PO").count(), 1);

        assert!(!pages[0].contains("TOTAL QTY"));
        assert!(pages[1].contains("TOTAL QTY: 73"));
        assert_eq!(html.matches("total-row").count(), 2); // stylesheet + last page
    }

    #[test]
    fn test_header_repeats_on_every_page() {
        let html = render(&records(5), &HtmlLayout::new(2));

        for page in pages(&html) {
            assert!(page.contains("ARRIVAL#: XR250122"));
            assert!(page.contains("UPS FREIGHT: 12.0 KG * 40 RMB / 7.20 RATE = $66.67"));
            assert!(page.contains("WEIGHT &amp; BOXES: 12.0 KG || 3 BOXES"));
            assert!(page.contains("UPS TRACKING#: 1Z999AA12345678901"));
            assert!(page.contains("P.O#: W250115"));
        }
    }

    #[test]
    fn test_two_columns_left_gets_ceiling() {
        let html = render(&records(5), &HtmlLayout::default());
        let page = pages(&html)[0];

        let columns: Vec<&str> = page.split("<div class=\"column\">").skip(1).collect();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].matches("<td>PO").count(), 3);
        assert_eq!(columns[1].matches("<td>PO").count(), 2);
    }

    #[test]
    fn test_duplicates_flagged_per_page() {
        let items = vec![
            PackingRecord::new("PO001", "A", 1, ""),
            PackingRecord::new("PO002", "A", 1, ""),
            PackingRecord::new("PO003", "B", 1, ""),
            PackingRecord::new("PO004", "B", 1, ""),
        ];
        let html = render(&items, &HtmlLayout::new(3));
        let pages = pages(&html);

        // A twice on page one; B once per page, so never flagged.
        assert_eq!(pages[0].matches("<tr class=\"duplicate\">").count(), 2);
        assert_eq!(pages[1].matches("<tr class=\"duplicate\">").count(), 0);
    }

    #[test]
    fn test_empty_records_render_one_page() {
        let html = render(&[], &HtmlLayout::default());

        assert_eq!(pages(&html).len(), 1);
        assert!(html.contains("TOTAL QTY: 0"));
        assert!(!html.contains("<td>PO"));
    }

    #[test]
    fn test_text_is_escaped() {
        let items = vec![PackingRecord::new("<PO>", "A&B", 1, "\"fragile\"")];
        let html = render(&items, &HtmlLayout::default());

        assert!(html.contains("<td>&lt;PO&gt;</td>"));
        assert!(html.contains("<td>A&amp;B</td>"));
        assert!(html.contains("<td>&quot;fragile&quot;</td>"));
        assert!(!html.contains("<PO>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&'c\""), "a&lt;b&gt;&amp;&#39;c&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let err = write_packing_list_html(FailingSink, &shipment(), &records(1), &HtmlLayout::default()).unwrap_err();
        assert!(matches!(err, RenderError::Write { artifact: ArtifactKind::PackingListHtml, .. }));
    }
}
