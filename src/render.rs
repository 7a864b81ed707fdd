//! Row formatting and markup for the table
//!
//! Every record becomes a [`TableRow`] of six display cells. Rows can then be
//! laid out as HTML (search box, sort buttons, table) or as aligned text.

use crate::{
    constants::{CURRENCY_PREFIX, PERCENT_SUFFIX, SEARCH_PLACEHOLDER},
    types::{MarketRecord, SortDirection, SortDirective, SortField},
};

/// Column titles, in cell order
pub const HEADERS: [&str; 6] = [
    "Image",
    "Name",
    "Symbol",
    "Current Price",
    "Total Volume",
    "% Change (24h)",
];

/// Rendering switches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit a header row with [`HEADERS`]
    pub show_header: bool,
}

/// Sign of the 24h change, which decides its color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTone {
    /// Zero or above
    Positive,
    /// Below zero
    Negative,
    /// No value from the provider
    Missing,
}

impl ChangeTone {
    pub fn color(&self) -> &'static str {
        match self {
            ChangeTone::Positive => "green",
            ChangeTone::Negative => "red",
            ChangeTone::Missing => "inherit",
        }
    }
}

/// Formatted 24h change cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeCell {
    pub text: String,
    pub tone: ChangeTone,
}

/// One rendered table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id: String,
    pub image: String,
    pub name: String,
    pub symbol: String,
    pub price: String,
    pub volume: String,
    pub change: ChangeCell,
}

impl TableRow {
    pub fn from_record(record: &MarketRecord) -> Self {
        Self {
            id: record.id.clone(),
            image: record.image.clone(),
            name: record.name.clone(),
            symbol: record.symbol.clone(),
            price: format_price(record.current_price),
            volume: format_volume(record.total_volume),
            change: format_change(record.price_change_percentage_24h),
        }
    }

    /// Cell texts in column order
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.image,
            &self.name,
            &self.symbol,
            &self.price,
            &self.volume,
            &self.change.text,
        ]
    }
}

/// Builds rows for records, keeping their order
pub fn rows(records: &[MarketRecord]) -> Vec<TableRow> {
    records.iter().map(TableRow::from_record).collect()
}

/// Currency prefix and exactly two decimals: `$50000.00`
pub fn format_price(value: f64) -> String {
    format!("{}{:.2}", CURRENCY_PREFIX, value)
}

/// Currency prefix with thousands grouping: `$31,000,000,000`
pub fn format_volume(value: f64) -> String {
    format!("{}{}", CURRENCY_PREFIX, group_thousands(value))
}

/// Two decimals and a percent sign; a missing value gives an empty cell
pub fn format_change(value: Option<f64>) -> ChangeCell {
    match value {
        Some(pct) => ChangeCell {
            text: format!("{:.2}{}", pct, PERCENT_SUFFIX),
            tone: if pct >= 0.0 {
                ChangeTone::Positive
            } else {
                ChangeTone::Negative
            },
        },
        None => ChangeCell {
            text: String::new(),
            tone: ChangeTone::Missing,
        },
    }
}

/// en-US style grouping with at most three fraction digits
pub fn group_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let digits = int_part.len();
    let mut grouped = String::with_capacity(digits + digits / 3 + frac_part.len() + 2);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !frac_part.is_empty() {
        grouped.push('.');
        grouped.push_str(frac_part);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    if value < 0.0 && !is_zero {
        grouped.insert(0, '-');
    }
    grouped
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn direction_attr(directive: Option<SortDirective>, field: SortField) -> &'static str {
    match directive {
        Some(d) if d.field == field => match d.direction {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        },
        _ => "none",
    }
}

/// Renders the search box, the sort buttons and the table as HTML
pub fn render_html(
    rows: &[TableRow],
    search: &str,
    directive: Option<SortDirective>,
    options: &RenderOptions,
) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"container\">\n");
    html.push_str("  <div class=\"search-sort-container\">\n");
    html.push_str(&format!(
        "    <input type=\"text\" placeholder=\"{}\" value=\"{}\">\n",
        SEARCH_PLACEHOLDER,
        escape_html(search)
    ));
    for field in SortField::with_buttons() {
        html.push_str(&format!(
            "    <button data-sort=\"{}\" data-direction=\"{}\">{}</button>\n",
            field.key(),
            direction_attr(directive, *field),
            field.button_label()
        ));
    }
    html.push_str("  </div>\n  <table>\n");

    if options.show_header {
        html.push_str("    <thead>\n      <tr>");
        for title in HEADERS {
            html.push_str(&format!("<th>{}</th>", escape_html(title)));
        }
        html.push_str("</tr>\n    </thead>\n");
    }

    html.push_str("    <tbody>\n");
    for row in rows {
        html.push_str(&format!(
            "      <tr data-id=\"{}\"><td><img src=\"{}\" alt=\"{}\"></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td style=\"color: {}\">{}</td></tr>\n",
            escape_html(&row.id),
            escape_html(&row.image),
            escape_html(&row.name),
            escape_html(&row.name),
            escape_html(&row.symbol),
            escape_html(&row.price),
            escape_html(&row.volume),
            row.change.tone.color(),
            escape_html(&row.change.text)
        ));
    }
    html.push_str("    </tbody>\n  </table>\n</div>\n");
    html
}

/// Renders rows as an aligned plain-text table
pub fn render_text(rows: &[TableRow], options: &RenderOptions) -> String {
    let mut widths = [0usize; 6];
    if options.show_header {
        for (w, title) in widths.iter_mut().zip(HEADERS) {
            *w = title.chars().count();
        }
    }
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.cells()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let format_line = |cells: [&str; 6]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    if options.show_header {
        lines.push(format_line(HEADERS));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("--"),
        );
    }
    for row in rows {
        lines.push(format_line(row.cells()));
    }

    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}
