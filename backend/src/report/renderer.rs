//! Stock report renderer
//!
//! Lays out the day's active stock as a paginated table with running totals
//! and a grand-total band. Rows have a fixed height: long text is truncated,
//! never wrapped.

use chrono::FixedOffset;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    coerce_decimal, format_field, format_number, format_rupiah, parse_decimal, truncate,
    StockItem, Supplier,
};

use super::layout::{
    Column, ReportLayout, HEADER_BAND_HEIGHT, PAGE_MARGIN, ROW_HEIGHT, TITLE_BLOCK_HEIGHT,
    TOTAL_BAND_HEIGHT,
};
use super::pdf::{Align, Color, Font, PdfDocument};

/// Maximum characters shown for item and supplier names
pub const NAME_MAX_CHARS: usize = 15;
/// Maximum characters shown for transport notes
pub const NOTE_MAX_CHARS: usize = 30;

/// Remark for depleted items
pub const REMARK_DEPLETED: &str = "Habis";
/// Remark for in-stock items under the stock-opname policy
pub const REMARK_STOCK_OPNAME: &str = "STOK OPNAME";

const HEADER_FILL: Color = Color(70, 130, 180);
const STRIPE_FILL: Color = Color(245, 245, 245);
const TOTAL_FILL: Color = Color(178, 34, 34);

const TITLE_FONT_SIZE: f32 = 16.0;
const PERIOD_FONT_SIZE: f32 = 12.0;
const CELL_FONT_SIZE: f32 = 6.0;
const TOTAL_FONT_SIZE: f32 = 7.0;
const CELL_PADDING: f32 = 5.0;

/// What the remark column says for items that still have stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemarkPolicy {
    StockOpname,
    Blank,
}

impl RemarkPolicy {
    /// Remark for an item with this raw weight. Absent, blank or zero weight
    /// means the lot is depleted.
    pub fn remark(&self, weight_raw: Option<&str>) -> &'static str {
        let depleted = match weight_raw.map(str::trim) {
            None | Some("") => true,
            Some(_) => parse_decimal(weight_raw).is_some_and(|w| w.is_zero()),
        };

        match (depleted, self) {
            (true, _) => REMARK_DEPLETED,
            (false, RemarkPolicy::StockOpname) => REMARK_STOCK_OPNAME,
            (false, RemarkPolicy::Blank) => "",
        }
    }
}

/// Running totals across all rendered rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportTotals {
    pub weight: Decimal,
    pub containers: Decimal,
    pub sacks: Decimal,
}

impl ReportTotals {
    pub fn add(&mut self, item: &StockItem) {
        accumulate(&mut self.weight, item, "weight_kg", item.weight_kg.as_deref());
        accumulate(&mut self.containers, item, "container_count", item.container_count.as_deref());
        accumulate(&mut self.sacks, item, "sack_count", item.sack_count.as_deref());
    }

    fn for_column(&self, column: Column) -> Option<Decimal> {
        match column {
            Column::Weight => Some(self.weight),
            Column::Containers => Some(self.containers),
            Column::Sacks => Some(self.sacks),
            _ => None,
        }
    }
}

/// Add a coerced field to a running total. An addend that would overflow
/// counts as 0 so one outlandish row cannot abort the render.
fn accumulate(total: &mut Decimal, item: &StockItem, field: &str, raw: Option<&str>) {
    let value = coerce_decimal(raw);
    match total.checked_add(value) {
        Some(sum) => *total = sum,
        None => tracing::warn!(
            item = %item.name,
            field,
            value = %value,
            "Total overflowed; value left out of the grand total"
        ),
    }
}

/// A finished report document
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub pages: usize,
    pub rows: usize,
    pub totals: ReportTotals,
}

/// Renders stock items into a PDF table
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    layout: ReportLayout,
    title: String,
    offset: FixedOffset,
}

impl ReportRenderer {
    pub fn new(layout: ReportLayout, title: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            layout,
            title: title.into(),
            offset,
        }
    }

    /// Render `items` (in any order) for the given period label
    pub fn render(&self, items: &[StockItem], period: &str, remark: RemarkPolicy) -> RenderedReport {
        let mut sorted: Vec<&StockItem> = items.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        let mut page = PageWriter {
            doc: PdfDocument::new(self.layout.page),
            layout: &self.layout,
            title: &self.title,
            period,
            y: 0.0,
        };
        page.start_page();

        let spans = self.layout.column_spans();
        let mut totals = ReportTotals::default();

        for (index, item) in sorted.iter().enumerate() {
            page.ensure_room(ROW_HEIGHT);

            if index % 2 == 0 {
                page.doc.fill_rect(
                    self.layout.table_x(),
                    page.y,
                    self.layout.content_width(),
                    ROW_HEIGHT,
                    STRIPE_FILL,
                );
            }

            for (column, x, width) in &spans {
                let value = self.cell(*column, index, item, remark);
                page.doc.text(
                    &value,
                    x + CELL_PADDING,
                    page.y + 7.0,
                    width - 2.0 * CELL_PADDING,
                    Font::Regular,
                    CELL_FONT_SIZE,
                    Color::BLACK,
                    Align::Center,
                );
            }

            totals.add(item);
            page.y += ROW_HEIGHT;
        }

        page.ensure_room(TOTAL_BAND_HEIGHT);
        self.draw_total_band(&mut page, &totals);

        let pages = page.doc.page_count();
        RenderedReport {
            bytes: page.doc.finish(),
            pages,
            rows: sorted.len(),
            totals,
        }
    }

    /// Text of one table cell
    pub fn cell(&self, column: Column, index: usize, item: &StockItem, remark: RemarkPolicy) -> String {
        match column {
            Column::Index => (index + 1).to_string(),
            Column::Name => truncate(&item.name, NAME_MAX_CHARS),
            Column::Size => item.size.clone(),
            Column::Supplier => truncate(
                Supplier::display_name(item.supplier_name.as_deref()),
                NAME_MAX_CHARS,
            ),
            Column::IntakeDate => item
                .created_at
                .with_timezone(&self.offset)
                .format("%Y-%m-%d")
                .to_string(),
            Column::TransportNote => {
                let note = item.transport_note.trim();
                truncate(if note.is_empty() { "-" } else { note }, NOTE_MAX_CHARS)
            }
            Column::Weight => format_field(item.weight_kg.as_deref()),
            Column::Containers => format_field(item.container_count.as_deref()),
            Column::Sacks => format_field(item.sack_count.as_deref()),
            Column::BuyPrice => format_rupiah(item.buy_price.as_deref()),
            Column::SellPrice => format_rupiah(item.sell_price.as_deref()),
            Column::Remark => remark.remark(item.weight_kg.as_deref()).to_string(),
        }
    }

    fn draw_total_band(&self, page: &mut PageWriter<'_>, totals: &ReportTotals) {
        let y = page.y;
        page.doc.fill_rect(
            self.layout.table_x(),
            y,
            self.layout.content_width(),
            TOTAL_BAND_HEIGHT,
            TOTAL_FILL,
        );
        page.doc.text(
            "GRAND TOTAL",
            self.layout.table_x() + CELL_PADDING,
            y + 11.0,
            self.layout.content_width(),
            Font::Bold,
            TOTAL_FONT_SIZE,
            Color::WHITE,
            Align::Left,
        );

        for (column, x, width) in self.layout.column_spans() {
            if let Some(total) = totals.for_column(column) {
                page.doc.text(
                    &format_number(total),
                    x,
                    y + 11.0,
                    width,
                    Font::Bold,
                    TOTAL_FONT_SIZE,
                    Color::WHITE,
                    Align::Center,
                );
            }
        }
        page.y += TOTAL_BAND_HEIGHT;
    }
}

/// Tracks the vertical cursor and redraws header bands on every new page
struct PageWriter<'a> {
    doc: PdfDocument,
    layout: &'a ReportLayout,
    title: &'a str,
    period: &'a str,
    y: f32,
}

impl PageWriter<'_> {
    fn start_page(&mut self) {
        self.doc.add_page();

        let page_width = self.layout.page.width - 2.0 * PAGE_MARGIN;
        self.doc.text(
            self.title,
            PAGE_MARGIN,
            PAGE_MARGIN,
            page_width,
            Font::Bold,
            TITLE_FONT_SIZE,
            Color::BLACK,
            Align::Center,
        );
        self.doc.text(
            &format!("PERIODE {}", self.period),
            PAGE_MARGIN,
            PAGE_MARGIN + 22.0,
            page_width,
            Font::Regular,
            PERIOD_FONT_SIZE,
            Color::BLACK,
            Align::Center,
        );
        self.y = PAGE_MARGIN + TITLE_BLOCK_HEIGHT;

        self.doc.fill_rect(
            self.layout.table_x(),
            self.y,
            self.layout.content_width(),
            HEADER_BAND_HEIGHT,
            HEADER_FILL,
        );
        for (column, x, width) in self.layout.column_spans() {
            self.doc.text(
                column.header(),
                x + CELL_PADDING,
                self.y + 9.0,
                width - 2.0 * CELL_PADDING,
                Font::Bold,
                CELL_FONT_SIZE,
                Color::WHITE,
                Align::Center,
            );
        }
        self.y += HEADER_BAND_HEIGHT;
    }

    /// Start a new page if a band of `height` does not fit on this one
    fn ensure_room(&mut self, height: f32) {
        if self.y + height > self.layout.bottom_limit() {
            self.start_page();
        }
    }
}
