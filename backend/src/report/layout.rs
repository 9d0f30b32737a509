//! Report layout variants: page orientation, column set and band metrics

use serde::Deserialize;

use super::pdf::PageSize;

/// Page margin on every side
pub const PAGE_MARGIN: f32 = 40.0;
/// Extra horizontal inset of the table inside the page margins
pub const TABLE_MARGIN: f32 = 30.0;
/// Height of the column header band
pub const HEADER_BAND_HEIGHT: f32 = 25.0;
/// Height of one data row
pub const ROW_HEIGHT: f32 = 22.0;
/// Height of the grand-total band
pub const TOTAL_BAND_HEIGHT: f32 = 30.0;
/// Vertical space taken by the title and period lines
pub const TITLE_BLOCK_HEIGHT: f32 = 44.0;

/// Table columns a layout can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Index,
    Name,
    Size,
    Supplier,
    IntakeDate,
    TransportNote,
    Weight,
    Containers,
    Sacks,
    BuyPrice,
    SellPrice,
    Remark,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Index => "NO",
            Column::Name => "NAMA IKAN",
            Column::Size => "SIZE",
            Column::Supplier => "SUPPLIER",
            Column::IntakeDate => "TGL MASUK",
            Column::TransportNote => "NO SURAT",
            Column::Weight => "TOTAL (KG)",
            Column::Containers => "MC",
            Column::Sacks => "KRG",
            Column::BuyPrice => "HARGA BELI",
            Column::SellPrice => "HARGA JUAL",
            Column::Remark => "KET",
        }
    }
}

/// Configured layout choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVariant {
    /// A4 landscape, stock-opname column set
    Landscape,
    /// A4 portrait, adds buy and sell prices
    Portrait,
}

/// Page geometry and column set of a report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub page: PageSize,
    columns: Vec<(Column, f32)>,
}

impl ReportLayout {
    pub fn for_variant(variant: LayoutVariant) -> Self {
        match variant {
            LayoutVariant::Landscape => Self::landscape(),
            LayoutVariant::Portrait => Self::portrait(),
        }
    }

    pub fn landscape() -> Self {
        Self::new(
            PageSize::A4_LANDSCAPE,
            vec![
                (Column::Index, 0.05),
                (Column::Name, 0.15),
                (Column::Size, 0.07),
                (Column::Supplier, 0.14),
                (Column::IntakeDate, 0.09),
                (Column::TransportNote, 0.18),
                (Column::Weight, 0.09),
                (Column::Containers, 0.06),
                (Column::Sacks, 0.06),
                (Column::Remark, 0.11),
            ],
        )
    }

    pub fn portrait() -> Self {
        Self::new(
            PageSize::A4_PORTRAIT,
            vec![
                (Column::Index, 0.05),
                (Column::Name, 0.14),
                (Column::Size, 0.06),
                (Column::Supplier, 0.12),
                (Column::IntakeDate, 0.08),
                (Column::Weight, 0.08),
                (Column::Containers, 0.06),
                (Column::Sacks, 0.06),
                (Column::BuyPrice, 0.09),
                (Column::SellPrice, 0.09),
                (Column::TransportNote, 0.10),
                (Column::Remark, 0.08),
            ],
        )
    }

    /// Build a layout; fractions are normalized so they always fill the table
    pub fn new(page: PageSize, columns: Vec<(Column, f32)>) -> Self {
        let sum: f32 = columns.iter().map(|(_, f)| f.max(0.0)).sum();
        let columns = if sum > 0.0 {
            columns.into_iter().map(|(c, f)| (c, f.max(0.0) / sum)).collect()
        } else {
            columns
        };
        Self { page, columns }
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().map(|(c, _)| *c)
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.iter().any(|(c, _)| *c == column)
    }

    /// Left edge of the table
    pub fn table_x(&self) -> f32 {
        PAGE_MARGIN + TABLE_MARGIN
    }

    /// Width available to the table
    pub fn content_width(&self) -> f32 {
        self.page.width - 2.0 * PAGE_MARGIN - 2.0 * TABLE_MARGIN
    }

    /// Lowest y a band may reach on a page
    pub fn bottom_limit(&self) -> f32 {
        self.page.height - PAGE_MARGIN
    }

    /// (column, x, width) for every column, left to right
    pub fn column_spans(&self) -> Vec<(Column, f32, f32)> {
        let content_width = self.content_width();
        let mut x = self.table_x();
        self.columns
            .iter()
            .map(|(column, fraction)| {
                let width = content_width * fraction;
                let span = (*column, x, width);
                x += width;
                span
            })
            .collect()
    }

    /// Span of one column, if the layout has it
    pub fn span_of(&self, column: Column) -> Option<(f32, f32)> {
        self.column_spans()
            .into_iter()
            .find(|(c, _, _)| *c == column)
            .map(|(_, x, w)| (x, w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_fill_content_width() {
        for layout in [ReportLayout::landscape(), ReportLayout::portrait()] {
            let spans = layout.column_spans();
            let (_, last_x, last_w) = spans[spans.len() - 1];
            let right = last_x + last_w;
            let expected = layout.table_x() + layout.content_width();
            assert!((right - expected).abs() < 0.01);
        }
    }

    #[test]
    fn test_fractions_are_normalized() {
        let layout = ReportLayout::new(
            PageSize::A4_LANDSCAPE,
            vec![(Column::Index, 1.0), (Column::Name, 3.0)],
        );
        let (_, w) = layout.span_of(Column::Name).unwrap();
        assert!((w - layout.content_width() * 0.75).abs() < 0.01);
    }

    #[test]
    fn test_variants() {
        let landscape = ReportLayout::for_variant(LayoutVariant::Landscape);
        assert!(landscape.page.width > landscape.page.height);
        assert!(!landscape.has_column(Column::BuyPrice));
        assert!(landscape.has_column(Column::TransportNote));

        let portrait = ReportLayout::for_variant(LayoutVariant::Portrait);
        assert!(portrait.page.height > portrait.page.width);
        assert!(portrait.has_column(Column::SellPrice));
    }
}
