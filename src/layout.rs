use crate::cell::PageAnchor;
use crate::error::Result;

/// Where things live in the invoice template.
#[derive(Debug, Clone)]
pub struct TemplateLayout {
    pub invoice_number: PageAnchor,
    pub control_number: PageAnchor,
    pub invoice_date: PageAnchor,
    /// Rows between the invoice date and its expiration date.
    pub expiration_row_offset: u32,
    pub expiration_days: u32,
    pub items: ItemsLayout,
    pub max_pages: usize,
    pub control_jump: (u32, u32),
    pub max_repeats_per_date: usize,
}

/// Product line placement within each page.
#[derive(Debug, Clone, Copy)]
pub struct ItemsLayout {
    pub first_page_row: u32,
    pub second_page_row: u32,
    pub start_col: u32,
    pub per_page: usize,
    pub row_step: u32,
}

pub const QTY_COL_OFFSET: u32 = 6;
pub const UNIT_PRICE_COL_OFFSET: u32 = 7;
pub const TOTAL_COL_OFFSET: u32 = 9;

impl TemplateLayout {
    pub fn standard() -> Result<Self> {
        Ok(Self {
            invoice_number: PageAnchor::parse("E10", "E59")?,
            control_number: PageAnchor::parse("K6", "K55")?,
            invoice_date: PageAnchor::parse("K12", "K61")?,
            expiration_row_offset: 1,
            expiration_days: 30,
            items: ItemsLayout {
                first_page_row: 19,
                second_page_row: 68,
                start_col: 2,
                per_page: 9,
                row_step: 2,
            },
            max_pages: 50,
            control_jump: (1, 11),
            max_repeats_per_date: 3,
        })
    }

    /// Pages needed to hold `items` product lines.
    pub fn pages_for(&self, items: usize) -> usize {
        items.div_ceil(self.items.per_page)
    }
}
