use crate::cell::{CellRef, PageAnchor};
use crate::dates::{expiration_date, generate_invoice_dates, DateRange};
use crate::error::{Error, Result};
use crate::layout::{
    ItemsLayout, TemplateLayout, QTY_COL_OFFSET, TOTAL_COL_OFFSET, UNIT_PRICE_COL_OFFSET,
};
use crate::products::Product;
use crate::prompts::MAX_CONTROL_NUMBER;
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use ssfmt::{FormatOptions, NumberFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use umya_spreadsheet::structs::Worksheet;
use umya_spreadsheet::Spreadsheet;

pub const DATE_FORMAT: &str = "dd/mm/yyyy";
pub const CONTROL_FORMAT: &str = "000000";
const RED: &str = "FFFF0000";

/// `num_days_from_ce` of 1899-12-30, day zero of Excel's date serials.
const EXCEL_EPOCH_DAYS_FROM_CE: i32 = 693_594;

/// Values that change from one invoice run to the next.
#[derive(Debug, Clone)]
pub struct InvoiceInputs {
    pub invoice_start: u32,
    pub control_start: u32,
    pub date_range: DateRange,
}

/// What was written, page by page.
#[derive(Debug, Clone, PartialEq)]
pub struct FillSummary {
    pub items: usize,
    pub pages: usize,
    pub invoice_numbers: Vec<u32>,
    pub control_numbers: Vec<u32>,
    pub invoice_dates: Vec<NaiveDate>,
}

/// Fill the whole template sheet.
///
/// Numbers and dates are generated before the first cell is touched, so a
/// rejected input leaves the sheet unchanged.
pub fn fill_invoice<R: Rng + ?Sized>(
    sheet: &mut Worksheet,
    products: &[Product],
    inputs: &InvoiceInputs,
    layout: &TemplateLayout,
    rng: &mut R,
) -> Result<FillSummary> {
    let total_pages = layout.pages_for(products.len());
    if total_pages == 0 {
        return Err(Error::InvalidInput("no products to write".into()));
    }
    if inputs.invoice_start == 0 {
        return Err(Error::InvalidInput(
            "invoice start number must be a positive integer".into(),
        ));
    }
    if layout.max_pages == 0 {
        return Err(Error::InvalidInput("max pages must be positive".into()));
    }

    let pages = total_pages.min(layout.max_pages);
    if pages < total_pages {
        warn!(
            total_pages,
            max_pages = layout.max_pages,
            "products span more pages than the template numbers, only the first {} get numbers and dates",
            pages
        );
    }

    let control_numbers = control_numbers(inputs.control_start, pages, layout.control_jump, rng)?;
    let invoice_dates = generate_invoice_dates(
        pages,
        &inputs.date_range,
        layout.max_repeats_per_date,
        rng,
    )?;
    let invoice_numbers = invoice_numbers(inputs.invoice_start, pages)?;
    let dated = invoice_dates
        .iter()
        .map(|d| Ok((*d, expiration_date(*d, layout.expiration_days)?)))
        .collect::<Result<Vec<_>>>()?;
    check_rows(layout, products.len(), pages)?;

    write_products(sheet, products, &layout.items)?;
    write_invoice_numbers(sheet, &layout.invoice_number, &invoice_numbers)?;
    write_control_numbers(sheet, &layout.control_number, &control_numbers)?;
    write_dates(sheet, layout, &dated)?;

    info!(
        items = products.len(),
        pages,
        first_invoice = ?invoice_numbers.first(),
        last_invoice = ?invoice_numbers.last(),
        "filled invoice sheet"
    );

    Ok(FillSummary {
        items: products.len(),
        pages,
        invoice_numbers,
        control_numbers,
        invoice_dates,
    })
}

/// Sequential invoice numbers for `pages` pages starting at `start`.
pub fn invoice_numbers(start: u32, pages: usize) -> Result<Vec<u32>> {
    let last = u32::try_from(pages.saturating_sub(1))
        .ok()
        .and_then(|n| start.checked_add(n))
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "invoice numbers starting at {} overflow over {} page(s)",
                start, pages
            ))
        })?;
    if pages == 0 {
        return Ok(Vec::new());
    }
    Ok((start..=last).collect())
}

/// Make sure the last page's cells still fit in the worksheet.
fn check_rows(layout: &TemplateLayout, items: usize, pages: usize) -> Result<()> {
    if let Some(last_item) = items.checked_sub(1) {
        CellRef::rows_below(item_row(&layout.items, last_item)?, 1)?;
    }
    if let Some(last_page) = pages.checked_sub(1) {
        layout.invoice_number.cell_for_page(last_page)?;
        layout.control_number.cell_for_page(last_page)?;
        let date_cell = layout.invoice_date.cell_for_page(last_page)?;
        CellRef::rows_below(date_cell.row, layout.expiration_row_offset)?;
    }
    Ok(())
}

/// Row distance between the first product line of two pages.
fn items_page_stride(items: &ItemsLayout) -> Result<u32> {
    if items.per_page == 0 {
        return Err(Error::InvalidInput("items per page must be positive".into()));
    }
    if items.second_page_row <= items.first_page_row {
        return Err(Error::InvalidPageStride {
            first: CellRef { col: items.start_col, row: items.first_page_row }.to_string(),
            second: CellRef { col: items.start_col, row: items.second_page_row }.to_string(),
        });
    }
    Ok(items.second_page_row - items.first_page_row)
}

/// Row of the `idx`-th product line.
fn item_row(items: &ItemsLayout, idx: usize) -> Result<u32> {
    let page_stride = items_page_stride(items)?;
    let too_far = || {
        Error::InvalidInput(format!(
            "product {} is past the last worksheet row",
            idx.saturating_add(1)
        ))
    };
    let page = u32::try_from(idx / items.per_page).map_err(|_| too_far())?;
    let slot = u32::try_from(idx % items.per_page).map_err(|_| too_far())?;
    let offset = page
        .checked_mul(page_stride)
        .and_then(|o| o.checked_add(slot.checked_mul(items.row_step)?))
        .ok_or_else(too_far)?;
    CellRef::rows_below(items.first_page_row, offset)
}

/// Write product lines across pages; returns the number of pages used.
pub fn write_products(sheet: &mut Worksheet, products: &[Product], items: &ItemsLayout) -> Result<usize> {
    if products.is_empty() {
        return Err(Error::InvalidInput("no products to write".into()));
    }
    // rows grow with the index, so the last line bounds them all
    CellRef::rows_below(item_row(items, products.len() - 1)?, 1)?;

    for (idx, product) in products.iter().enumerate() {
        let row = item_row(items, idx)?;
        let col = items.start_col;

        sheet
            .get_cell_mut((col, row))
            .set_value_string(product.descripcion.as_str());
        sheet
            .get_cell_mut((col + QTY_COL_OFFSET, row))
            .set_value_number(product.cantidad as f64);
        sheet
            .get_cell_mut((col + UNIT_PRICE_COL_OFFSET, row))
            .set_value_number(product.precio_unitario);
        sheet
            .get_cell_mut((col + TOTAL_COL_OFFSET, row))
            .set_value_number(product.precio_total);
        sheet
            .get_cell_mut((col, row + 1))
            .set_value_string(format!("NUMERO DE PARTE: {}", product.codigo));
    }

    let pages = products.len().div_ceil(items.per_page);
    debug!(items = products.len(), pages, "wrote product lines");
    Ok(pages)
}

pub fn write_invoice_numbers(sheet: &mut Worksheet, anchor: &PageAnchor, numbers: &[u32]) -> Result<()> {
    for (page, number) in numbers.iter().enumerate() {
        let cell = anchor.cell_for_page(page)?;
        sheet
            .get_cell_mut(cell.coordinates())
            .set_value_number(*number as f64);
    }
    Ok(())
}

/// Control numbers for `pages` pages: `start`, then a random jump within
/// `jump` (inclusive) per page. Every number must fit in 6 digits.
pub fn control_numbers<R: Rng + ?Sized>(
    start: u32,
    pages: usize,
    jump: (u32, u32),
    rng: &mut R,
) -> Result<Vec<u32>> {
    let (min_jump, max_jump) = jump;
    if start > MAX_CONTROL_NUMBER {
        return Err(Error::InvalidInput(format!(
            "control start number {} does not fit in 6 digits (0..999999)",
            start
        )));
    }
    if min_jump == 0 || max_jump < min_jump {
        return Err(Error::InvalidInput(format!(
            "invalid jump range {}..={}, ensure 1 <= min <= max",
            min_jump, max_jump
        )));
    }

    let mut numbers = Vec::with_capacity(pages);
    let mut current = start;
    for page in 0..pages {
        if current > MAX_CONTROL_NUMBER {
            return Err(Error::ControlNumberOverflow {
                page: page + 1,
                value: current,
            });
        }
        numbers.push(current);
        current = current.saturating_add(rng.random_range(min_jump..=max_jump));
    }
    Ok(numbers)
}

pub fn write_control_numbers(sheet: &mut Worksheet, anchor: &PageAnchor, numbers: &[u32]) -> Result<()> {
    for (page, number) in numbers.iter().enumerate() {
        let cell = sheet.get_cell_mut(anchor.cell_for_page(page)?.coordinates());
        cell.set_value_number(*number as f64);

        let style = cell.get_style_mut();
        style.get_number_format_mut().set_format_code(CONTROL_FORMAT);
        style.get_font_mut().get_color_mut().set_argb(RED);
    }
    Ok(())
}

/// Invoice date per page, its expiration date below it.
pub fn write_dates(
    sheet: &mut Worksheet,
    layout: &TemplateLayout,
    dated: &[(NaiveDate, NaiveDate)],
) -> Result<()> {
    for (page, (date, expires)) in dated.iter().enumerate() {
        let inv = layout.invoice_date.cell_for_page(page)?;
        let exp = CellRef {
            col: inv.col,
            row: CellRef::rows_below(inv.row, layout.expiration_row_offset)?,
        };

        write_date(sheet, inv, *date);
        write_date(sheet, exp, *expires);
    }
    Ok(())
}

fn write_date(sheet: &mut Worksheet, at: CellRef, date: NaiveDate) {
    let cell = sheet.get_cell_mut(at.coordinates());
    cell.set_value_number(excel_serial(date));
    cell.get_style_mut()
        .get_number_format_mut()
        .set_format_code(DATE_FORMAT);
}

/// Excel (1900 system) serial number of `date`.
pub fn excel_serial(date: NaiveDate) -> f64 {
    (date.num_days_from_ce() - EXCEL_EPOCH_DAYS_FROM_CE) as f64
}

/// Save the finished workbook as `<prefix>_<timestamp>.xlsx` in `output_dir`.
pub fn save_invoice(book: &Spreadsheet, output_dir: &Path, prefix: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let mut path = output_dir.join(format!("{}_{}.xlsx", prefix, timestamp));
    let mut n = 2;
    while path.exists() {
        path = output_dir.join(format!("{}_{}_{}.xlsx", prefix, timestamp, n));
        n += 1;
    }

    umya_spreadsheet::writer::xlsx::write(book, &path).map_err(|e| Error::WriteExcel {
        path: path.clone(),
        details: e.to_string(),
    })?;
    Ok(path)
}

/// Page header cells as the spreadsheet would display them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePreview {
    pub page: usize,
    pub invoice_number: String,
    pub control_number: String,
    pub invoice_date: String,
    pub expiration_date: String,
}

pub fn preview(sheet: &Worksheet, layout: &TemplateLayout, pages: usize) -> Result<Vec<PagePreview>> {
    let opts = FormatOptions::default();
    (0..pages)
        .map(|page| {
            let date_cell = layout.invoice_date.cell_for_page(page)?;
            let exp_cell = CellRef {
                col: date_cell.col,
                row: CellRef::rows_below(date_cell.row, layout.expiration_row_offset)?,
            };
            Ok(PagePreview {
                page: page + 1,
                invoice_number: formatted_value(sheet, layout.invoice_number.cell_for_page(page)?, &opts),
                control_number: formatted_value(sheet, layout.control_number.cell_for_page(page)?, &opts),
                invoice_date: formatted_value(sheet, date_cell, &opts),
                expiration_date: formatted_value(sheet, exp_cell, &opts),
            })
        })
        .collect()
}

/// Get a cell's value rendered through its number format.
fn formatted_value(sheet: &Worksheet, at: CellRef, opts: &FormatOptions) -> String {
    let Some(cell) = sheet.get_cell(at.coordinates()) else {
        return String::new();
    };

    let raw_value = cell.get_value();
    if raw_value.is_empty() {
        return String::new();
    }

    let format_code = cell
        .get_style()
        .get_number_format()
        .map(|nf| nf.get_format_code())
        .unwrap_or("General");

    let fmt = match NumberFormat::parse(format_code) {
        Ok(f) => f,
        Err(_) => return raw_value.to_string(),
    };

    if let Ok(num) = raw_value.parse::<f64>() {
        return fmt.format(num, opts);
    }
    fmt.format_text(&raw_value, opts)
}
