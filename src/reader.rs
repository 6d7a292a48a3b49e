use crate::error::{Error, Result};
use std::path::Path;
use umya_spreadsheet::Spreadsheet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

/// A bare number selects by 0-based index, anything else by name.
pub fn parse_sheet_selector(selector: &str) -> SheetSelector {
    match selector.trim().parse::<usize>() {
        Ok(idx) => SheetSelector::Index(idx),
        Err(_) => SheetSelector::Name(selector.to_string()),
    }
}

pub fn open_template(path: &Path) -> Result<Spreadsheet> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" => umya_spreadsheet::reader::xlsx::read(path).map_err(|e| {
            Error::InvalidExcel {
                path: path.to_path_buf(),
                details: e.to_string(),
            }
        }),
        _ => Err(Error::UnsupportedFormat(extension)),
    }
}

pub fn sheet_names(workbook: &Spreadsheet) -> Vec<String> {
    workbook
        .get_sheet_collection()
        .iter()
        .map(|s| s.get_name().to_string())
        .collect()
}

pub fn resolve_sheet_index(workbook: &Spreadsheet, selector: &SheetSelector) -> Result<usize> {
    let names = sheet_names(workbook);
    match selector {
        SheetSelector::Index(idx) => {
            if *idx < names.len() {
                Ok(*idx)
            } else {
                Err(Error::SheetIndexOutOfRange {
                    index: *idx,
                    count: names.len(),
                })
            }
        }
        SheetSelector::Name(name) => {
            names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| Error::SheetNotFound {
                    name: name.clone(),
                    available: names.join(", "),
                })
        }
    }
}
