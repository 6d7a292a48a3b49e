use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Last row of an xlsx worksheet.
pub const MAX_ROW: u32 = 1_048_576;

/// A1-style cell reference, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub col: u32,
    pub row: u32,
}

impl CellRef {
    /// Parse A1 notation (e.g., "K6", "AB10") into column and row.
    pub fn parse(cell: &str) -> Result<Self> {
        let cell = cell.trim().to_uppercase();
        let invalid = || Error::InvalidCellRef(cell.clone());

        // Find where letters end and digits begin
        let col_end = cell
            .chars()
            .position(|c| !c.is_ascii_uppercase())
            .ok_or_else(invalid)?;

        let col_str = &cell[..col_end];
        let row_str = &cell[col_end..];
        if col_str.is_empty() || row_str.is_empty() || !row_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        // Convert column letters to number (A=1, B=2, ..., Z=26, AA=27, etc.)
        let col = col_str.chars().try_fold(0u32, |acc, c| {
            acc.checked_mul(26)?.checked_add(c as u32 - 'A' as u32 + 1)
        });
        let col = col.ok_or_else(invalid)?;

        let row: u32 = row_str.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }

        Ok(Self { col, row })
    }

    /// Cell `rows` below `row`, if that still fits in a worksheet.
    pub fn rows_below(row: u32, rows: u32) -> Result<u32> {
        row.checked_add(rows)
            .filter(|r| *r <= MAX_ROW)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "row {} + {} is past the last worksheet row ({})",
                    row, rows, MAX_ROW
                ))
            })
    }

    /// (col, row) as umya-spreadsheet expects it.
    pub fn coordinates(&self) -> (u32, u32) {
        (self.col, self.row)
    }
}

impl FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut n = self.col;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        let col: String = letters.into_iter().rev().collect();
        write!(f, "{}{}", col, self.row)
    }
}

/// The same template cell on page 1 and page 2.
///
/// Every later page repeats the layout at the same row distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageAnchor {
    first: CellRef,
    stride: u32,
}

impl PageAnchor {
    pub fn new(first: CellRef, second: CellRef) -> Result<Self> {
        if second.row <= first.row {
            return Err(Error::InvalidPageStride {
                first: first.to_string(),
                second: second.to_string(),
            });
        }
        Ok(Self {
            first,
            stride: second.row - first.row,
        })
    }

    pub fn parse(first: &str, second: &str) -> Result<Self> {
        Self::new(CellRef::parse(first)?, CellRef::parse(second)?)
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Cell for the 0-based `page`.
    pub fn cell_for_page(&self, page: usize) -> Result<CellRef> {
        let offset = u32::try_from(page)
            .ok()
            .and_then(|p| p.checked_mul(self.stride))
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "page {} is past the last worksheet row",
                    page.saturating_add(1)
                ))
            })?;
        Ok(CellRef {
            col: self.first.col,
            row: CellRef::rows_below(self.first.row, offset)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_a1_notation() {
        assert_eq!(CellRef::parse("A1").unwrap().coordinates(), (1, 1));
        assert_eq!(CellRef::parse("K6").unwrap().coordinates(), (11, 6));
        assert_eq!(CellRef::parse("Z1").unwrap().coordinates(), (26, 1));
        assert_eq!(CellRef::parse("AA1").unwrap().coordinates(), (27, 1));
        assert_eq!(CellRef::parse(" ab10 ").unwrap().coordinates(), (28, 10));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "K", "6", "6K", "K0", "K-6", "K6A", "K 6"] {
            assert!(
                matches!(CellRef::parse(bad), Err(Error::InvalidCellRef(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_display_round_trips_letters() {
        assert_eq!(CellRef { col: 11, row: 55 }.to_string(), "K55");
        assert_eq!(CellRef { col: 27, row: 1 }.to_string(), "AA1");
        assert_eq!(CellRef { col: 52, row: 3 }.to_string(), "AZ3");
    }

    #[test]
    fn test_page_anchor_stride() {
        let anchor = PageAnchor::parse("K6", "K55").unwrap();
        assert_eq!(anchor.stride(), 49);
        assert_eq!(anchor.cell_for_page(0).unwrap(), CellRef { col: 11, row: 6 });
        assert_eq!(anchor.cell_for_page(2).unwrap(), CellRef { col: 11, row: 104 });
    }

    #[test]
    fn test_page_anchor_stops_at_last_row() {
        let anchor = PageAnchor::parse("K6", "K55").unwrap();
        // 6 + 21399 * 49 = 1_048_557, the next page starts past the limit
        assert_eq!(anchor.cell_for_page(21_399).unwrap().row, 1_048_557);
        assert!(matches!(anchor.cell_for_page(21_400), Err(Error::InvalidInput(_))));
        assert!(matches!(anchor.cell_for_page(usize::MAX), Err(Error::InvalidInput(_))));
        assert_eq!(CellRef::rows_below(MAX_ROW - 1, 1).unwrap(), MAX_ROW);
        assert!(CellRef::rows_below(MAX_ROW, 1).is_err());
        assert!(CellRef::rows_below(u32::MAX, 1).is_err());
    }

    #[test]
    fn test_page_anchor_rejects_non_positive_stride() {
        assert!(matches!(
            PageAnchor::parse("K55", "K6"),
            Err(Error::InvalidPageStride { .. })
        ));
        assert!(matches!(
            PageAnchor::parse("E10", "E10"),
            Err(Error::InvalidPageStride { .. })
        ));
    }
}
