use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid Excel file: {path} ({details})")]
    InvalidExcel { path: PathBuf, details: String },

    #[error("failed to write Excel file: {path} ({details})")]
    WriteExcel { path: PathBuf, details: String },

    #[error("sheet \"{name}\" not found (available: {available})")]
    SheetNotFound { name: String, available: String },

    #[error("sheet index {index} out of range (have {count} sheets)")]
    SheetIndexOutOfRange { index: usize, count: usize },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid cell reference: {0}")]
    InvalidCellRef(String),

    #[error("invalid page stride: '{second}' must be below '{first}'")]
    InvalidPageStride { first: String, second: String },

    #[error("{0} is on a weekend, expected a weekday (Mon-Fri)")]
    WeekendDate(NaiveDate),

    #[error("end date {end} is before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("no weekdays between {start} and {end}")]
    NoWeekdays { start: NaiveDate, end: NaiveDate },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "cannot assign {count} pages with max {max_repeats} repeats per date over only \
         {weekdays} weekday(s), maximum possible is {max_possible}"
    )]
    InfeasibleDates {
        count: usize,
        max_repeats: usize,
        weekdays: usize,
        max_possible: usize,
    },

    #[error("no eligible dates left to repeat (every date hit the repeat cap)")]
    RepeatCapExhausted,

    #[error("control number exceeded 6 digits on page {page} ({value}), choose a smaller start")]
    ControlNumberOverflow { page: usize, value: u32 },

    #[error("no products in {0}")]
    NoProducts(PathBuf),

    #[error("input closed while waiting for: {0}")]
    PromptClosed(String),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::FileNotFound(_) => 1,
            Error::InvalidExcel { .. } => 2,
            Error::WriteExcel { .. } => 4,
            Error::SheetNotFound { .. } => 3,
            Error::SheetIndexOutOfRange { .. } => 3,
            Error::UnsupportedFormat(_) => 3,
            Error::InvalidCellRef(_) => 3,
            Error::InvalidPageStride { .. } => 3,
            Error::WeekendDate(_) => 3,
            Error::InvertedRange { .. } => 3,
            Error::NoWeekdays { .. } => 3,
            Error::InvalidInput(_) => 3,
            Error::InfeasibleDates { .. } => 3,
            Error::RepeatCapExhausted => 5,
            Error::ControlNumberOverflow { .. } => 3,
            Error::NoProducts(_) => 3,
            Error::PromptClosed(_) => 1,
            Error::Csv(_) => 4,
            Error::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
