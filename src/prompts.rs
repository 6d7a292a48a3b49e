//! Interactive prompts for the values that vary per invoice run.

use crate::dates::{is_weekday, DateRange};
use crate::error::{Error, Result};
use chrono::NaiveDate;
use std::io::{BufRead, Write};

pub const MAX_CONTROL_NUMBER: u32 = 999_999;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// First invoice number, a positive integer.
    pub fn invoice_start(&mut self) -> Result<u32> {
        loop {
            let raw = self.ask("Start invoice number (e.g., 804): ")?;
            match raw.parse::<u32>() {
                Ok(value) if value > 0 => return Ok(value),
                _ => self.say("Please enter a positive integer (e.g., 804).")?,
            }
        }
    }

    /// First control number. Leading zeros are optional.
    pub fn control_start(&mut self) -> Result<u32> {
        loop {
            let raw = self.ask("Start control number (6 digits, e.g., 000968): ")?;
            if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
                self.say("Please enter digits only (e.g., 000968).")?;
                continue;
            }
            match raw.parse::<u32>() {
                Ok(value) if value <= MAX_CONTROL_NUMBER => return Ok(value),
                _ => self.say("Control number must be between 000000 and 999999.")?,
            }
        }
    }

    /// Start and end weekday, asked again as a pair while end < start.
    pub fn date_range(&mut self) -> Result<DateRange> {
        loop {
            let start = self.weekday_date("Start date (DD/MM/YYYY): ")?;
            let end = self.weekday_date("End date (DD/MM/YYYY): ")?;
            match DateRange::new(start, end) {
                Ok(range) => return Ok(range),
                Err(_) => self.say("End date must be the same or after the start date.")?,
            }
        }
    }

    fn weekday_date(&mut self, prompt: &str) -> Result<NaiveDate> {
        loop {
            let raw = self.ask(prompt)?;
            let Some(date) = parse_ddmmyyyy(&raw) else {
                self.say("Invalid date format. Please use DD/MM/YYYY (e.g., 21/01/2026).")?;
                continue;
            };
            if !is_weekday(date) {
                self.say("That date is on a weekend. Please enter a weekday (Mon-Fri).")?;
                continue;
            }
            return Ok(date);
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::PromptClosed(prompt.trim_end().to_string()));
        }
        Ok(line.trim().to_string())
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }
}

/// Parse `DD/MM/YYYY`; day and month may omit the leading zero.
pub fn parse_ddmmyyyy(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().split('/');
    let day = parts.next()?.trim().parse().ok()?;
    let month = parts.next()?.trim().parse().ok()?;
    let year = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
