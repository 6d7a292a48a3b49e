//! Invoice date generation.
//!
//! Invoice dates are drawn from the weekdays of a user supplied range. The
//! resulting sequence is non-decreasing, so pages read in date order, and a
//! single date is never repeated more than a fixed number of times.

use crate::error::{Error, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::Rng;

/// Inclusive range of invoice dates. Both ends are weekdays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        for date in [start, end] {
            if !is_weekday(date) {
                return Err(Error::WeekendDate(date));
            }
        }
        if end < start {
            return Err(Error::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Ascending weekdays between `start` and `end`, both included.
    pub fn weekdays(&self) -> Vec<NaiveDate> {
        weekdays_in_range(self.start, self.end)
    }
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn weekdays_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_weekday(*d))
        .collect()
}

/// Generate `count` invoice dates within `range`.
///
/// When the range has at least `count` weekdays every date is distinct.
/// Otherwise each weekday is used once and the remaining occurrences are
/// spread with a bell-shaped preference for the middle of the range, never
/// letting a date exceed `max_repeats` occurrences. Repeats of a date are
/// always contiguous.
pub fn generate_invoice_dates<R: Rng + ?Sized>(
    count: usize,
    range: &DateRange,
    max_repeats: usize,
    rng: &mut R,
) -> Result<Vec<NaiveDate>> {
    if count == 0 {
        return Err(Error::InvalidInput("date count must be positive".into()));
    }
    if max_repeats == 0 {
        return Err(Error::InvalidInput(
            "max repeats per date must be positive".into(),
        ));
    }

    let pool = range.weekdays();
    if pool.is_empty() {
        return Err(Error::NoWeekdays {
            start: range.start,
            end: range.end,
        });
    }

    let max_possible = max_repeats.saturating_mul(pool.len());
    if count > max_possible {
        return Err(Error::InfeasibleDates {
            count,
            max_repeats,
            weekdays: pool.len(),
            max_possible,
        });
    }

    if count <= pool.len() {
        let mut chosen = rand::seq::index::sample(rng, pool.len(), count).into_vec();
        chosen.sort_unstable();
        return Ok(chosen.into_iter().map(|i| pool[i]).collect());
    }

    let mut repeats = vec![1usize; pool.len()];
    let weights = bell_weights(pool.len());
    for _ in 0..count - pool.len() {
        let idx = weighted_choice_index(&weights, &repeats, max_repeats, rng)?;
        repeats[idx] += 1;
    }

    let mut dates = Vec::with_capacity(count);
    for (date, times) in pool.iter().zip(&repeats) {
        dates.extend(std::iter::repeat(*date).take(*times));
    }
    Ok(dates)
}

/// Bell-shaped weights over `0..len`, peaking at the middle position.
fn bell_weights(len: usize) -> Vec<f64> {
    let mid = (len as f64 - 1.0) / 2.0;
    let sigma = (len as f64 / 4.0).max(1.0);

    (0..len)
        .map(|i| {
            let x = (i as f64 - mid) / sigma;
            (-0.5 * x * x).exp()
        })
        .collect()
}

/// Pick an index by weight among those still below `max_repeats`.
fn weighted_choice_index<R: Rng + ?Sized>(
    weights: &[f64],
    repeats: &[usize],
    max_repeats: usize,
    rng: &mut R,
) -> Result<usize> {
    let mut eligible = Vec::with_capacity(repeats.len());
    let mut cumulative = Vec::with_capacity(repeats.len());
    let mut total = 0.0;

    for (i, (&weight, &count)) in weights.iter().zip(repeats).enumerate() {
        if count < max_repeats {
            total += weight;
            eligible.push(i);
            cumulative.push(total);
        }
    }

    if eligible.is_empty() {
        return Err(Error::RepeatCapExhausted);
    }

    let target = rng.random::<f64>() * total;
    let bucket = cumulative
        .partition_point(|&c| c <= target)
        .min(eligible.len() - 1);
    Ok(eligible[bucket])
}

/// Expiration date for an invoice: `offset_days` after `invoice_date`,
/// moved forward to the next weekday when it lands on a weekend.
pub fn expiration_date(invoice_date: NaiveDate, offset_days: u32) -> Result<NaiveDate> {
    let out_of_range = || {
        Error::InvalidInput(format!(
            "expiration {} day(s) after {} is out of the supported date range",
            offset_days, invoice_date
        ))
    };

    let mut date = invoice_date
        .checked_add_days(Days::new(u64::from(offset_days)))
        .ok_or_else(out_of_range)?;
    while !is_weekday(date) {
        date = date.succ_opt().ok_or_else(out_of_range)?;
    }
    Ok(date)
}
