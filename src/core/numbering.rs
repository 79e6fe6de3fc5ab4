use chrono::{Datelike, NaiveDate};

use super::error::NotaError;

/// Gapless document number sequence for one (series, year).
///
/// The tax authority requires sequential, gapless numbering per document
/// series. This struct tracks the next number to issue; the value feeds
/// the 9-digit number field of the access key.
#[derive(Debug, Clone)]
pub struct DocumentNumberSequence {
    series: u16,
    year: i32,
    next: u32,
}

impl DocumentNumberSequence {
    /// Create a new sequence starting at 1.
    pub fn new(series: u16, year: i32) -> Self {
        Self {
            series,
            year,
            next: 1,
        }
    }

    /// Create a sequence continuing from a given number.
    pub fn starting_at(series: u16, year: i32, next: u32) -> Self {
        Self { series, year, next }
    }

    /// Issue the next document number.
    pub fn next_number(&mut self) -> u32 {
        let n = self.next;
        self.next += 1;
        n
    }

    /// Preview the next number without consuming it.
    pub fn peek(&self) -> u32 {
        self.next
    }

    /// The series this sequence numbers.
    pub fn series(&self) -> u16 {
        self.series
    }

    /// The current year of the sequence.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Advance to a new year, resetting the counter to 1.
    pub fn advance_year(&mut self, new_year: i32) -> Result<(), NotaError> {
        if new_year <= self.year {
            return Err(NotaError::Validation(format!(
                "new year {new_year} must be greater than current year {}",
                self.year
            )));
        }
        self.year = new_year;
        self.next = 1;
        Ok(())
    }

    /// Auto-advance year if the given date is in a new year.
    /// Returns true if the year was advanced.
    pub fn auto_advance(&mut self, date: NaiveDate) -> bool {
        if date.year() > self.year {
            self.year = date.year();
            self.next = 1;
            true
        } else {
            false
        }
    }
}
