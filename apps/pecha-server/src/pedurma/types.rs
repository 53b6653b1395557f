//! Pedurma request types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A durchen page edit submitted from the proofreading UI.
///
/// `image_no` is the scan number of the durchen page and `page_no` its printed
/// page number; the reference bounds name the body pages the durchen page
/// annotates, as typed by the proofreader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedurmaNoteEdit {
    pub image_link: String,
    pub image_no: i64,
    pub page_no: i64,
    pub ref_start_page_no: String,
    pub ref_end_page_no: String,
    pub vol: u32,
}

/// Inclusive range of printed page numbers, `1 <= start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: i64,
    pub end: i64,
}

impl PageRange {
    pub fn pages(&self) -> std::ops::RangeInclusive<i64> {
        self.start..=self.end
    }

    /// Number of pages in the range
    pub fn page_count(&self) -> u64 {
        self.end.abs_diff(self.start) + 1
    }

    /// Reject ranges naming more pages than `limit`
    pub fn within(self, limit: usize) -> Result<Self, RangeError> {
        if self.page_count() > limit as u64 {
            return Err(RangeError::TooWide {
                pages: self.page_count(),
                limit,
            });
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("reference page {0:?} is not a number")]
    NotANumber(String),

    #[error("edit carries no page reference")]
    NoReference,

    #[error("reference page {0} is negative")]
    Negative(i64),

    #[error("reference range {start}..{end} is reversed")]
    Reversed { start: i64, end: i64 },

    #[error("reference range covers {pages} pages, the volume has {limit}")]
    TooWide { pages: u64, limit: usize },
}

impl PedurmaNoteEdit {
    /// Body pages referenced by this edit.
    ///
    /// A bound of `0` means the proofreader left the reference empty.
    pub fn ref_range(&self) -> Result<PageRange, RangeError> {
        let start = parse_bound(&self.ref_start_page_no)?;
        let end = parse_bound(&self.ref_end_page_no)?;
        if start == 0 || end == 0 {
            return Err(RangeError::NoReference);
        }
        if start < 0 || end < 0 {
            return Err(RangeError::Negative(start.min(end)));
        }
        if end < start {
            return Err(RangeError::Reversed { start, end });
        }
        Ok(PageRange { start, end })
    }

    /// Difference between scan numbers and printed page numbers in this volume,
    /// `None` when it does not fit in an `i64`
    pub fn offset(&self) -> Option<i64> {
        self.image_no.checked_sub(self.page_no)
    }
}

fn parse_bound(raw: &str) -> Result<i64, RangeError> {
    raw.trim()
        .parse()
        .map_err(|_| RangeError::NotANumber(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(start: &str, end: &str) -> PedurmaNoteEdit {
        PedurmaNoteEdit {
            image_link: String::new(),
            image_no: 15,
            page_no: 12,
            ref_start_page_no: start.to_string(),
            ref_end_page_no: end.to_string(),
            vol: 1,
        }
    }

    #[test]
    fn test_ref_range() {
        assert_eq!(edit("10", " 12 ").ref_range(), Ok(PageRange { start: 10, end: 12 }));
        assert_eq!(edit("0", "12").ref_range(), Err(RangeError::NoReference));
        assert_eq!(edit("10", "0").ref_range(), Err(RangeError::NoReference));
        assert_eq!(
            edit("ten", "12").ref_range(),
            Err(RangeError::NotANumber("ten".to_string()))
        );
        assert!(edit("", "").ref_range().is_err());
        assert_eq!(
            edit("12", "10").ref_range(),
            Err(RangeError::Reversed { start: 12, end: 10 })
        );
        assert_eq!(edit("-3", "10").ref_range(), Err(RangeError::Negative(-3)));
        assert_eq!(
            edit("99999999999999999999", "1").ref_range(),
            Err(RangeError::NotANumber("99999999999999999999".to_string()))
        );
    }

    #[test]
    fn test_range_width() {
        let range = edit("1", "9223372036854775807").ref_range().unwrap();
        assert_eq!(range.page_count(), 9223372036854775807);
        assert_eq!(
            range.within(400),
            Err(RangeError::TooWide {
                pages: 9223372036854775807,
                limit: 400
            })
        );

        let range = edit("10", "12").ref_range().unwrap();
        assert_eq!(range.page_count(), 3);
        assert_eq!(range.within(3), Ok(range));
    }

    #[test]
    fn test_offset_overflow() {
        let mut overflowing = edit("1", "1");
        overflowing.image_no = i64::MIN;
        overflowing.page_no = 1;
        assert_eq!(overflowing.offset(), None);
    }

    #[test]
    fn test_deserialize_edit() {
        let json = r#"{
            "image_link": "https://iiif.bdrc.io/x.jpg",
            "image_no": 15,
            "page_no": 12,
            "ref_start_page_no": "10",
            "ref_end_page_no": "11",
            "vol": 1
        }"#;
        let edit: PedurmaNoteEdit = serde_json::from_str(json).unwrap();
        assert_eq!(edit.offset(), Some(3));
        assert_eq!(edit.vol, 1);
    }
}
