use serde::Deserialize;

use super::deserializers::{deserialize_page, first_page};

pub const QUESTIONS_PER_PAGE: usize = 10;

/// `?page=N`, 1-based.
#[derive(Deserialize, Debug)]
pub struct PageQuery {
    #[serde(default = "first_page", deserialize_with = "deserialize_page")]
    pub page: i64,
}

/// Returns the `page`-th block of [`QUESTIONS_PER_PAGE`] rows, empty when out of range.
pub fn paginate<T>(rows: &[T], page: i64) -> &[T] {
    let Some(index) = page.checked_sub(1).and_then(|i| usize::try_from(i).ok()) else {
        return &[];
    };
    let start = index.saturating_mul(QUESTIONS_PER_PAGE);
    if start >= rows.len() {
        return &[];
    }
    let end = (start + QUESTIONS_PER_PAGE).min(rows.len());
    &rows[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_holds_first_ten() {
        let rows: Vec<u32> = (1..=25).collect();
        assert_eq!(paginate(&rows, 1), (1..=10).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn last_page_is_partial() {
        let rows: Vec<u32> = (1..=25).collect();
        assert_eq!(paginate(&rows, 3), &[21, 22, 23, 24, 25]);
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let rows: Vec<u32> = (1..=20).collect();
        assert!(paginate(&rows, 3).is_empty());
        assert!(paginate(&rows, 1000).is_empty());
        assert!(paginate(&rows, 0).is_empty());
        assert!(paginate(&rows, -1).is_empty());
        assert!(paginate(&rows, i64::MAX).is_empty());
        assert!(paginate::<u32>(&[], 1).is_empty());
    }
}
