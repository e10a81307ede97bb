//! Page numbering and query parsing shared by the ad and response listings.

use crate::error::{BoardError, BoardResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// One page of a listing, serialized as the body of listing endpoints.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub this_page: usize,
    pub page_count: usize,
    pub item_count: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.this_page < self.page_count
    }

    pub fn has_previous(&self) -> bool {
        self.this_page > 1
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            this_page: self.this_page,
            page_count: self.page_count,
            item_count: self.item_count,
        }
    }
}

/// Converts a 1-based page number into the paginator's 0-based index.
///
/// Pages past the end are not found, except page 1 of an empty listing.
pub fn page_index(page: usize, page_count: usize) -> BoardResult<usize> {
    if page == 0 || (page > page_count && page != 1) {
        return Err(BoardError::NotFound("Page"));
    }
    Ok(page - 1)
}

/// Reads an optional query value, treating `key=` like an absent key.
///
/// Submitted filter forms send every field, blank or not.
pub fn deserialize_blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// `?page=` of a listing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub page: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Filter {
        #[serde(default, deserialize_with = "deserialize_blank_as_none")]
        ad: Option<i32>,
        #[serde(default, deserialize_with = "deserialize_blank_as_none")]
        accepted: Option<bool>,
    }

    fn parse(query: &str) -> Option<Filter> {
        actix_web::web::Query::<Filter>::from_query(query)
            .ok()
            .map(|q| q.into_inner())
    }

    #[test]
    fn test_blank_query_values_are_absent() {
        let filter = parse("ad=&accepted=").unwrap();
        assert_eq!(filter.ad, None);
        assert_eq!(filter.accepted, None);

        let filter = parse("").unwrap();
        assert_eq!(filter.ad, None);
        assert_eq!(filter.accepted, None);

        let filter = parse("ad=7&accepted=true").unwrap();
        assert_eq!(filter.ad, Some(7));
        assert_eq!(filter.accepted, Some(true));

        assert!(parse("ad=seven").is_none());
    }

    #[test]
    fn test_page_index() {
        assert_eq!(page_index(1, 0).unwrap(), 0);
        assert_eq!(page_index(1, 3).unwrap(), 0);
        assert_eq!(page_index(3, 3).unwrap(), 2);
        assert!(matches!(page_index(4, 3), Err(BoardError::NotFound(_))));
        assert!(matches!(page_index(0, 3), Err(BoardError::NotFound(_))));
        assert!(matches!(page_index(2, 0), Err(BoardError::NotFound(_))));
    }

    #[test]
    fn test_page_navigation() {
        let page = Page {
            items: vec![1, 2],
            this_page: 2,
            page_count: 3,
            item_count: 12,
        };
        assert!(page.has_next());
        assert!(page.has_previous());

        let doubled = page.map(|n| n * 2);
        assert_eq!(doubled.items, vec![2, 4]);
        assert_eq!(doubled.this_page, 2);
    }
}
