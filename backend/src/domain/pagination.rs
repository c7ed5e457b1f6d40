//! Offset pagination shared by list endpoints.

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest page a caller may request; larger requests are clamped.
pub const MAX_LIMIT: u32 = 100;

/// Rejected pagination input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    #[error("limit must be at least 1")]
    ZeroLimit,
}

/// Offset window over an ordered result set.
///
/// # Examples
/// ```
/// use backpacker_connect::domain::PageRequest;
///
/// let page = PageRequest::new(None, Some(500)).unwrap();
/// assert_eq!(page.skip(), 0);
/// assert_eq!(page.limit(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    skip: u32,
    limit: u32,
}

impl PageRequest {
    /// Apply defaults and clamp `limit` to [`MAX_LIMIT`].
    pub fn new(skip: Option<u32>, limit: Option<u32>) -> Result<Self, PageRequestError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        Ok(Self {
            skip: skip.unwrap_or(0),
            limit: limit.min(MAX_LIMIT),
        })
    }

    pub fn skip(&self) -> u32 {
        self.skip
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Slice an already ordered in-memory sequence.
    pub fn window<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(usize::try_from(self.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}
