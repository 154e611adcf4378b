/// Chain step definitions for tracking an exchange's crawl progress
///
/// Every exchange walks the same shape of chain: its overview page, then
/// markets pages 1 through k in ascending order, then done.
use std::fmt;

/// Represents the current position in an exchange's page chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainStep {
    /// The exchange's overview page (summary statistics)
    Overview,

    /// A markets page, numbered from 1
    Markets { page: u32 },

    /// All pages visited; the record is ready for emission
    Done,
}

impl ChainStep {
    /// Returns the step that follows this one in a chain with `last_page` markets pages
    ///
    /// A chain with zero markets pages goes straight from the overview to done.
    pub fn next(self, last_page: u32) -> Self {
        match self {
            Self::Overview if last_page == 0 => Self::Done,
            Self::Overview => Self::Markets { page: 1 },
            Self::Markets { page } if page >= last_page => Self::Done,
            Self::Markets { page } => Self::Markets { page: page + 1 },
            Self::Done => Self::Done,
        }
    }

    /// Returns true if no further pages are fetched after this step
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the markets page number, if this is a markets step
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Markets { page } => Some(*page),
            _ => None,
        }
    }
}

impl fmt::Display for ChainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overview => write!(f, "overview"),
            Self::Markets { page } => write!(f, "markets page {}", page),
            Self::Done => write!(f, "done"),
        }
    }
}
