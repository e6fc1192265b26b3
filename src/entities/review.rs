//! Review entity - A rating paired with free-text comments.

use crate::entities::Rating;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One customer review. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    rating: Rating,
    comments: String,
}

impl Review {
    /// A review with the given rating and comments.
    #[must_use]
    pub fn new(rating: Rating, comments: impl Into<String>) -> Self {
        Self {
            rating,
            comments: comments.into(),
        }
    }

    /// Star rating given by the reviewer.
    #[must_use]
    pub const fn rating(&self) -> Rating {
        self.rating
    }

    /// Free-text comments.
    #[must_use]
    pub fn comments(&self) -> &str {
        &self.comments
    }
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.rating, self.comments)
    }
}

/// Sorts reviews for display: best rating first, equal ratings keep submission order.
pub fn sort_for_display(reviews: &mut [Review]) {
    // sort_by is stable
    reviews.sort_by(|a, b| b.rating.cmp(&a.rating));
}
