// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Pagination direction and bounds

use serde::{Deserialize, Serialize};

use super::wire::{LogicalTime, WireEvent};

/// Order in which events are paged through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Oldest first
    Asc,
    /// Newest first
    Desc,
}

impl Direction {
    /// Value of the GraphQL `orderBy.direction` argument
    #[must_use]
    pub fn as_graphql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    /// True if `a` comes strictly before `b` in this direction
    #[must_use]
    pub fn precedes(&self, a: LogicalTime, b: LogicalTime) -> bool {
        match self {
            Direction::Asc => a < b,
            Direction::Desc => a > b,
        }
    }
}

/// A position in the log: cursor plus logical time
///
/// The cursor identifies the event; the logical time drives the server-side
/// predicate. Both are needed because logical time alone is not unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryBound {
    /// Opaque cursor of the bounding event
    pub cursor: String,
    /// Logical time of the bounding event
    pub logical_time: LogicalTime,
}

impl QueryBound {
    /// Create a bound from its parts
    pub fn new(cursor: impl Into<String>, logical_time: LogicalTime) -> Self {
        Self {
            cursor: cursor.into(),
            logical_time,
        }
    }

    /// True if `event` is the event this bound points at
    #[must_use]
    pub fn matches(&self, event: &WireEvent) -> bool {
        event.cursor() == self.cursor
    }
}

impl From<&WireEvent> for QueryBound {
    fn from(event: &WireEvent) -> Self {
        Self::new(event.cursor(), event.created_lt)
    }
}

/// A [`QueryBound`] plus whether the bounding event itself is included
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBound {
    /// The bounding position
    pub bound: QueryBound,
    /// Whether the server predicate includes the bounding logical time
    ///
    /// A `to` bound's own event is always cut from the result; only its
    /// siblings at the same logical time depend on this flag.
    pub inclusive: bool,
}

impl PageBound {
    /// Bound whose logical time is excluded from the server predicate
    pub fn exclusive(bound: QueryBound) -> Self {
        Self {
            bound,
            inclusive: false,
        }
    }

    /// Bound whose logical time is included in the server predicate
    pub fn inclusive(bound: QueryBound) -> Self {
        Self {
            bound,
            inclusive: true,
        }
    }

    /// Logical time of the bounding event
    #[must_use]
    pub fn logical_time(&self) -> LogicalTime {
        self.bound.logical_time
    }
}

/// Where a page starts and stops, oriented by a [`Direction`]
///
/// `from` is where reading starts (the newest event for `Desc`, the oldest
/// for `Asc`) and `to` is where it stops. Either side may be open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Reading direction
    pub direction: Direction,
    /// Starting bound
    pub from: Option<PageBound>,
    /// Stopping bound
    pub to: Option<PageBound>,
}

impl Window {
    /// True if `lt` lies inside this window
    #[must_use]
    pub fn contains(&self, lt: LogicalTime) -> bool {
        let after_from = self.from.as_ref().is_none_or(|from| {
            self.direction.precedes(from.logical_time(), lt)
                || (from.inclusive && from.logical_time() == lt)
        });
        let before_to = self.to.as_ref().is_none_or(|to| {
            self.direction.precedes(lt, to.logical_time())
                || (to.inclusive && to.logical_time() == lt)
        });
        after_from && before_to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(lt: u64) -> QueryBound {
        QueryBound::new(format!("c{lt}"), LogicalTime::new(lt))
    }

    #[test]
    fn test_direction_precedes() {
        let (a, b) = (LogicalTime::new(1), LogicalTime::new(2));
        assert!(Direction::Asc.precedes(a, b));
        assert!(!Direction::Asc.precedes(b, a));
        assert!(Direction::Desc.precedes(b, a));
        assert!(!Direction::Desc.precedes(a, a));
    }

    #[test]
    fn test_desc_window_exclusive_bounds() {
        let window = Window {
            direction: Direction::Desc,
            from: Some(PageBound::exclusive(bound(10))),
            to: Some(PageBound::exclusive(bound(5))),
        };

        assert!(!window.contains(LogicalTime::new(10)));
        assert!(window.contains(LogicalTime::new(9)));
        assert!(window.contains(LogicalTime::new(6)));
        assert!(!window.contains(LogicalTime::new(5)));
        assert!(!window.contains(LogicalTime::new(11)));
    }

    #[test]
    fn test_asc_window_inclusive_bounds() {
        let window = Window {
            direction: Direction::Asc,
            from: Some(PageBound::inclusive(bound(5))),
            to: Some(PageBound::inclusive(bound(10))),
        };

        assert!(window.contains(LogicalTime::new(5)));
        assert!(window.contains(LogicalTime::new(10)));
        assert!(!window.contains(LogicalTime::new(4)));
        assert!(!window.contains(LogicalTime::new(11)));
    }

    #[test]
    fn test_open_window_contains_everything() {
        let window = Window {
            direction: Direction::Desc,
            from: None,
            to: None,
        };
        assert!(window.contains(LogicalTime::new(0)));
        assert!(window.contains(LogicalTime::new(u64::MAX)));
    }
}
