//! Outcome wrappers for account queries.

/// Result of a lookup that ran to completion.
///
/// `Absent` means the query succeeded and the account does not exist; it is
/// never used to signal a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Findable<T> {
    Found(T),
    Absent,
}

impl<T> Findable<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Absent => None,
        }
    }

    pub fn into_result(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Absent => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Findable<U> {
        match self {
            Self::Found(value) => Findable::Found(f(value)),
            Self::Absent => Findable::Absent,
        }
    }
}

impl<T> From<Option<T>> for Findable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Found)
    }
}

/// State of a query that may not be runnable yet.
///
/// A query is `Disabled` when one of its required inputs is still unknown;
/// no fetch is issued and no error is raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState<T> {
    Disabled,
    Ready(T),
}

impl<T> QueryState<T> {
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Disabled => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        match self {
            Self::Ready(value) => QueryState::Ready(f(value)),
            Self::Disabled => QueryState::Disabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_findable_from_option() {
        assert_eq!(Findable::from(Some(3)), Findable::Found(3));
        assert_eq!(Findable::<u8>::from(None), Findable::Absent);
        assert_eq!(Findable::Found(2).map(|v| v * 2).into_result(), Some(4));
        assert!(!Findable::<u8>::Absent.is_found());
    }

    #[test]
    fn test_query_state() {
        assert!(QueryState::<u8>::Disabled.is_disabled());
        assert_eq!(QueryState::Ready(1).map(|v| v + 1).ready(), Some(2));
        assert_eq!(QueryState::<u8>::Disabled.ready(), None);
    }
}
