use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// The document collections held by the data store.
///
/// Collection names are part of the storage key format (`collection/id`)
/// and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Academy,
    Teacher,
    Course,
    Category,
    Section,
    Lesson,
    Review,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Academy,
        Collection::Teacher,
        Collection::Course,
        Collection::Category,
        Collection::Section,
        Collection::Lesson,
        Collection::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Academy => "academy",
            Self::Teacher => "teacher",
            Self::Course => "course",
            Self::Category => "category",
            Self::Section => "section",
            Self::Lesson => "lesson",
            Self::Review => "review",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Collection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "academy" => Ok(Self::Academy),
            "teacher" => Ok(Self::Teacher),
            "course" => Ok(Self::Course),
            "category" => Ok(Self::Category),
            "section" => Ok(Self::Section),
            "lesson" => Ok(Self::Lesson),
            "review" => Ok(Self::Review),
            other => Err(CoreError::invalid_collection(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn round_trips_through_str() {
        for c in Collection::ALL {
            assert_eq!(Collection::from_str(c.as_str()).unwrap(), c);
        }
    }

    #[test]
    fn rejects_unknown_collection() {
        let err = Collection::from_str("invoice").unwrap_err();
        assert!(matches!(err, CoreError::InvalidCollection(_)));
    }
}
