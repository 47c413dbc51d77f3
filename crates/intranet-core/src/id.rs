//! Strongly typed identifiers for intranet entities.
//!
//! Numeric ids mirror the integer primary keys of the relational schema.
//! [`TableId`] names the UI table a saved filter belongs to (`"tasks"`,
//! `"requests"`, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| CoreError::invalid_id($kind, s))
            }
        }
    };
}

numeric_id!(
    /// Primary key of a user row.
    UserId,
    "user"
);
numeric_id!(
    /// Primary key of an organization (tenant).
    OrganizationId,
    "organization"
);
numeric_id!(
    /// Primary key of a role. Roles belong to at most one organization.
    RoleId,
    "role"
);
numeric_id!(
    /// Primary key of a branch.
    BranchId,
    "branch"
);
numeric_id!(
    /// Primary key of a saved filter.
    FilterId,
    "filter"
);
numeric_id!(
    /// Primary key of a filter group.
    FilterGroupId,
    "filter group"
);

/// Identifier of the table a saved filter applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableId(String);

impl TableId {
    /// Create a table id. Blank names are rejected.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(CoreError::invalid_table_id(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TableId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TableId> for String {
    fn from(value: TableId) -> Self {
        value.0
    }
}

impl FromStr for TableId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_parse() {
        assert_eq!("42".parse::<UserId>().unwrap(), UserId::new(42));
        assert_eq!(" 7 ".parse::<BranchId>().unwrap().get(), 7);

        let err = "abc".parse::<OrganizationId>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid organization id: abc");
    }

    #[test]
    fn test_numeric_id_serde_is_transparent() {
        let json = serde_json::to_string(&RoleId::new(3)).unwrap();
        assert_eq!(json, "3");
        let back: RoleId = serde_json::from_str("3").unwrap();
        assert_eq!(back, RoleId::new(3));
    }

    #[test]
    fn test_table_id_rejects_blank() {
        assert!(TableId::new("tasks").is_ok());
        assert!(TableId::new("   ").is_err());
        assert!(serde_json::from_str::<TableId>("\"\"").is_err());
    }
}
