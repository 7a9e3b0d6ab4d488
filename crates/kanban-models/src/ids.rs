//! Type-safe ID wrappers for server-assigned identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate ID newtypes with common functionality.
///
/// The REST gateway assigns integer ids; the newtype keeps a `TaskId`
/// from being passed where a `ColumnId` is expected.
macro_rules! define_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw server id.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw server id.
            pub const fn get(self) -> i64 {
                self.0
            }

            /// Human readable kind, used in log fields and error messages.
            pub const fn kind() -> &'static str {
                $label
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }
    };
}

define_id!(BoardId, "board");
define_id!(ColumnId, "column");
define_id!(TaskId, "task");
define_id!(LabelId, "label");
define_id!(CommentId, "comment");
define_id!(UserId, "user");
