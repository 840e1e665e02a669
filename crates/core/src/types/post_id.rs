use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostId(i64);

impl PostId {
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for PostId {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value <= 0 {
            return Err(CoreError::InvalidPostId(value.to_string()));
        }
        Ok(PostId(value))
    }
}

impl FromStr for PostId {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let parsed: i64 = trimmed
            .parse()
            .map_err(|_| CoreError::InvalidPostId(trimmed.to_string()))?;
        PostId::try_from(parsed)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
