use thiserror::Error;

use crate::model::{RouteParseError, UserTypeParseError};

/// Boundary errors raised while turning raw identifiers into domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Route(#[from] RouteParseError),
    #[error(transparent)]
    UserType(#[from] UserTypeParseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Route, UserType};

    fn parse_both(route: &str, role: &str) -> Result<(Route, UserType), Error> {
        Ok((route.parse()?, role.parse()?))
    }

    #[test]
    fn parse_failures_keep_their_kind() {
        assert!(parse_both("levels", "teacher").is_ok());
        assert!(matches!(parse_both("nowhere", "teacher"), Err(Error::Route(_))));
        assert!(matches!(parse_both("home", "admin"), Err(Error::UserType(_))));
        assert_eq!(
            parse_both("home", "admin").unwrap_err().to_string(),
            "unknown user type: admin"
        );
    }
}
