//! Command-line argument validation and the user-facing failure messages

use kmeans::KmeansError;
use thiserror::Error;

pub const GENERIC_ERROR_MSG: &str = "An Error Has Occurred";
pub const INVALID_K_ERROR_MSG: &str = "Invalid number of clusters!";
pub const INVALID_EPS_ERROR_MSG: &str = "Invalid epsilon!";
pub const INVALID_ITER_ERROR_MSG: &str = "Invalid maximum iteration!";

/// Raw argument text that failed validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgError {
    #[error("invalid number of clusters: {0:?}")]
    ClusterCount(String),
    #[error("invalid maximum iteration: {0:?}")]
    Iteration(String),
    #[error("invalid epsilon: {0:?}")]
    Epsilon(String),
    #[error("delimiter must be a single ASCII character, got {0:?}")]
    Delimiter(char),
}

/// Integral value written as an integer or as a float with no fractional part
/// ("3", "3.0", " 3 "). Anything else is `None`.
pub fn parse_integral(text: &str) -> Option<i64> {
    let value: f64 = text.trim().parse().ok()?;
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

/// `1 < max_iteration < 1000`
pub fn parse_iteration(text: &str) -> Result<usize, ArgError> {
    parse_integral(text)
        .filter(|it| 1 < *it && *it < 1000)
        .map(|it| it as usize)
        .ok_or_else(|| ArgError::Iteration(text.to_string()))
}

/// `1 < K < n_points`
pub fn parse_cluster_count(text: &str, n_points: usize) -> Result<usize, ArgError> {
    parse_integral(text)
        .filter(|k| 1 < *k && (*k as u64) < n_points as u64)
        .map(|k| k as usize)
        .ok_or_else(|| ArgError::ClusterCount(text.to_string()))
}

pub fn parse_epsilon(text: &str) -> Result<f64, ArgError> {
    text.trim().parse::<f64>().ok()
        .filter(|eps| eps.is_finite() && *eps >= 0.0)
        .ok_or_else(|| ArgError::Epsilon(text.to_string()))
}

pub fn parse_delimiter(delimiter: char) -> Result<u8, ArgError> {
    u8::try_from(delimiter)
        .ok()
        .filter(|b| b.is_ascii())
        .ok_or(ArgError::Delimiter(delimiter))
}

/// Map any failure to the one-line message printed for the user
pub fn user_message(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(arg) = cause.downcast_ref::<ArgError>() {
            return match arg {
                ArgError::ClusterCount(_) => INVALID_K_ERROR_MSG,
                ArgError::Iteration(_) => INVALID_ITER_ERROR_MSG,
                ArgError::Epsilon(_) => INVALID_EPS_ERROR_MSG,
                ArgError::Delimiter(_) => GENERIC_ERROR_MSG,
            };
        }
        if let Some(core) = cause.downcast_ref::<KmeansError>() {
            return match core {
                KmeansError::InvalidClusterCount { .. } => INVALID_K_ERROR_MSG,
                KmeansError::InvalidIterationBound(_) => INVALID_ITER_ERROR_MSG,
                KmeansError::InvalidThreshold(_) => INVALID_EPS_ERROR_MSG,
                _ => GENERIC_ERROR_MSG,
            };
        }
    }
    GENERIC_ERROR_MSG
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn integral_text() {
        assert_eq!(parse_integral("3"), Some(3));
        assert_eq!(parse_integral("3.0"), Some(3));
        assert_eq!(parse_integral(" -2 "), Some(-2));
        assert_eq!(parse_integral("3.5"), None);
        assert_eq!(parse_integral("three"), None);
        assert_eq!(parse_integral("inf"), None);
    }

    #[test]
    fn argument_bounds() {
        assert_eq!(parse_iteration("300"), Ok(300));
        assert_eq!(parse_iteration("1"), Err(ArgError::Iteration("1".to_string())));
        assert_eq!(parse_iteration("1000"), Err(ArgError::Iteration("1000".to_string())));

        assert_eq!(parse_cluster_count("2.0", 5), Ok(2));
        assert!(parse_cluster_count("5", 5).is_err());
        assert!(parse_cluster_count("-3", 5).is_err());

        assert_eq!(parse_epsilon("0.001"), Ok(0.001));
        assert_eq!(parse_epsilon("0"), Ok(0.0));
        assert!(parse_epsilon("-1").is_err());
        assert!(parse_epsilon("abc").is_err());

        assert_eq!(parse_delimiter(';'), Ok(b';'));
        assert!(parse_delimiter('→').is_err());
    }

    #[test]
    fn messages_follow_error_kind() {
        let err = anyhow::Error::new(ArgError::Epsilon("x".to_string()));
        assert_eq!(user_message(&err), INVALID_EPS_ERROR_MSG);

        let err = anyhow::Error::new(KmeansError::InvalidClusterCount { requested: 9, n_points: 4 })
            .context("fitting");
        assert_eq!(user_message(&err), INVALID_K_ERROR_MSG);

        let err = anyhow::Error::new(KmeansError::DegenerateAssignment { slot: 1, iteration: 0 });
        assert_eq!(user_message(&err), GENERIC_ERROR_MSG);

        let err: anyhow::Result<()> = Err(anyhow::anyhow!("missing file")).context("loading");
        assert_eq!(user_message(&err.unwrap_err()), GENERIC_ERROR_MSG);
    }
}
