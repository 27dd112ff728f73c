use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// A categorical or numeric parameter was outside the accepted domain.
    #[error("invalid {parameter} '{value}': expected {expected}")]
    InvalidParameter {
        parameter: &'static str,
        value: String,
        expected: String,
    },

    /// The filter combination matched no rows, so the requested value is undefined.
    #[error("no data: {context}")]
    EmptyResult { context: String },
}

impl QueryError {
    pub fn is_empty_result(&self) -> bool {
        matches!(self, QueryError::EmptyResult { .. })
    }
}

/// Reject a NaN price bound before it silently filters every row out.
pub(crate) fn validate_price_bound(max_price: f64) -> Result<(), QueryError> {
    if max_price.is_nan() {
        return Err(QueryError::InvalidParameter {
            parameter: "max_price",
            value: max_price.to_string(),
            expected: "a number".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_price_bound_rejected() {
        let err = validate_price_bound(f64::NAN).unwrap_err();
        assert!(matches!(err, QueryError::InvalidParameter { parameter: "max_price", .. }));
    }

    #[test]
    fn test_infinite_price_bound_accepted() {
        assert!(validate_price_bound(f64::INFINITY).is_ok());
        assert!(validate_price_bound(0.0).is_ok());
    }

    #[test]
    fn test_display_messages() {
        let err = QueryError::EmptyResult {
            context: "Spain / Gràcia".to_string(),
        };
        assert_eq!(err.to_string(), "no data: Spain / Gràcia");
        assert!(err.is_empty_result());
    }
}
