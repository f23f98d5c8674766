use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialise piped JSON from stdin.
///
/// Returns None when stdin is a TTY or the pipe is empty, so callers can
/// fall back to command-line flags.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped<T: DeserializeOwned>(buffer: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse stdin as JSON: {}", e))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_finance_core::financing::LoanTerms;

    #[test]
    fn test_blank_pipe_means_no_payload() {
        let parsed: Option<LoanTerms> = parse_piped("  \n").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_piped_terms() {
        let parsed: Option<LoanTerms> =
            parse_piped(r#"{"principal":"12000","term_months":12,"nominal_annual_rate_percent":"0"}"#)
                .unwrap();
        assert_eq!(parsed.unwrap().term_months, 12);
    }

    #[test]
    fn test_malformed_pipe_is_an_error() {
        assert!(parse_piped::<LoanTerms>("{not json").is_err());
    }
}
