// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{Result, ScoutError};

/// Upper bound this tool accepts for results per query.
pub const MAX_N_RESULTS: usize = 1000;

pub struct Validator;

impl Validator {
    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ScoutError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_not_empty(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ScoutError::Validation(format!("{} must not be empty", field)));
        }
        Ok(())
    }

    /// Names end up as URL path segments.
    pub fn validate_name(field: &str, value: &str) -> Result<()> {
        Self::validate_not_empty(field, value)?;

        if value.contains('/') {
            return Err(ScoutError::Validation(format!(
                "{} must not contain '/': {}",
                field, value
            )));
        }

        Ok(())
    }

    pub fn validate_n_results(n_results: usize) -> Result<()> {
        if n_results == 0 {
            return Err(ScoutError::Validation(
                "n_results must be greater than 0".to_string(),
            ));
        }

        if n_results > MAX_N_RESULTS {
            return Err(ScoutError::Validation(format!(
                "n_results too large (max {})",
                MAX_N_RESULTS
            )));
        }

        Ok(())
    }

    /// Cuts `text` to at most `max_chars` characters, appending `...` when shortened.
    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            None => text.to_string(),
            Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        }
    }
}
