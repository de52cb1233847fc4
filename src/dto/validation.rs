//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::bingo::card::ROWS;

/// Validates that a bingo serial number is exactly four ASCII digits.
///
/// # Examples
///
/// ```ignore
/// validate_serial_number("4821") // Ok
/// validate_serial_number("482")  // Err - too short
/// validate_serial_number("48a1") // Err - not a digit
/// ```
pub fn validate_serial_number(serial: &str) -> Result<(), ValidationError> {
    if serial.len() != 4 {
        let mut err = ValidationError::new("serial_number_length");
        err.message = Some(
            format!(
                "Serial number must be exactly 4 digits (got {})",
                serial.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !serial.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("serial_number_format");
        err.message = Some("Serial number must contain only digits".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that every claimed line is a card row index.
pub fn validate_line_rows(lines: &[usize]) -> Result<(), ValidationError> {
    if let Some(row) = lines.iter().find(|row| **row >= ROWS) {
        let mut err = ValidationError::new("line_row_range");
        err.message = Some(format!("Line {row} is not a card row (expected 0 to {})", ROWS - 1).into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_serial_number_valid() {
        assert!(validate_serial_number("1000").is_ok());
        assert!(validate_serial_number("9999").is_ok());
    }

    #[test]
    fn test_validate_serial_number_invalid_length() {
        assert!(validate_serial_number("999").is_err());
        assert!(validate_serial_number("10000").is_err());
        assert!(validate_serial_number("").is_err());
    }

    #[test]
    fn test_validate_serial_number_invalid_format() {
        assert!(validate_serial_number("12a4").is_err());
        assert!(validate_serial_number(" 123").is_err());
        assert!(validate_serial_number("١٢٣٤").is_err()); // non-ASCII digits
    }

    #[test]
    fn test_validate_line_rows() {
        assert!(validate_line_rows(&[]).is_ok());
        assert!(validate_line_rows(&[0, 2]).is_ok());
        assert!(validate_line_rows(&[1, 3]).is_err());
    }
}
