// ============================================================================
// CPF Validation - Normalization and Modulo-11 Check Digits
// ============================================================================
//
// A CPF is an 11-digit identifier whose last two digits are check digits
// derived from weighted modulo-11 sums over the preceding digits.
//
// All functions here are pure and total: invalid input yields `false` or a
// short string, never an error.
//
// ============================================================================

/// Number of digits in a normalized CPF
pub const CPF_LENGTH: usize = 11;

/// Outcome of [`validate_and_clean`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpfValidation {
    pub is_valid: bool,
    pub clean_cpf: String,
}

/// Strip every non-digit character, keeping digit order.
pub fn clean(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Check an already-cleaned CPF.
///
/// Anything that is not exactly 11 ASCII digits is rejected, so calling this
/// on punctuated input simply returns `false`.
pub fn is_valid(candidate: &str) -> bool {
    if candidate.len() != CPF_LENGTH || !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let digits: Vec<u32> = candidate.bytes().map(|b| u32::from(b - b'0')).collect();

    // Repeated sequences like 000.000.000-00 pass the checksum but are not issued
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Clean first, then validate the cleaned form.
pub fn validate_and_clean(raw: &str) -> CpfValidation {
    let clean_cpf = clean(raw);
    let is_valid = is_valid(&clean_cpf);

    CpfValidation { is_valid, clean_cpf }
}

/// Render a cleaned CPF as `000.000.000-00`.
///
/// Returns `None` unless the input is exactly 11 digits.
pub fn format(clean_cpf: &str) -> Option<String> {
    if clean_cpf.len() != CPF_LENGTH || !clean_cpf.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(format!(
        "{}.{}.{}-{}",
        &clean_cpf[0..3],
        &clean_cpf[3..6],
        &clean_cpf[6..9],
        &clean_cpf[9..11]
    ))
}

/// Weights run from `len + 1` down to 2; a remainder of 10 maps to 0.
fn check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| d * (top - i as u32))
        .sum();

    let remainder = (sum * 10) % 11;
    if remainder == 10 {
        0
    } else {
        remainder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_dots_and_hyphens() {
        assert_eq!(clean("111.444.777-35"), "11144477735");
        assert_eq!(clean("123.456.789-09"), "12345678909");
        assert_eq!(clean("1.2-3"), "123");
    }

    #[test]
    fn test_clean_removes_spaces_and_letters() {
        assert_eq!(clean(" 111 444 777 35 "), "11144477735");
        assert_eq!(clean("abc111def444"), "111444");
    }

    #[test]
    fn test_clean_preserves_digit_order_and_count() {
        let raw = "9.8-7..6--5";
        let cleaned = clean(raw);

        assert_eq!(cleaned, "98765");
        assert_eq!(cleaned.len(), raw.chars().filter(|c| c.is_ascii_digit()).count());
    }

    #[test]
    fn test_clean_of_empty_or_separator_only_input_is_empty() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("..--  "), "");
    }

    #[test]
    fn test_known_valid_cpfs() {
        assert!(is_valid("11144477735"));
        assert!(is_valid("12345678909"));
    }

    #[test]
    fn test_wrong_check_digits_are_rejected() {
        assert!(!is_valid("12345678901"));
        assert!(!is_valid("11144477734"));
        // first digit right, second wrong
        assert!(!is_valid("12345678900"));
    }

    #[test]
    fn test_repeated_digits_are_rejected() {
        for d in 0..=9 {
            let candidate = d.to_string().repeat(11);
            assert!(!is_valid(&candidate), "{} should be invalid", candidate);
        }
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        assert!(!is_valid(""));
        assert!(!is_valid("1114447773"));
        assert!(!is_valid("111444777350"));
        assert!(!is_valid("123"));
    }

    #[test]
    fn test_unclean_input_is_rejected() {
        assert!(!is_valid("111.444.777-35"));
        assert!(!is_valid("1114447773a"));
    }

    #[test]
    fn test_remainder_ten_maps_to_zero() {
        // 123.456.789 sums to 210; 2100 mod 11 == 10
        assert_eq!(check_digit(&[1, 2, 3, 4, 5, 6, 7, 8, 9]), 0);
        assert_eq!(check_digit(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 0]), 9);
    }

    #[test]
    fn test_validate_and_clean() {
        let result = validate_and_clean("111.444.777-35");
        assert_eq!(
            result,
            CpfValidation {
                is_valid: true,
                clean_cpf: "11144477735".to_string(),
            }
        );

        let result = validate_and_clean("123.456.789-01");
        assert!(!result.is_valid);
        assert_eq!(result.clean_cpf, "12345678901");
    }

    #[test]
    fn test_format() {
        assert_eq!(format("11144477735").as_deref(), Some("111.444.777-35"));
        assert_eq!(format("1114447773"), None);
        assert_eq!(format("111.444.777"), None);
    }
}
