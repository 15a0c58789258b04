//! Comma-separated integer lists
//!
//! Patterns are typed by the operator as `gap,finger,gap,finger,...` and
//! move lists travel to the jig as `move,move,move,\n`. Both use the same
//! decimal ASCII encoding.

use crate::error::FormatError;

/// Parse a comma-separated list of integers.
///
/// Whitespace around each token is ignored and a single trailing comma is
/// tolerated. Any other empty token, or a token that is not a decimal
/// integer, fails the whole list.
pub fn parse_number_list(text: &str) -> Result<Vec<i32>, FormatError> {
    if text.trim().is_empty() {
        return Err(FormatError::Empty);
    }

    let mut tokens: Vec<&str> = text.split(',').map(str::trim).collect();
    if tokens.len() > 1 && tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }

    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            token.parse::<i32>().map_err(|_| FormatError::InvalidNumber {
                index,
                token: (*token).to_string(),
            })
        })
        .collect()
}

/// Join numbers with commas for display, e.g. `100,200,300`.
pub fn format_number_list(numbers: &[i32]) -> String {
    numbers
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Encode a move list the way the jig firmware expects it: every number is
/// followed by a comma, including the last one.
///
/// The newline terminator is added by the transport.
pub fn encode_moves(moves: &[i32]) -> String {
    let mut out = String::with_capacity(moves.len() * 4);
    for m in moves {
        out.push_str(&m.to_string());
        out.push(',');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_list() {
        assert_eq!(parse_number_list("300,300").unwrap(), vec![300, 300]);
        assert_eq!(
            parse_number_list(" 100, 250 ,400").unwrap(),
            vec![100, 250, 400]
        );
    }

    #[test]
    fn test_parse_trailing_comma() {
        assert_eq!(parse_number_list("50,50,398,").unwrap(), vec![50, 50, 398]);
    }

    #[test]
    fn test_parse_rejects_bad_tokens() {
        assert_eq!(
            parse_number_list("100,abc"),
            Err(FormatError::InvalidNumber {
                index: 1,
                token: "abc".to_string()
            })
        );
        assert!(matches!(
            parse_number_list("100,,200"),
            Err(FormatError::InvalidNumber { index: 1, .. })
        ));
        assert!(parse_number_list("1.5").is_err());
        assert_eq!(parse_number_list("   "), Err(FormatError::Empty));
        assert!(parse_number_list(",").is_err());
    }

    #[test]
    fn test_format_and_encode() {
        assert_eq!(format_number_list(&[50, 2, 398]), "50,2,398");
        assert_eq!(format_number_list(&[]), "");
        assert_eq!(encode_moves(&[50, 2, 398]), "50,2,398,");
        assert_eq!(encode_moves(&[]), "");
    }
}
