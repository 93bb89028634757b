//! G-Code line parser
//!
//! Turns one raw program line into a [`Command`]. Whitespace and both comment
//! styles are removed first, then the remainder is scanned as alternating
//! letter/numeral fields.

use plotstream_core::{Command, GcodeError};
use regex::Regex;
use std::sync::OnceLock;

fn bracket_comments() -> &'static Regex {
    static BRACKET_COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    BRACKET_COMMENT_REGEX.get_or_init(|| Regex::new(r"\(.*?\)").expect("invalid regex pattern"))
}

fn semicolon_comments() -> &'static Regex {
    static SEMICOLON_COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    SEMICOLON_COMMENT_REGEX.get_or_init(|| Regex::new(r";.*").expect("invalid regex pattern"))
}

/// Parse one program line
///
/// Returns `Ok(None)` for `%` program markers and for lines that are empty
/// once whitespace and comments are gone. A letter directly followed by
/// another letter (or the end of the line) gets the value `0.0`.
///
/// # Errors
/// [`GcodeError::Syntax`] carrying the original line when a numeral does not
/// parse as a float, or when a numeral is not preceded by a letter.
pub fn parse_line(line: &str) -> Result<Option<Command>, GcodeError> {
    if line.trim_start().starts_with('%') {
        return Ok(None);
    }

    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    let without_brackets = bracket_comments().replace_all(&compact, "");
    let code = semicolon_comments().replace(&without_brackets, "");

    if code.is_empty() {
        return Ok(None);
    }

    let code = code.to_ascii_uppercase();
    let syntax_error = || GcodeError::Syntax {
        line: line.to_string(),
    };

    let mut command = Command::new();
    let mut rest = code.as_str();
    while let Some(letter) = rest.chars().next() {
        if !letter.is_ascii_alphabetic() {
            return Err(syntax_error());
        }
        rest = &rest[letter.len_utf8()..];

        let numeral_end = rest
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let (numeral, tail) = rest.split_at(numeral_end);
        rest = tail;

        let value = if numeral.is_empty() {
            0.0
        } else {
            numeral.parse::<f32>().map_err(|_| syntax_error())?
        };
        command = command.with(letter, value);
    }

    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn test_parse_line_move() {
        let cmd = parse("G1 X10 Y20 F500");
        assert_eq!(
            cmd,
            Command::new()
                .with('G', 1.0)
                .with('X', 10.0)
                .with('Y', 20.0)
                .with('F', 500.0)
        );
    }

    #[test]
    fn test_lowercase_and_signs() {
        let cmd = parse("g0 x-1.5 y+.25 z5.");
        assert_eq!(cmd.g(), Some(0.0));
        assert_eq!(cmd.x(), Some(-1.5));
        assert_eq!(cmd.y(), Some(0.25));
        assert_eq!(cmd.z(), Some(5.0));
    }

    #[test]
    fn test_empty_numeral_defaults_to_zero() {
        let cmd = parse("G28XY");
        assert_eq!(cmd.g(), Some(28.0));
        assert_eq!(cmd.x(), Some(0.0));
        assert_eq!(cmd.y(), Some(0.0));
    }

    #[test]
    fn test_comments_and_markers_yield_nothing() {
        assert_eq!(parse_line("%").unwrap(), None);
        assert_eq!(parse_line("  %begin").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   \t ").unwrap(), None);
        assert_eq!(parse_line("; only a comment").unwrap(), None);
        assert_eq!(parse_line("(pen setup)").unwrap(), None);
    }

    #[test]
    fn test_comments_are_stripped() {
        let cmd = parse("G1 (move) X1 (to the right) Y2 ; trailing (note)");
        assert_eq!(cmd, Command::new().with('G', 1.0).with('X', 1.0).with('Y', 2.0));
    }

    #[test]
    fn test_whitespace_inside_numbers_is_removed() {
        assert_eq!(parse("X1 2.5").x(), Some(12.5));
    }

    #[test]
    fn test_malformed_numeral_is_syntax_error() {
        let err = parse_line("G1 X1.2.3").unwrap_err();
        match err {
            GcodeError::Syntax { line } => assert_eq!(line, "G1 X1.2.3"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_numeral_without_letter_is_syntax_error() {
        assert!(matches!(
            parse_line("12 X3"),
            Err(GcodeError::Syntax { .. })
        ));
        assert!(matches!(parse_line("X-"), Err(GcodeError::Syntax { .. })));
        assert!(matches!(
            parse_line("G1 (unclosed X1"),
            Err(GcodeError::Syntax { .. })
        ));
    }

    #[test]
    fn test_extension_fields_keep_encounter_order() {
        let cmd = parse("M3 S1000 P2");
        let letters: String = cmd.words().map(|w| w.letter).collect();
        assert_eq!(letters, "MSP");
    }
}
