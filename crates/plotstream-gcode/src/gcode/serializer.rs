//! Canonical G-code serialization
//!
//! One command per line, fields written as letter + value with no separators,
//! values fixed at three decimals, fields ordered G, X, Y, Z, F and then the
//! remaining letters in encounter order.

use plotstream_core::Command;
use std::fmt;
use std::io::{self, Write};

/// Digits after the decimal point for every value
pub const DECIMAL_PLACES: usize = 3;

/// Display adapter writing a command in canonical form, without terminator
#[derive(Debug, Clone, Copy)]
pub struct Canonical<'a>(pub &'a Command);

impl fmt::Display for Canonical<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in self.0.words() {
            write!(f, "{}{}", word.letter, format_value(word.value))?;
        }
        Ok(())
    }
}

/// Format a value rounded to [`DECIMAL_PLACES`]
///
/// Values that round to zero are written without a sign.
pub fn format_value(value: f32) -> String {
    let text = format!("{:.*}", DECIMAL_PLACES, value);
    match text.strip_prefix('-') {
        Some(unsigned) if unsigned.bytes().all(|b| b == b'0' || b == b'.') => {
            unsigned.to_string()
        }
        _ => text,
    }
}

/// Serialize one command to a newline-terminated line
pub fn serialize(command: &Command) -> String {
    format!("{}\n", Canonical(command))
}

/// Serialize a whole command list
pub fn serialize_all(commands: &[Command]) -> String {
    let mut out = String::with_capacity(commands.len() * 24);
    for command in commands {
        out.push_str(&serialize(command));
    }
    out
}

/// Write a command list, one canonical line each
pub fn write_commands<W: Write>(writer: &mut W, commands: &[Command]) -> io::Result<()> {
    for command in commands {
        writeln!(writer, "{}", Canonical(command))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_line_move() {
        let cmd = Command::new()
            .with('F', 500.0)
            .with('Y', 20.0)
            .with('X', 10.0)
            .with('G', 1.0);
        assert_eq!(serialize(&cmd), "G1.000X10.000Y20.000F500.000\n");
    }

    #[test]
    fn test_extension_fields_follow_canonical_ones() {
        let cmd = Command::new()
            .with('S', 1000.0)
            .with('M', 3.0)
            .with('Z', -1.25);
        assert_eq!(serialize(&cmd), "Z-1.250S1000.000M3.000\n");
    }

    #[test]
    fn test_rounding_to_three_decimals() {
        assert_eq!(format_value(1.23456), "1.235");
        assert_eq!(format_value(-2.0), "-2.000");
        assert_eq!(format_value(0.0), "0.000");
    }

    #[test]
    fn test_negative_zero_has_no_sign() {
        assert_eq!(format_value(-0.0), "0.000");
        assert_eq!(format_value(-0.0001), "0.000");
        assert_eq!(format_value(-0.001), "-0.001");
    }

    #[test]
    fn test_serialize_all_and_write_agree() {
        let cmds = vec![Command::line_to(1.0, 2.0), Command::new().with('M', 5.0)];
        let text = serialize_all(&cmds);
        assert_eq!(text, "G1.000X1.000Y2.000\nM5.000\n");

        let mut buf = Vec::new();
        write_commands(&mut buf, &cmds).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), text);
    }
}
