use plotstream_core::Command;
use plotstream_gcode::{parse_line, serialize};
use proptest::prelude::*;

const LETTERS: &[char] = &['G', 'X', 'Y', 'Z', 'F', 'I', 'J', 'M', 'S', 'P'];

/// Values already rounded to three decimals
fn rounded_value() -> impl Strategy<Value = f32> {
    (-100_000i32..=100_000).prop_map(|thousandths| thousandths as f32 / 1000.0)
}

fn command() -> impl Strategy<Value = Command> {
    prop::collection::vec((prop::sample::select(LETTERS), rounded_value()), 1..8)
        .prop_map(|fields| fields.into_iter().fold(Command::new(), |c, (l, v)| c.with(l, v)))
}

proptest! {
    #[test]
    fn prop_parse_inverts_serialize(cmd in command()) {
        let line = serialize(&cmd);
        let parsed = parse_line(&line).unwrap();
        prop_assert_eq!(parsed, Some(cmd));
    }

    #[test]
    fn prop_serialize_puts_canonical_letters_first(cmd in command()) {
        let line = serialize(&cmd);
        let letters: Vec<char> = line.chars().filter(|c| c.is_ascii_alphabetic()).collect();
        let canonical_count = letters
            .iter()
            .take_while(|l| "GXYZF".contains(**l))
            .count();
        prop_assert!(letters[canonical_count..].iter().all(|l| !"GXYZF".contains(*l)));
        prop_assert!(line.ends_with('\n'));
    }
}

#[test]
fn test_line_move_scenario() {
    let cmd = parse_line("G1 X10 Y20 F500").unwrap().unwrap();
    assert_eq!(cmd.g(), Some(1.0));
    assert_eq!(cmd.x(), Some(10.0));
    assert_eq!(cmd.y(), Some(20.0));
    assert_eq!(cmd.feed(), Some(500.0));
    assert_eq!(cmd.len(), 4);
    assert_eq!(serialize(&cmd), "G1.000X10.000Y20.000F500.000\n");
}

#[test]
fn test_serialized_program_reloads_unchanged() {
    let original = "G0 X1 Y1\n(pen down)\nG1 Z-1 F200 ; plunge\nM3 S500\nG1 X2.0004 Y3\n";
    let stream = plotstream_gcode::CommandStream::default();
    let commands = stream.load_str(original).unwrap();
    let text = plotstream_gcode::serialize_all(&commands);
    let reloaded = stream.load_str(&text).unwrap();
    assert_eq!(reloaded.len(), commands.len());
    assert_eq!(plotstream_gcode::serialize_all(&reloaded), text);
}
