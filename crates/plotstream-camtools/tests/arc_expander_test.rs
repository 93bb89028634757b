use plotstream_camtools::{ArcExpander, ArcExpanderConfig, ArcZHandling};
use plotstream_core::{Command, Position};
use proptest::prelude::*;

#[test]
fn test_full_circle_scenario() {
    // G2 X0 Y0 I5 J0 from (10, 0): center (15, 0), radius 5, both angles at π.
    let expander = ArcExpander::with_segment_length(0.5);
    let cmd = Command::new()
        .with('G', 2.0)
        .with('X', 0.0)
        .with('Y', 0.0)
        .with('I', 5.0)
        .with('J', 0.0);

    let plan = expander.plan(&cmd, Position::new(10.0, 0.0)).unwrap();
    assert_eq!(plan.center, (15.0, 0.0));
    assert!((plan.sweep - 2.0 * std::f64::consts::PI).abs() < 1e-9);

    let moves: Vec<Command> = expander
        .expand(&cmd, Position::new(10.0, 0.0))
        .unwrap()
        .collect();

    let expected = (2.0 * std::f64::consts::PI * 5.0 / 0.5).floor() as usize + 1;
    assert_eq!(expected, 63);
    assert_eq!(moves.len(), expected);
    assert_eq!(moves.last().unwrap(), &Command::line_to(0.0, 0.0));
}

#[test]
fn test_chord_length_bounds_step_spacing() {
    let expander = ArcExpander::with_segment_length(0.25);
    let cmd = Command::new().with('G', 3.0).with('I', 10.0).with('J', -4.0);
    let start = Position::new(-2.0, 3.0);

    let mut prev = start;
    for m in expander.expand(&cmd, start).unwrap() {
        let next = Position::new(m.x().unwrap(), m.y().unwrap());
        assert!(prev.distance_to(&next) <= 0.25 + 1e-3);
        prev = next;
    }
}

#[test]
fn test_omit_matches_bare_moves() {
    let expander = ArcExpander::new(ArcExpanderConfig {
        segment_length: 1.0,
        z_handling: ArcZHandling::Omit,
    });
    let cmd = Command::new().with('G', 2.0).with('I', 3.0).with('Z', -1.0);
    let moves: Vec<Command> = expander.expand(&cmd, Position::default()).unwrap().collect();
    assert!(moves.iter().all(|m| m.len() == 3));
}

proptest! {
    #[test]
    fn prop_segment_count_matches_formula(
        sx in -50.0f32..50.0,
        sy in -50.0f32..50.0,
        i in -20.0f32..20.0,
        j in -20.0f32..20.0,
        ex in -50.0f32..50.0,
        ey in -50.0f32..50.0,
        clockwise in any::<bool>(),
        segment_length in 0.1f32..5.0,
    ) {
        prop_assume!(i.hypot(j) > 0.01);
        let expander = ArcExpander::with_segment_length(segment_length);
        let cmd = Command::new()
            .with('G', if clockwise { 2.0 } else { 3.0 })
            .with('X', ex)
            .with('Y', ey)
            .with('I', i)
            .with('J', j);
        let start = Position::new(sx, sy);

        let plan = expander.plan(&cmd, start).unwrap();
        prop_assert!(plan.sweep > 0.0 && plan.sweep <= 2.0 * std::f64::consts::PI + 1e-12);

        let moves: Vec<Command> = expander.expand(&cmd, start).unwrap().collect();
        let expected = (plan.sweep * plan.radius / f64::from(segment_length)).floor() as usize + 1;
        prop_assert_eq!(moves.len(), expected);

        let last = moves.last().unwrap();
        prop_assert_eq!(last.x(), Some(ex));
        prop_assert_eq!(last.y(), Some(ey));
    }
}
