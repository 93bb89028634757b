//! Structured motion command
//!
//! A [`Command`] maps single uppercase letters to `f32` values. The common
//! axes live in fixed slots so the canonical order (G, X, Y, Z, F) never
//! depends on how a line was written; every other letter is kept in the
//! order it was first seen.

use smallvec::SmallVec;

/// Letters that have a fixed slot, in canonical output order
pub const CANONICAL_LETTERS: [char; 5] = ['G', 'X', 'Y', 'Z', 'F'];

/// A single letter/value field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Word {
    /// Uppercase field letter
    pub letter: char,
    /// Field value
    pub value: f32,
}

impl Word {
    /// Create a new word, normalizing the letter to uppercase
    pub fn new(letter: char, value: f32) -> Self {
        Self {
            letter: letter.to_ascii_uppercase(),
            value,
        }
    }
}

/// Arc rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcDirection {
    /// G2
    Clockwise,
    /// G3
    CounterClockwise,
}

/// One parsed program line
#[derive(Debug, Clone, Default)]
pub struct Command {
    g: Option<f32>,
    x: Option<f32>,
    y: Option<f32>,
    z: Option<f32>,
    f: Option<f32>,
    extra: SmallVec<[Word; 2]>,
}

impl Command {
    /// Create an empty command
    ///
    /// Only a command holding at least one field is valid output of the parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a G1 line move to `(x, y)`
    pub fn line_to(x: f32, y: f32) -> Self {
        Self::new().with('G', 1.0).with('X', x).with('Y', y)
    }

    /// Return this command with `letter` set to `value`
    ///
    /// Setting a letter twice keeps the latest value and the first position.
    pub fn with(mut self, letter: char, value: f32) -> Self {
        let letter = letter.to_ascii_uppercase();
        debug_assert!(letter.is_ascii_alphabetic(), "field letter must be A-Z");
        match letter {
            'G' => self.g = Some(value),
            'X' => self.x = Some(value),
            'Y' => self.y = Some(value),
            'Z' => self.z = Some(value),
            'F' => self.f = Some(value),
            _ => match self.extra.iter_mut().find(|w| w.letter == letter) {
                Some(word) => word.value = value,
                None => self.extra.push(Word { letter, value }),
            },
        }
        self
    }

    /// Value of a field, if present
    pub fn get(&self, letter: char) -> Option<f32> {
        match letter.to_ascii_uppercase() {
            'G' => self.g,
            'X' => self.x,
            'Y' => self.y,
            'Z' => self.z,
            'F' => self.f,
            other => self
                .extra
                .iter()
                .find(|w| w.letter == other)
                .map(|w| w.value),
        }
    }

    /// Check if a field is present
    pub fn contains(&self, letter: char) -> bool {
        self.get(letter).is_some()
    }

    /// G word
    pub fn g(&self) -> Option<f32> {
        self.g
    }

    /// X word
    pub fn x(&self) -> Option<f32> {
        self.x
    }

    /// Y word
    pub fn y(&self) -> Option<f32> {
        self.y
    }

    /// Z word (pen height)
    pub fn z(&self) -> Option<f32> {
        self.z
    }

    /// F word (feed rate)
    pub fn feed(&self) -> Option<f32> {
        self.f
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        [self.g, self.x, self.y, self.z, self.f]
            .iter()
            .filter(|v| v.is_some())
            .count()
            + self.extra.len()
    }

    /// Whether the command holds no field at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fields in canonical order: G, X, Y, Z, F, then the rest in encounter order
    pub fn words(&self) -> impl Iterator<Item = Word> + '_ {
        CANONICAL_LETTERS
            .iter()
            .zip([self.g, self.x, self.y, self.z, self.f])
            .filter_map(|(&letter, value)| value.map(|value| Word { letter, value }))
            .chain(self.extra.iter().copied())
    }

    /// Fields outside the canonical set, in encounter order
    pub fn extra_words(&self) -> &[Word] {
        &self.extra
    }

    /// G0 or G1
    pub fn is_line_move(&self) -> bool {
        matches!(self.g, Some(g) if g == 0.0 || g == 1.0)
    }

    /// Direction if this is a G2/G3 arc
    pub fn arc_direction(&self) -> Option<ArcDirection> {
        match self.g {
            Some(g) if g == 2.0 => Some(ArcDirection::Clockwise),
            Some(g) if g == 3.0 => Some(ArcDirection::CounterClockwise),
            _ => None,
        }
    }

    /// G2 or G3
    pub fn is_arc(&self) -> bool {
        self.arc_direction().is_some()
    }
}

// Extension fields compare as a key set, so encounter order does not matter.
impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.g == other.g
            && self.x == other.x
            && self.y == other.y
            && self.z == other.z
            && self.f == other.f
            && self.extra.len() == other.extra.len()
            && self
                .extra
                .iter()
                .all(|w| other.get(w.letter) == Some(w.value))
    }
}

impl FromIterator<Word> for Command {
    fn from_iter<I: IntoIterator<Item = Word>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Command::new(), |cmd, w| cmd.with(w.letter, w.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_is_fixed() {
        let cmd = Command::new()
            .with('M', 3.0)
            .with('f', 500.0)
            .with('Y', 2.0)
            .with('S', 1000.0)
            .with('G', 1.0)
            .with('X', 1.0);

        let letters: String = cmd.words().map(|w| w.letter).collect();
        assert_eq!(letters, "GXYFMS");
        assert_eq!(cmd.len(), 6);
    }

    #[test]
    fn test_duplicate_letter_keeps_latest_value() {
        let cmd = Command::new().with('S', 1.0).with('T', 2.0).with('S', 3.0);
        assert_eq!(cmd.get('S'), Some(3.0));
        let letters: String = cmd.words().map(|w| w.letter).collect();
        assert_eq!(letters, "ST");
    }

    #[test]
    fn test_equality_ignores_extension_order() {
        let a = Command::new().with('G', 1.0).with('S', 1.0).with('T', 2.0);
        let b = Command::new().with('T', 2.0).with('G', 1.0).with('S', 1.0);
        assert_eq!(a, b);
        assert_ne!(a, b.clone().with('P', 0.0));
    }

    #[test]
    fn test_move_classification() {
        assert!(Command::line_to(1.0, 2.0).is_line_move());
        assert!(Command::new().with('G', 0.0).is_line_move());
        assert_eq!(
            Command::new().with('G', 2.0).arc_direction(),
            Some(ArcDirection::Clockwise)
        );
        assert_eq!(
            Command::new().with('G', 3.0).arc_direction(),
            Some(ArcDirection::CounterClockwise)
        );
        assert!(!Command::new().with('M', 2.0).is_arc());
        assert!(Command::new().is_empty());
    }
}
