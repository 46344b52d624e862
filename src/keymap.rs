use clap::ValueEnum;

use crate::host::KEY_COUNT;

/// How host keyboard characters map onto the 16-key hex keypad.
///
/// The conventional layout keeps the shape of the COSMAC keypad:
///
/// ```text
/// 1 2 3 C      1 2 3 4
/// 4 5 6 D      q w e r
/// 7 8 9 E      a s d f
/// A 0 B F      z x c v
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Keymap {
    /// Left-hand block of a QWERTY keyboard
    #[default]
    Conventional,
    /// The hex digit itself, `0`-`9` and `a`-`f`.
    Hex,
}

const CONVENTIONAL_KEYS: [char; KEY_COUNT] = [
    'x', // 0
    '1', '2', '3', // 1 2 3
    'q', 'w', 'e', // 4 5 6
    'a', 's', 'd', // 7 8 9
    'z', 'c', // A B
    '4', 'r', 'f', 'v', // C D E F
];

const HEX_KEYS: [char; KEY_COUNT] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
];

impl Keymap {
    /// Host character for each keypad key, indexed by key.
    pub fn chars(&self) -> &'static [char; KEY_COUNT] {
        match self {
            Keymap::Conventional => &CONVENTIONAL_KEYS,
            Keymap::Hex => &HEX_KEYS,
        }
    }

    pub fn key_for(&self, c: char) -> Option<u8> {
        let c = c.to_ascii_lowercase();
        self.chars()
            .iter()
            .position(|k| *k == c)
            .map(|k| k as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conventional_layout() {
        let keymap = Keymap::Conventional;
        assert_eq!(keymap.key_for('x'), Some(0x0));
        assert_eq!(keymap.key_for('1'), Some(0x1));
        assert_eq!(keymap.key_for('4'), Some(0xc));
        assert_eq!(keymap.key_for('V'), Some(0xf));
        assert_eq!(keymap.key_for('0'), None);
    }

    #[test]
    fn test_hex_layout() {
        let keymap = Keymap::Hex;
        assert_eq!(keymap.key_for('0'), Some(0x0));
        assert_eq!(keymap.key_for('9'), Some(0x9));
        assert_eq!(keymap.key_for('A'), Some(0xa));
        assert_eq!(keymap.key_for('f'), Some(0xf));
        assert_eq!(keymap.key_for('g'), None);
    }

    #[test]
    fn test_every_key_reachable() {
        for keymap in [Keymap::Conventional, Keymap::Hex] {
            for (key, c) in keymap.chars().iter().enumerate() {
                assert_eq!(keymap.key_for(*c), Some(key as u8));
            }
        }
    }
}
