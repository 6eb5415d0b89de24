//! Computer-keyboard performance surface lookup table.
//!
//! The bottom letter row plays a chromatic octave from note 60: home-row
//! letters above the gaps act as the "black keys". Both 'z' and 'y' map
//! to note 60 so the layout works on QWERTY and QWERTZ keyboards alike.

/// Playable keys in note order, one entry per drawn key.
///
/// The 'y' alias for note 60 is resolved by [`note_for_key`] but not drawn
/// as a key of its own.
pub const PLAYABLE_KEYS: &[(char, i32)] = &[
    ('z', 60),
    ('s', 61),
    ('x', 62),
    ('d', 63),
    ('c', 64),
    ('v', 65),
    ('g', 66),
    ('b', 67),
    ('h', 68),
    ('n', 69),
    ('j', 70),
    ('m', 71),
    (',', 72),
];

/// Note number for a pressed key, or `None` if the key is not part of the
/// performance surface.
pub fn note_for_key(key: char) -> Option<i32> {
    if key == 'y' {
        return Some(60);
    }
    PLAYABLE_KEYS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, note)| *note)
}

/// Whether a note index falls on an accidental of the drawn layout.
pub fn is_accidental(note: i32) -> bool {
    matches!(note.rem_euclid(12), 1 | 3 | 6 | 8 | 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_one_chromatic_octave() {
        let notes: Vec<i32> = PLAYABLE_KEYS.iter().map(|(_, n)| *n).collect();
        assert_eq!(notes, (60..=72).collect::<Vec<i32>>());
    }

    #[test]
    fn qwerty_and_qwertz_share_the_low_c() {
        assert_eq!(note_for_key('z'), Some(60));
        assert_eq!(note_for_key('y'), Some(60));
    }

    #[test]
    fn unmapped_keys_return_none() {
        assert_eq!(note_for_key('q'), None);
        assert_eq!(note_for_key(' '), None);
        assert_eq!(note_for_key('Z'), None);
    }

    #[test]
    fn reference_note_sits_under_n() {
        assert_eq!(note_for_key('n'), Some(69));
    }
}
