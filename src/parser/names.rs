/// Built-in names for the standard move slots, used when a packed file's
/// name table is short or a record is blank.
const DEFAULT_NAMES: &[(usize, &str)] = &[
    (0, "Standing"),
    (1, "Walk Forward"),
    (2, "Walk Backward"),
    (3, "Stand to Crouch"),
    (4, "Crouching"),
    (5, "Crouch to Stand"),
    (6, "Jump Start"),
    (7, "Neutral Jump"),
    (8, "Forward Jump"),
    (9, "Backward Jump"),
    (10, "Landing"),
    (11, "Turn Around"),
    (12, "Crouch Turn"),
    (13, "Forward Dash"),
    (14, "Back Dash"),
    (17, "Standing Guard"),
    (18, "Crouching Guard"),
    (19, "Air Guard"),
    (30, "Hit Light"),
    (31, "Hit Heavy"),
    (32, "Hit Crouching"),
    (33, "Launched"),
    (35, "Knockdown"),
    (36, "Wake Up"),
    (40, "5A"),
    (41, "5B"),
    (42, "5C"),
    (43, "2A"),
    (44, "2B"),
    (45, "2C"),
    (46, "j.A"),
    (47, "j.B"),
    (48, "j.C"),
    (50, "Throw"),
    (51, "Air Throw"),
    (52, "Throw Whiff"),
    (100, "Victory 1"),
    (101, "Victory 2"),
    (102, "Time Over Loss"),
    (200, "Character Select"),
];

pub fn default_name(index: usize) -> Option<&'static str> {
    DEFAULT_NAMES
        .binary_search_by_key(&index, |(i, _)| *i)
        .ok()
        .map(|pos| DEFAULT_NAMES[pos].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_for_binary_search() {
        assert!(DEFAULT_NAMES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn lookup_is_keyed_by_index() {
        assert_eq!(default_name(0), Some("Standing"));
        assert_eq!(default_name(42), Some("5C"));
        assert_eq!(default_name(15), None);
        assert_eq!(default_name(9999), None);
    }
}
