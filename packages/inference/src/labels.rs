//! Static material class table

use std::collections::HashMap;
use std::sync::LazyLock;

/// Class keys and display names, in table order
pub const MATERIAL_CLASSES: &[(&str, &str)] = &[
    ("bricks", "Bricks (common)"),
    ("concrete", "Concrete (1:1.5:3)"),
    ("aggregate", "Aggregate"),
    ("aerated_block", "Aerated block"),
    ("concrete_block", "Concrete block"),
    ("limestone_block", "Limestone block"),
    ("rammed_earth", "Rammed earth"),
    ("timber", "Timber (general)"),
    ("steel", "Steel (general)"),
    ("glass", "Glass (float)"),
    ("aluminum", "Aluminum (general)"),
    ("insulation_mineral_wool", "Mineral wool insulation"),
    ("insulation_cellulose", "Cellulose insulation"),
    ("plasterboard", "Plasterboard"),
    ("ceramic_tiles", "Ceramic tiles"),
];

static MATERIAL_LABELS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| MATERIAL_CLASSES.iter().copied().collect());

/// Display name for a class key, or the key itself when it is not in the table
pub fn display_name(class: &str) -> &str {
    MATERIAL_LABELS.get(class).copied().unwrap_or(class)
}

pub fn is_known_class(class: &str) -> bool {
    MATERIAL_LABELS.contains_key(class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_classes_resolve() {
        for (key, name) in MATERIAL_CLASSES {
            assert_eq!(display_name(key), *name);
            assert!(is_known_class(key));
        }
    }

    #[test]
    fn test_unknown_class_passes_through() {
        assert_eq!(display_name("class_17"), "class_17");
        assert_eq!(display_name(""), "");
        assert!(!is_known_class("Bricks (common)"));
    }

    #[test]
    fn test_keys_are_unique() {
        assert_eq!(MATERIAL_LABELS.len(), MATERIAL_CLASSES.len());
    }
}
