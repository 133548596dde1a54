//! PDK family registry.
//!
//! A family is a named PDK product line with its own independent set of
//! installed versions and active pointer. The set of known families is
//! small and fixed; archive contents are opaque to this crate.

use std::fmt;

/// A PDK family known to pdkup.
#[derive(Debug, PartialEq, Eq)]
pub struct Family {
    /// Family identifier, used in directory names and release tags.
    pub name: &'static str,

    /// Variants shipped inside a version of this family.
    pub variants: &'static [&'static str],

    /// Variant used when the caller does not name one.
    pub default_variant: &'static str,

    /// Tool name this family's version is declared under in a project's
    /// tool-metadata file.
    pub tool_name: &'static str,
}

impl Family {
    /// Look up a family by its identifier.
    pub fn by_name(name: &str) -> Option<&'static Family> {
        ALL_FAMILIES.iter().find(|f| f.name == name)
    }

    /// All known families.
    pub fn all() -> &'static [Family] {
        ALL_FAMILIES
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

static ALL_FAMILIES: &[Family] = &[
    Family {
        name: "sky130",
        variants: &["sky130A", "sky130B"],
        default_variant: "sky130A",
        tool_name: "open_pdks",
    },
    Family {
        name: "gf180mcu",
        variants: &["gf180mcuA", "gf180mcuB", "gf180mcuC", "gf180mcuD"],
        default_variant: "gf180mcuD",
        tool_name: "open_pdks",
    },
    Family {
        name: "ihp-sg13g2",
        variants: &["ihp-sg13g2"],
        default_variant: "ihp-sg13g2",
        tool_name: "ihp-sg13g2",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_known() {
        let family = Family::by_name("sky130").unwrap();
        assert_eq!(family.name, "sky130");
        assert_eq!(family.default_variant, "sky130A");
        assert_eq!(family.tool_name, "open_pdks");
    }

    #[test]
    fn test_by_name_unknown() {
        assert!(Family::by_name("tsmc65").is_none());
        assert!(Family::by_name("").is_none());
    }

    #[test]
    fn test_default_variant_is_listed() {
        for family in Family::all() {
            assert!(
                family.variants.contains(&family.default_variant),
                "{} default variant not in variant list",
                family.name
            );
        }
    }

    #[test]
    fn test_display() {
        let family = Family::by_name("gf180mcu").unwrap();
        assert_eq!(format!("{}", family), "gf180mcu");
    }
}
