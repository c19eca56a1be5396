use crate::types::Modifiers;
use std::fmt;

const ALT_BIT: u8 = 0b1000;
const CTRL_BIT: u8 = 0b0100;
const META_BIT: u8 = 0b0010;
const SHIFT_BIT: u8 = 0b0001;

/// Compact identifier of a modifier combination, one bit per modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u8);

impl Fingerprint {
    pub const NONE: Fingerprint = Fingerprint(0);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn modifiers(self) -> Modifiers {
        Modifiers {
            alt: self.0 & ALT_BIT != 0,
            ctrl: self.0 & CTRL_BIT != 0,
            meta: self.0 & META_BIT != 0,
            shift: self.0 & SHIFT_BIT != 0,
        }
    }
}

pub const fn generate(mods: Modifiers) -> Fingerprint {
    let mut bits = 0;
    if mods.alt {
        bits |= ALT_BIT;
    }
    if mods.ctrl {
        bits |= CTRL_BIT;
    }
    if mods.meta {
        bits |= META_BIT;
    }
    if mods.shift {
        bits |= SHIFT_BIT;
    }
    Fingerprint(bits)
}

impl From<Modifiers> for Fingerprint {
    fn from(mods: Modifiers) -> Self {
        generate(mods)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06b}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Modifier;
    use std::collections::HashSet;

    fn all_combinations() -> Vec<Modifiers> {
        (0u8..16)
            .map(|n| Modifiers {
                alt: n & 1 != 0,
                ctrl: n & 2 != 0,
                meta: n & 4 != 0,
                shift: n & 8 != 0,
            })
            .collect()
    }

    #[test]
    fn test_all_combinations_are_distinct() {
        let fingerprints: HashSet<Fingerprint> = all_combinations().into_iter().map(generate).collect();
        assert_eq!(fingerprints.len(), 16);
    }

    #[test]
    fn test_decode_restores_modifiers() {
        for mods in all_combinations() {
            assert_eq!(generate(mods).modifiers(), mods, "{:?}", mods);
        }
    }

    #[test]
    fn test_has_agrees_with_set() {
        for modifier in Modifier::ALL {
            let mut mods = Modifiers::none();
            assert!(!mods.has(modifier));
            mods.set(modifier);
            assert!(mods.has(modifier));
            assert_eq!(Modifier::ALL.iter().filter(|m| mods.has(**m)).count(), 1);
        }
    }

    #[test]
    fn test_no_modifiers_is_zero() {
        assert_eq!(generate(Modifiers::none()), Fingerprint::NONE);
        assert_eq!(
            generate(Modifiers {
                ctrl: true,
                shift: true,
                ..Modifiers::none()
            })
            .bits(),
            CTRL_BIT | SHIFT_BIT
        );
    }
}
