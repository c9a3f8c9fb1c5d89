//! Attributes and the attribute triangle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An offensive or defensive attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Raw force.
    Strength,
    /// Speed and footwork.
    Agility,
    /// Cunning and arcane skill.
    Intelligence,
}

impl Attribute {
    /// Every attribute, in triangle order.
    pub const ALL: [Attribute; 3] = [
        Attribute::Strength,
        Attribute::Agility,
        Attribute::Intelligence,
    ];

    /// The attribute that defends against an attack made with `self`.
    #[must_use]
    pub fn defended_by(self) -> Attribute {
        match self {
            Attribute::Strength => Attribute::Agility,
            Attribute::Agility => Attribute::Intelligence,
            Attribute::Intelligence => Attribute::Strength,
        }
    }

    /// Lowercase display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Strength => "strength",
            Attribute::Agility => "agility",
            Attribute::Intelligence => "intelligence",
        }
    }
}

/// Maps an offensive attribute to the attribute the defender rolls with.
#[must_use]
pub fn defending_attribute(offense: Attribute) -> Attribute {
    offense.defended_by()
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string names no attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAttribute(pub String);

impl FromStr for Attribute {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strength" | "str" => Ok(Attribute::Strength),
            "agility" | "agi" => Ok(Attribute::Agility),
            "intelligence" | "int" => Ok(Attribute::Intelligence),
            _ => Err(UnknownAttribute(s.to_owned())),
        }
    }
}

/// Attribute scores of one combatant. Fixed for the whole session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Strength score.
    pub strength: u32,
    /// Agility score.
    pub agility: u32,
    /// Intelligence score.
    pub intelligence: u32,
}

impl Attributes {
    /// Creates a score block.
    #[must_use]
    pub fn new(strength: u32, agility: u32, intelligence: u32) -> Self {
        Self {
            strength,
            agility,
            intelligence,
        }
    }

    /// The score for `attribute`.
    #[must_use]
    pub fn score(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Agility => self.agility,
            Attribute::Intelligence => self.intelligence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_mapping() {
        assert_eq!(defending_attribute(Attribute::Strength), Attribute::Agility);
        assert_eq!(
            defending_attribute(Attribute::Agility),
            Attribute::Intelligence
        );
        assert_eq!(
            defending_attribute(Attribute::Intelligence),
            Attribute::Strength
        );
    }

    #[test]
    fn test_triangle_closes_after_three_steps() {
        for a in Attribute::ALL {
            let back = defending_attribute(defending_attribute(defending_attribute(a)));
            assert_eq!(back, a);
        }
    }

    #[test]
    fn test_no_attribute_defends_itself() {
        for a in Attribute::ALL {
            assert_ne!(defending_attribute(a), a);
        }
    }

    #[test]
    fn test_parse_names_and_abbreviations() {
        assert_eq!("Strength".parse::<Attribute>(), Ok(Attribute::Strength));
        assert_eq!("agi".parse::<Attribute>(), Ok(Attribute::Agility));
        assert_eq!("INT".parse::<Attribute>(), Ok(Attribute::Intelligence));
        assert_eq!(
            "charisma".parse::<Attribute>(),
            Err(UnknownAttribute("charisma".to_owned()))
        );
    }

    #[test]
    fn test_score_lookup() {
        let attrs = Attributes::new(5, 3, 1);
        assert_eq!(attrs.score(Attribute::Strength), 5);
        assert_eq!(attrs.score(Attribute::Agility), 3);
        assert_eq!(attrs.score(Attribute::Intelligence), 1);
    }
}
