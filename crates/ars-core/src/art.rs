use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Ability name used for laboratory work.
pub const MAGIC_THEORY: &str = "Magic Theory";
/// Ability name that improves teaching.
pub const TEACHING: &str = "Teaching";

/// The fifteen Hermetic Arts: five Techniques and ten Forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Art {
    /// Technique of creating.
    Creo,
    /// Technique of perceiving.
    Intellego,
    /// Technique of transforming.
    Muto,
    /// Technique of destroying.
    Perdo,
    /// Technique of controlling.
    Rego,
    /// Form of beasts.
    Animal,
    /// Form of water.
    Aquam,
    /// Form of air.
    Auram,
    /// Form of the human body.
    Corpus,
    /// Form of plants.
    Herbam,
    /// Form of fire.
    Ignem,
    /// Form of images.
    Imaginem,
    /// Form of the mind.
    Mentem,
    /// Form of earth.
    Terram,
    /// Form of raw magic.
    Vim,
}

impl Art {
    /// The five Techniques.
    pub const TECHNIQUES: [Art; 5] = [Self::Creo, Self::Intellego, Self::Muto, Self::Perdo, Self::Rego];

    /// The ten Forms.
    pub const FORMS: [Art; 10] = [
        Self::Animal,
        Self::Aquam,
        Self::Auram,
        Self::Corpus,
        Self::Herbam,
        Self::Ignem,
        Self::Imaginem,
        Self::Mentem,
        Self::Terram,
        Self::Vim,
    ];

    /// Returns true for Creo, Intellego, Muto, Perdo, and Rego.
    pub fn is_technique(self) -> bool {
        Self::TECHNIQUES.contains(&self)
    }

    /// Returns true for the ten Forms.
    pub fn is_form(self) -> bool {
        !self.is_technique()
    }

    /// The Latin name of the Art.
    pub fn name(self) -> &'static str {
        match self {
            Self::Creo => "Creo",
            Self::Intellego => "Intellego",
            Self::Muto => "Muto",
            Self::Perdo => "Perdo",
            Self::Rego => "Rego",
            Self::Animal => "Animal",
            Self::Aquam => "Aquam",
            Self::Auram => "Auram",
            Self::Corpus => "Corpus",
            Self::Herbam => "Herbam",
            Self::Ignem => "Ignem",
            Self::Imaginem => "Imaginem",
            Self::Mentem => "Mentem",
            Self::Terram => "Terram",
            Self::Vim => "Vim",
        }
    }
}

impl fmt::Display for Art {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Art {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::TECHNIQUES
            .iter()
            .chain(Self::FORMS.iter())
            .copied()
            .find(|art| art.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownArt(s.to_string()))
    }
}

/// The eight characteristics of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Characteristic {
    /// Reasoning and memory.
    Intelligence,
    /// Awareness of surroundings.
    Perception,
    /// Physical power.
    Strength,
    /// Endurance and resilience.
    Stamina,
    /// Force of personality.
    Presence,
    /// Skill with words.
    Communication,
    /// Hand-eye coordination.
    Dexterity,
    /// Speed of movement.
    Quickness,
}

impl Characteristic {
    /// All characteristics in sheet order.
    pub const ALL: [Characteristic; 8] = [
        Self::Intelligence,
        Self::Perception,
        Self::Strength,
        Self::Stamina,
        Self::Presence,
        Self::Communication,
        Self::Dexterity,
        Self::Quickness,
    ];
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl FromStr for Characteristic {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| {
                let name = c.to_string();
                name.eq_ignore_ascii_case(wanted) || name[..3].eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| CoreError::UnknownCharacteristic(s.to_string()))
    }
}

/// Something a character gains experience in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// One of the Hermetic Arts.
    Art(Art),
    /// A named Ability such as "Magic Theory" or "Latin".
    Ability(String),
}

impl Subject {
    /// Parse an Art name, falling back to an Ability of that name.
    pub fn parse(s: &str) -> Self {
        s.parse::<Art>()
            .map(Self::Art)
            .unwrap_or_else(|_| Self::Ability(s.trim().to_string()))
    }

    /// Returns true if this subject is a Hermetic Art.
    pub fn is_art(&self) -> bool {
        matches!(self, Self::Art(_))
    }

    /// Convert a score in this subject into the experience needed to reach it.
    pub fn xp_for_score(&self, score: u32) -> u32 {
        match self {
            Self::Art(_) => art_xp_for(score),
            Self::Ability(_) => ability_xp_for(score),
        }
    }

    /// Convert accumulated experience into a score in this subject.
    pub fn score_for_xp(&self, xp: u32) -> u32 {
        match self {
            Self::Art(_) => art_score(xp),
            Self::Ability(_) => ability_score(xp),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Art(art) => write!(f, "{art}"),
            Self::Ability(name) => f.write_str(name),
        }
    }
}

/// Experience needed for an Art score: `n(n+1)/2`.
pub fn art_xp_for(score: u32) -> u32 {
    score * (score + 1) / 2
}

/// Experience needed for an Ability score: `5n(n+1)/2`.
pub fn ability_xp_for(score: u32) -> u32 {
    5 * art_xp_for(score)
}

/// Highest Art score reachable with `xp` experience.
pub fn art_score(xp: u32) -> u32 {
    let mut score = 0;
    while art_xp_for(score + 1) <= xp {
        score += 1;
    }
    score
}

/// Highest Ability score reachable with `xp` experience.
pub fn ability_score(xp: u32) -> u32 {
    art_score(xp / 5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn techniques_and_forms_partition_the_arts() {
        assert_eq!(Art::TECHNIQUES.len() + Art::FORMS.len(), 15);
        assert!(Art::Creo.is_technique());
        assert!(Art::Vim.is_form());
        assert!(!Art::Ignem.is_technique());
    }

    #[test]
    fn art_parse_is_case_insensitive() {
        assert_eq!("creo".parse::<Art>().unwrap(), Art::Creo);
        assert_eq!(" IMAGINEM ".parse::<Art>().unwrap(), Art::Imaginem);
        assert!("Pyro".parse::<Art>().is_err());
    }

    #[test]
    fn characteristic_accepts_abbreviations() {
        assert_eq!("Int".parse::<Characteristic>().unwrap(), Characteristic::Intelligence);
        assert_eq!(
            "communication".parse::<Characteristic>().unwrap(),
            Characteristic::Communication
        );
        assert!("Luck".parse::<Characteristic>().is_err());
    }

    #[test]
    fn subject_parse_falls_back_to_ability() {
        assert_eq!(Subject::parse("Vim"), Subject::Art(Art::Vim));
        assert_eq!(
            Subject::parse("Magic Theory"),
            Subject::Ability(MAGIC_THEORY.into())
        );
    }

    #[test]
    fn art_experience_table() {
        assert_eq!(art_xp_for(5), 15);
        assert_eq!(art_xp_for(10), 55);
        assert_eq!(art_score(54), 9);
        assert_eq!(art_score(55), 10);
        assert_eq!(art_score(0), 0);
    }

    #[test]
    fn ability_experience_table() {
        assert_eq!(ability_xp_for(1), 5);
        assert_eq!(ability_xp_for(3), 30);
        assert_eq!(ability_score(29), 2);
        assert_eq!(ability_score(30), 3);
    }

    #[test]
    fn subject_serializes_externally_tagged() {
        let json = serde_json::to_string(&Subject::Art(Art::Creo)).unwrap();
        assert_eq!(json, r#"{"art":"Creo"}"#);
        let back: Subject = serde_json::from_str(r#"{"ability":"Latin"}"#).unwrap();
        assert_eq!(back, Subject::Ability("Latin".into()));
    }
}
