use serde::{Deserialize, Serialize};

/// Difficulty tier of a chart. Selects note density and lane count.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// Number of input lanes active at this tier.
    pub fn lane_count(self) -> u8 {
        match self {
            Difficulty::Hard => 6,
            Difficulty::Easy | Difficulty::Normal => 4,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Difficulty {
    type Err = crate::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(crate::DomainError::validation(format!(
                "unknown difficulty {:?}",
                other
            ))),
        }
    }
}
