//! Character records: raw contract data and the normalised shape the views use.
//!
//! Players and the boss share one record type; `EntityKind` only tags which
//! side of the arena a record belongs to.

use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::error::ContractError;

/// Big-number quantity as reported by the contract, kept as decimal text
/// until normalisation.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Quantity(pub String);

impl Quantity {
    pub fn to_u32(&self, field: &'static str) -> Result<u32, ContractError> {
        let text = self.0.trim();
        text.parse::<u32>()
            .map_err(|e| ContractError::Decode(format!("{field} = {text:?}: {e}")))
    }

    /// Event payloads may carry values larger than any record field; those saturate.
    pub fn to_u32_saturating(&self, field: &'static str) -> Result<u32, ContractError> {
        let text = self.0.trim();
        let wide: u128 = text
            .parse()
            .map_err(|e| ContractError::Decode(format!("{field} = {text:?}: {e}")))?;
        Ok(u32::try_from(wide).unwrap_or(u32::MAX))
    }
}

impl From<u64> for Quantity {
    fn from(v: u64) -> Self {
        Quantity(v.to_string())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }
        Ok(match Repr::deserialize(d)? {
            Repr::Text(s) => Quantity(s),
            Repr::Number(n) => Quantity(n.to_string()),
        })
    }
}

/// Character struct exactly as the contract returns it.
#[derive(Clone, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCharacter {
    pub name: String,
    #[serde(rename = "imageURI")]
    pub image_uri: String,
    pub hp: Quantity,
    pub max_hp: Quantity,
    pub attack_damage: Quantity,
    pub character_type: String,
}

impl RawCharacter {
    /// The contract answers "no character" with a zeroed struct.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Boss,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Character {
    pub kind: EntityKind,
    pub name: String,
    pub image_uri: String,
    hp: u32,
    pub max_hp: u32,
    pub attack_damage: u32,
    pub character_type: String,
}

impl Character {
    pub fn from_raw(raw: &RawCharacter, kind: EntityKind) -> Result<Self, ContractError> {
        let max_hp = raw.max_hp.to_u32("maxHp")?;
        let hp = raw.hp.to_u32("hp")?;
        if hp > max_hp {
            tracing::warn!(name = %raw.name, hp, max_hp, "hp above max, clamping");
        }
        Ok(Self {
            kind,
            name: raw.name.clone(),
            image_uri: raw.image_uri.clone(),
            hp: hp.min(max_hp),
            max_hp,
            attack_damage: raw.attack_damage.to_u32("attackDamage")?,
            character_type: raw.character_type.clone(),
        })
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    /// Patch current hp in place. Never exceeds `max_hp`.
    pub fn set_hp(&mut self, hp: u32) {
        self.hp = hp.min(self.max_hp);
    }

    /// Health bar fill, 0..=100.
    pub fn health_percent(&self) -> u32 {
        if self.max_hp == 0 {
            return 0;
        }
        (u64::from(self.hp) * 100 / u64::from(self.max_hp)) as u32
    }
}
