//! Data contracts shared by the round rules and the tooling around them.
//!
//! Everything here is plain serde data: identifiers, the faction set, marker
//! classes and destination kinds. Nothing in this crate depends on the ECS.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two sides of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Govfor,
    Opfor,
}

impl Faction {
    pub const ALL: [Faction; 2] = [Faction::Govfor, Faction::Opfor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Govfor => "govfor",
            Faction::Opfor => "opfor",
        }
    }

    /// Parses the free-form faction tags carried by ships and destinations.
    /// Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "govfor" => Some(Faction::Govfor),
            "opfor" => Some(Faction::Opfor),
            _ => None,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value held for each faction. A side left out of the data takes the
/// default value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerFaction<T> {
    #[serde(default)]
    pub govfor: T,
    #[serde(default)]
    pub opfor: T,
}

impl<T> PerFaction<T> {
    pub fn new(govfor: T, opfor: T) -> Self {
        Self { govfor, opfor }
    }

    pub fn get(&self, faction: Faction) -> &T {
        match faction {
            Faction::Govfor => &self.govfor,
            Faction::Opfor => &self.opfor,
        }
    }

    pub fn get_mut(&mut self, faction: Faction) -> &mut T {
        match faction {
            Faction::Govfor => &mut self.govfor,
            Faction::Opfor => &mut self.opfor,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Faction, &T)> {
        [(Faction::Govfor, &self.govfor), (Faction::Opfor, &self.opfor)].into_iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(Faction, &T) -> U) -> PerFaction<U> {
        PerFaction {
            govfor: f(Faction::Govfor, &self.govfor),
            opfor: f(Faction::Opfor, &self.opfor),
        }
    }
}

/// Role of a placeholder entity authored into a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerClass {
    LockedCommandDoor,
    LockedSecurityDoor,
    LockedGlassDoor,
    LockedNormalDoor,
    OverwatchConsole,
    ObjectivesConsole,
    ReturnPointGeneric,
    DropshipDestination,
    DropshipNavigation,
    DropshipWeapons,
    FighterDestination,
    WeaponVendor,
    AmmoVendor,
    MedicalVendor,
    EngineerVendor,
    UniformVendor,
    LeaderVendor,
}

impl MarkerClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerClass::LockedCommandDoor => "locked_command_door",
            MarkerClass::LockedSecurityDoor => "locked_security_door",
            MarkerClass::LockedGlassDoor => "locked_glass_door",
            MarkerClass::LockedNormalDoor => "locked_normal_door",
            MarkerClass::OverwatchConsole => "overwatch_console",
            MarkerClass::ObjectivesConsole => "objectives_console",
            MarkerClass::ReturnPointGeneric => "return_point_generic",
            MarkerClass::DropshipDestination => "dropship_destination",
            MarkerClass::DropshipNavigation => "dropship_navigation",
            MarkerClass::DropshipWeapons => "dropship_weapons",
            MarkerClass::FighterDestination => "fighter_destination",
            MarkerClass::WeaponVendor => "weapon_vendor",
            MarkerClass::AmmoVendor => "ammo_vendor",
            MarkerClass::MedicalVendor => "medical_vendor",
            MarkerClass::EngineerVendor => "engineer_vendor",
            MarkerClass::UniformVendor => "uniform_vendor",
            MarkerClass::LeaderVendor => "leader_vendor",
        }
    }

    pub fn is_door(&self) -> bool {
        matches!(
            self,
            MarkerClass::LockedCommandDoor
                | MarkerClass::LockedSecurityDoor
                | MarkerClass::LockedGlassDoor
                | MarkerClass::LockedNormalDoor
        )
    }
}

impl fmt::Display for MarkerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of craft a destination (or a shuttle console) serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationKind {
    Dropship,
    Fighter,
}

impl DestinationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationKind::Dropship => "dropship",
            DestinationKind::Fighter => "fighter",
        }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a concrete spawnable prototype.
    PrototypeId
);
string_id!(
    /// Identifier of an authored map (station, dropship or fighter).
    MapId
);
string_id!(
    /// Identifier of a platoon definition.
    PlatoonId
);
string_id!(
    /// Identifier of a planet (scenario) definition.
    PlanetId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faction_tags_parse_known_values_only() {
        assert_eq!(Faction::from_tag("govfor"), Some(Faction::Govfor));
        assert_eq!(Faction::from_tag("opfor"), Some(Faction::Opfor));
        assert_eq!(Faction::from_tag("clf"), None);
        assert_eq!(Faction::from_tag("GOVFOR"), None);
    }

    #[test]
    fn marker_class_serializes_snake_case() {
        let json = serde_json::to_string(&MarkerClass::LockedGlassDoor).unwrap();
        assert_eq!(json, "\"locked_glass_door\"");
        let parsed: MarkerClass = serde_json::from_str("\"return_point_generic\"").unwrap();
        assert_eq!(parsed, MarkerClass::ReturnPointGeneric);
        assert_eq!(parsed.as_str(), "return_point_generic");
    }

    #[test]
    fn per_faction_get_and_map() {
        let counts = PerFaction::new(2u32, 5u32);
        assert_eq!(*counts.get(Faction::Opfor), 5);
        let doubled = counts.map(|_, value| value * 2);
        assert_eq!(doubled, PerFaction::new(4, 10));
        let factions: Vec<_> = counts.iter().map(|(faction, _)| faction).collect();
        assert_eq!(factions, vec![Faction::Govfor, Faction::Opfor]);
    }

    #[test]
    fn per_faction_fills_missing_side_with_default() {
        let counts: PerFaction<u32> = serde_json::from_str(r#"{ "govfor": 4 }"#).unwrap();
        assert_eq!(counts, PerFaction::new(4, 0));
    }

    #[test]
    fn string_ids_convert_from_owned_strings() {
        let planet = String::from("lv624");
        assert_eq!(PlanetId::from(planet), PlanetId::new("lv624"));
    }

    #[test]
    fn string_ids_are_transparent() {
        let id: MapId = serde_json::from_str("\"dropship_alamo\"").unwrap();
        assert_eq!(id, MapId::new("dropship_alamo"));
        assert_eq!(id.to_string(), "dropship_alamo");
    }
}
