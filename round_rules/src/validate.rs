//! Cross-catalog reference checks.

use round_schema::{Faction, MapId, PlanetId, PlatoonId, PrototypeId};
use thiserror::Error;

use crate::round::RoundCatalogs;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("planet `{planet}` references unknown {faction} platoon `{platoon}`")]
    UnknownPlatoon {
        planet: PlanetId,
        faction: Faction,
        platoon: PlatoonId,
    },
    #[error("planet `{planet}` assigns `{platoon}` to {faction} but it fights for {actual}")]
    PlatoonFaction {
        planet: PlanetId,
        faction: Faction,
        platoon: PlatoonId,
        actual: Faction,
    },
    #[error("planet `{planet}` defaults {faction} to `{platoon}`, which it does not allow")]
    DefaultNotAllowed {
        planet: PlanetId,
        faction: Faction,
        platoon: PlatoonId,
    },
    #[error("{owner} references map `{map}` with no blueprint")]
    UnknownMap { owner: String, map: MapId },
    #[error("{owner} references unknown prototype `{prototype}`")]
    UnknownPrototype { owner: String, prototype: PrototypeId },
}

/// Every dangling reference between the loaded catalogs.
pub fn validate_catalogs(catalogs: &RoundCatalogs) -> Vec<ValidationError> {
    let mut issues = Vec::new();
    check_planets(catalogs, &mut issues);
    check_platoons(catalogs, &mut issues);

    for prototype in catalogs.rules.referenced_prototypes() {
        if !catalogs.prototypes.contains(prototype) {
            issues.push(ValidationError::UnknownPrototype {
                owner: "spawn rules".to_string(),
                prototype: prototype.clone(),
            });
        }
    }

    for blueprint in catalogs.blueprints.iter() {
        for prototype in blueprint.prototypes() {
            if !catalogs.prototypes.contains(prototype) {
                issues.push(ValidationError::UnknownPrototype {
                    owner: format!("map `{}`", blueprint.id),
                    prototype: prototype.clone(),
                });
            }
        }
    }

    if !issues.is_empty() {
        tracing::warn!(
            target: "round_rules::catalog",
            issues = issues.len(),
            "catalog.validation_failed"
        );
    }
    issues
}

fn check_planets(catalogs: &RoundCatalogs, issues: &mut Vec<ValidationError>) {
    for planet in catalogs.planets.iter() {
        if let Some(map) = &planet.map {
            if !catalogs.blueprints.contains(map) {
                issues.push(ValidationError::UnknownMap {
                    owner: format!("planet `{}`", planet.id),
                    map: map.clone(),
                });
            }
        }

        for faction in Faction::ALL {
            let config = planet.faction(faction);
            let referenced = config.default_platoon.iter().chain(config.platoons.iter());
            for platoon_id in referenced {
                match catalogs.platoons.get(platoon_id) {
                    None => issues.push(ValidationError::UnknownPlatoon {
                        planet: planet.id.clone(),
                        faction,
                        platoon: platoon_id.clone(),
                    }),
                    Some(platoon) if platoon.faction != faction => {
                        issues.push(ValidationError::PlatoonFaction {
                            planet: planet.id.clone(),
                            faction,
                            platoon: platoon_id.clone(),
                            actual: platoon.faction,
                        })
                    }
                    Some(_) => {}
                }
            }

            if let Some(default) = &config.default_platoon {
                if !planet.allows_platoon(faction, default) {
                    issues.push(ValidationError::DefaultNotAllowed {
                        planet: planet.id.clone(),
                        faction,
                        platoon: default.clone(),
                    });
                }
            }
        }
    }
}

fn check_platoons(catalogs: &RoundCatalogs, issues: &mut Vec<ValidationError>) {
    for platoon in catalogs.platoons.iter() {
        let owner = format!("platoon `{}`", platoon.id);
        for map in platoon
            .compatible_dropships
            .iter()
            .chain(&platoon.compatible_fighters)
        {
            if !catalogs.blueprints.contains(map) {
                issues.push(ValidationError::UnknownMap {
                    owner: owner.clone(),
                    map: map.clone(),
                });
            }
        }

        let mut vendors: Vec<_> = platoon.vendor_markers_by_class.iter().collect();
        vendors.sort_by_key(|(class, _)| **class);
        for (_, prototype) in vendors {
            if !catalogs.prototypes.contains(prototype) {
                issues.push(ValidationError::UnknownPrototype {
                    owner: owner.clone(),
                    prototype: prototype.clone(),
                });
            }
        }
    }
}
