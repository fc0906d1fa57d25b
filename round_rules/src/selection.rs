//! Platoon choice per faction and its fallback to the planet defaults.

use bevy::prelude::Resource;
use round_schema::{Faction, PerFaction, PlanetId, PlatoonId};
use thiserror::Error;

use crate::planet::PlanetDefinition;
use crate::platoon::{PlatoonCatalog, PlatoonDefinition};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown platoon `{0}`")]
    UnknownPlatoon(PlatoonId),
    #[error("platoon `{platoon}` fights for {actual}, not {expected}")]
    WrongFaction {
        platoon: PlatoonId,
        expected: Faction,
        actual: Faction,
    },
    #[error("platoon `{platoon}` is not available on planet `{planet}`")]
    NotAllowed { platoon: PlatoonId, planet: PlanetId },
}

/// Platoons explicitly chosen for the coming round. Unset factions fall back
/// to the planet's default.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlatoonSelection {
    chosen: PerFaction<Option<PlatoonId>>,
}

impl PlatoonSelection {
    pub fn choose(
        &mut self,
        faction: Faction,
        platoon: PlatoonId,
        catalog: &PlatoonCatalog,
        planet: Option<&PlanetDefinition>,
    ) -> Result<(), SelectionError> {
        check_platoon(catalog, faction, &platoon)?;
        if let Some(planet) = planet {
            if !planet.allows_platoon(faction, &platoon) {
                return Err(SelectionError::NotAllowed {
                    platoon,
                    planet: planet.id.clone(),
                });
            }
        }
        tracing::info!(
            target: "round_rules::selection",
            faction = %faction,
            platoon = %platoon,
            "platoon.chosen"
        );
        *self.chosen.get_mut(faction) = Some(platoon);
        Ok(())
    }

    pub fn clear(&mut self, faction: Faction) {
        *self.chosen.get_mut(faction) = None;
    }

    pub fn get(&self, faction: Faction) -> Option<&PlatoonId> {
        self.chosen.get(faction).as_ref()
    }
}

/// Platoons a faction may pick on `planet`.
pub fn available_platoons<'a>(
    catalog: &'a PlatoonCatalog,
    planet: &'a PlanetDefinition,
    faction: Faction,
) -> impl Iterator<Item = &'a PlatoonDefinition> + 'a {
    catalog
        .for_faction(faction)
        .filter(move |platoon| planet.allows_platoon(faction, &platoon.id))
}

/// Final loadout per faction: the explicit choice, else the planet default.
/// A faction with neither stays unassigned.
pub fn select_platoons<'a>(
    selection: &PlatoonSelection,
    planet: &PlanetDefinition,
    catalog: &'a PlatoonCatalog,
) -> Result<PerFaction<Option<&'a PlatoonDefinition>>, SelectionError> {
    let mut selected = PerFaction::<Option<&'a PlatoonDefinition>>::default();
    for faction in Faction::ALL {
        let id = selection
            .get(faction)
            .or(planet.faction(faction).default_platoon.as_ref());
        if let Some(id) = id {
            *selected.get_mut(faction) = Some(check_platoon(catalog, faction, id)?);
        }
    }
    Ok(selected)
}

fn check_platoon<'a>(
    catalog: &'a PlatoonCatalog,
    faction: Faction,
    id: &PlatoonId,
) -> Result<&'a PlatoonDefinition, SelectionError> {
    let platoon = catalog
        .get(id)
        .ok_or_else(|| SelectionError::UnknownPlatoon(id.clone()))?;
    if platoon.faction != faction {
        return Err(SelectionError::WrongFaction {
            platoon: id.clone(),
            expected: faction,
            actual: platoon.faction,
        });
    }
    Ok(platoon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planet::PlanetCatalog;

    fn lv624() -> PlanetDefinition {
        PlanetCatalog::builtin()
            .get(&PlanetId::new("lv624"))
            .cloned()
            .unwrap()
    }

    #[test]
    fn defaults_fill_unchosen_factions() {
        let catalog = PlatoonCatalog::builtin();
        let planet = lv624();
        let selected = select_platoons(&PlatoonSelection::default(), &planet, &catalog).unwrap();
        assert_eq!(
            selected.govfor.map(|p| p.id.as_str()),
            Some("colonial_marines")
        );
        assert_eq!(
            selected.opfor.map(|p| p.id.as_str()),
            Some("upp_naval_infantry")
        );
    }

    #[test]
    fn explicit_choice_wins_over_default() {
        let catalog = PlatoonCatalog::builtin();
        let planet = lv624();
        let mut selection = PlatoonSelection::default();
        selection
            .choose(Faction::Govfor, "forecon".into(), &catalog, Some(&planet))
            .unwrap();
        let selected = select_platoons(&selection, &planet, &catalog).unwrap();
        assert_eq!(selected.govfor.map(|p| p.id.as_str()), Some("forecon"));

        selection.clear(Faction::Govfor);
        let selected = select_platoons(&selection, &planet, &catalog).unwrap();
        assert_eq!(
            selected.govfor.map(|p| p.id.as_str()),
            Some("colonial_marines")
        );
    }

    #[test]
    fn choose_rejects_bad_platoons() {
        let catalog = PlatoonCatalog::builtin();
        let planet = lv624();
        let mut selection = PlatoonSelection::default();
        assert_eq!(
            selection.choose(Faction::Govfor, "ghosts".into(), &catalog, None),
            Err(SelectionError::UnknownPlatoon("ghosts".into()))
        );
        assert!(matches!(
            selection.choose(Faction::Govfor, "clf_insurgents".into(), &catalog, None),
            Err(SelectionError::WrongFaction { .. })
        ));
        let trijent = PlanetCatalog::builtin()
            .get(&PlanetId::new("trijent"))
            .cloned()
            .unwrap();
        assert!(matches!(
            selection.choose(Faction::Opfor, "upp_naval_infantry".into(), &catalog, Some(&trijent)),
            Err(SelectionError::NotAllowed { .. })
        ));
        assert!(selection.get(Faction::Opfor).is_none());
        assert!(selection
            .choose(Faction::Opfor, "upp_naval_infantry".into(), &catalog, Some(&planet))
            .is_ok());
    }

    #[test]
    fn unknown_default_is_an_error() {
        let catalog = PlatoonCatalog::builtin();
        let mut planet = lv624();
        planet.factions.opfor.default_platoon = Some("missing".into());
        assert_eq!(
            select_platoons(&PlatoonSelection::default(), &planet, &catalog).unwrap_err(),
            SelectionError::UnknownPlatoon("missing".into())
        );
    }

    #[test]
    fn available_platoons_respect_allow_list() {
        let catalog = PlatoonCatalog::builtin();
        let planet = lv624();
        let govfor: Vec<_> = available_platoons(&catalog, &planet, Faction::Govfor)
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(govfor, ["colonial_marines", "forecon"]);
    }
}
