use round_schema::{Faction, PerFaction};

use crate::classifier::MarkerClassifier;
use crate::planet::PlanetDefinition;
use crate::platoon::PlatoonDefinition;
use crate::prototypes::PrototypeCatalog;
use crate::spawn_rules::SpawnRules;

/// Inputs of one round setup, borrowed for the duration of the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct RoundSetupContext<'a> {
    pub planet: &'a PlanetDefinition,
    pub platoons: PerFaction<Option<&'a PlatoonDefinition>>,
    pub prototypes: &'a PrototypeCatalog,
    pub rules: &'a SpawnRules,
}

impl<'a> RoundSetupContext<'a> {
    pub fn platoon(&self, faction: Faction) -> Option<&'a PlatoonDefinition> {
        *self.platoons.get(faction)
    }

    pub fn classifier(&self) -> MarkerClassifier<'a> {
        MarkerClassifier::new(self.rules, self.prototypes)
    }
}
