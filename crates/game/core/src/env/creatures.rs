use crate::creature::Creature;
use crate::ids::CreatureId;

/// Read access to creatures (the "creature store").
///
/// Implemented by [`crate::CreatureRegistry`]; hosts that keep creatures
/// elsewhere can implement it themselves for read-only tooling.
pub trait CreatureOracle {
    fn creature(&self, id: CreatureId) -> Option<&Creature>;

    fn exists(&self, id: CreatureId) -> bool {
        self.creature(id).is_some()
    }
}
