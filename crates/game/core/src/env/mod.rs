//! Traits describing the engine's external collaborators.
//!
//! Oracles expose item data, creature lookup, and species templates. The
//! engine talks to them through these narrow traits only, so hosts can back
//! them with whatever storage they own.
mod creatures;
mod items;
mod rng;
mod templates;

pub use creatures::CreatureOracle;
pub use items::{ItemOracle, ItemStorage};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use templates::{AttributeRange, CreatureTemplate, TemplateOracle};
