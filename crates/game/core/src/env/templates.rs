use crate::ids::TemplateId;
use crate::stats::{AttributeSet, BaseAttributes, CoreAttribute, GrowthRates};

/// Inclusive roll range for one base attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeRange {
    pub min: u32,
    pub max: u32,
}

impl AttributeRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: u32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub const fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Static species data a creature is created from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureTemplate {
    pub id: TemplateId,
    pub name: String,
    pub base_ranges: AttributeSet<AttributeRange>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub growth: GrowthRates,
}

impl CreatureTemplate {
    pub fn new(
        id: TemplateId,
        name: impl Into<String>,
        base_ranges: AttributeSet<AttributeRange>,
        growth: GrowthRates,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            base_ranges,
            growth,
        }
    }

    /// Returns the first attribute whose value falls outside its range.
    pub fn out_of_range(&self, base: &BaseAttributes) -> Option<(CoreAttribute, u32, AttributeRange)> {
        CoreAttribute::ALL.into_iter().find_map(|attr| {
            let value = *base.get(attr);
            let range = *self.base_ranges.get(attr);
            (!range.contains(value)).then_some((attr, value, range))
        })
    }
}

/// Read access to creature templates.
pub trait TemplateOracle {
    fn template(&self, id: TemplateId) -> Option<CreatureTemplate>;
}

impl<T: TemplateOracle + ?Sized> TemplateOracle for &T {
    fn template(&self, id: TemplateId) -> Option<CreatureTemplate> {
        (**self).template(id)
    }
}
