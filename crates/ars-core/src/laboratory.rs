use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::art::Art;
use crate::vis::VisStock;

/// Specialization name that improves enchanting.
pub const ENCHANTING: &str = "enchanting";

/// A magus's laboratory, keyed by its owner's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laboratory {
    /// Name of the owning magus.
    pub owner: String,
    /// Size; every point above 2 helps enchanting.
    pub size: i32,
    /// Safety rating.
    #[serde(default)]
    pub safety: i32,
    /// Specializations, e.g. "enchanting".
    #[serde(default)]
    pub specializations: BTreeSet<String>,
    /// Lab total bonus per Art.
    #[serde(default)]
    pub art_bonuses: BTreeMap<Art, i32>,
    /// Equipment and its bonus to every lab total.
    #[serde(default)]
    pub equipment: BTreeMap<String, i32>,
    /// Vis kept in the laboratory.
    #[serde(default)]
    pub vis_store: VisStock,
}

impl Laboratory {
    /// Create a standard laboratory.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            size: 0,
            safety: 0,
            specializations: BTreeSet::new(),
            art_bonuses: BTreeMap::new(),
            equipment: BTreeMap::new(),
            vis_store: VisStock::new(),
        }
    }

    /// Total equipment bonus.
    pub fn equipment_bonus(&self) -> i32 {
        self.equipment.values().sum()
    }

    /// Bonus added to a lab total for a technique and form.
    pub fn bonus_for(&self, technique: Art, form: Art) -> i32 {
        let art = |a: Art| self.art_bonuses.get(&a).copied().unwrap_or(0);
        art(technique) + art(form) + self.equipment_bonus()
    }

    /// Extra bonus for enchanting items.
    pub fn enchantment_bonus(&self) -> i32 {
        let specialization = if self.specializations.contains(ENCHANTING) {
            3
        } else {
            0
        };
        specialization + (self.size - 2).max(0)
    }
}
