use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::art::Art;
use crate::error::{CoreError, CoreResult};

/// Pawns of vis held per Art. Also used to express a cost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisStock {
    pawns: BTreeMap<Art, u32>,
}

impl VisStock {
    /// Create an empty stock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stock from `(art, pawns)` pairs, summing duplicates.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Art, u32)>) -> Self {
        let mut stock = Self::new();
        for (art, pawns) in pairs {
            stock.add(art, pawns);
        }
        stock
    }

    /// Pawns held for one Art.
    pub fn get(&self, art: Art) -> u32 {
        self.pawns.get(&art).copied().unwrap_or(0)
    }

    /// Add pawns of an Art.
    pub fn add(&mut self, art: Art, pawns: u32) {
        if pawns == 0 {
            return;
        }
        *self.pawns.entry(art).or_insert(0) += pawns;
    }

    /// Add every pawn of another stock.
    pub fn merge(&mut self, other: &VisStock) {
        for (art, pawns) in other.iter() {
            self.add(art, pawns);
        }
    }

    /// Total pawns across all Arts.
    pub fn total(&self) -> u32 {
        self.pawns.values().sum()
    }

    /// Returns true if no pawns are held.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Iterate over non-empty `(art, pawns)` entries in Art order.
    pub fn iter(&self) -> impl Iterator<Item = (Art, u32)> + '_ {
        self.pawns
            .iter()
            .filter(|(_, pawns)| **pawns > 0)
            .map(|(art, pawns)| (*art, *pawns))
    }

    /// Returns true if every entry of `cost` is covered by this stock.
    pub fn can_cover(&self, cost: &VisStock) -> bool {
        cost.iter().all(|(art, pawns)| self.get(art) >= pawns)
    }

    /// Remove `cost` from this stock. Either the whole cost is deducted or
    /// nothing is.
    pub fn deduct(&mut self, cost: &VisStock) -> CoreResult<()> {
        if let Some((art, needed)) = cost.iter().find(|(art, pawns)| self.get(*art) < *pawns) {
            return Err(CoreError::InsufficientVis {
                art,
                needed,
                available: self.get(art),
            });
        }
        for (art, pawns) in cost.iter() {
            if let Some(held) = self.pawns.get_mut(&art) {
                *held -= pawns;
            }
        }
        self.pawns.retain(|_, pawns| *pawns > 0);
        Ok(())
    }

    /// The part of `cost` this stock can pay, leaving the remainder in `cost`.
    ///
    /// Used to draw first from a laboratory store and then from a covenant.
    pub fn take_available(&self, cost: &mut VisStock) -> VisStock {
        let mut taken = VisStock::new();
        for (art, pawns) in cost.pawns.iter_mut() {
            let share = (*pawns).min(self.get(*art));
            if share > 0 {
                taken.add(*art, share);
                *pawns -= share;
            }
        }
        cost.pawns.retain(|_, pawns| *pawns > 0);
        taken
    }
}

impl fmt::Display for VisStock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let parts: Vec<String> = self
            .iter()
            .map(|(art, pawns)| format!("{pawns} {art}"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_total() {
        let mut stock = VisStock::new();
        stock.add(Art::Vim, 3);
        stock.add(Art::Vim, 2);
        stock.add(Art::Creo, 1);
        assert_eq!(stock.get(Art::Vim), 5);
        assert_eq!(stock.total(), 6);
        assert_eq!(stock.to_string(), "1 Creo, 5 Vim");
    }

    #[test]
    fn deduct_is_all_or_nothing() {
        let mut stock = VisStock::from_pairs([(Art::Creo, 4), (Art::Ignem, 1)]);
        let cost = VisStock::from_pairs([(Art::Creo, 2), (Art::Ignem, 3)]);
        let err = stock.deduct(&cost).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientVis {
                art: Art::Ignem,
                needed: 3,
                available: 1
            }
        ));
        assert_eq!(stock.get(Art::Creo), 4);
        assert_eq!(stock.get(Art::Ignem), 1);
    }

    #[test]
    fn deduct_removes_exhausted_entries() {
        let mut stock = VisStock::from_pairs([(Art::Vim, 2)]);
        stock.deduct(&VisStock::from_pairs([(Art::Vim, 2)])).unwrap();
        assert!(stock.is_empty());
        assert_eq!(stock.iter().count(), 0);
    }

    #[test]
    fn take_available_splits_cost() {
        let lab = VisStock::from_pairs([(Art::Creo, 1)]);
        let mut cost = VisStock::from_pairs([(Art::Creo, 3), (Art::Vim, 2)]);
        let taken = lab.take_available(&mut cost);
        assert_eq!(taken, VisStock::from_pairs([(Art::Creo, 1)]));
        assert_eq!(cost, VisStock::from_pairs([(Art::Creo, 2), (Art::Vim, 2)]));
    }

    #[test]
    fn serializes_as_art_keyed_map() {
        let stock = VisStock::from_pairs([(Art::Vim, 2)]);
        let json = serde_json::to_string(&stock).unwrap();
        assert_eq!(json, r#"{"Vim":2}"#);
        let back: VisStock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stock);
    }
}
