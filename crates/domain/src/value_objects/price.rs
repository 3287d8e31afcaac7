use crate::value_objects::amount::FixedPointAmount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map;

/// A USD price for one whole token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    pub value: Decimal,
}

impl Price {
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// USD value of `amount` at this price. `None` on decimal overflow.
    pub fn value_of(&self, amount: &FixedPointAmount) -> Option<Decimal> {
        amount.to_decimal().checked_mul(self.value)
    }
}

impl From<Decimal> for Price {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

/// USD prices keyed by token address.
///
/// Addresses are compared case-insensitively, so checksummed and lower-case
/// forms of the same address resolve to one entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, Price>", into = "HashMap<String, Price>")]
pub struct PriceMap(HashMap<String, Price>);

impl PriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: &str, price: Price) {
        self.0.insert(address.to_lowercase(), price);
    }

    pub fn get(&self, address: &str) -> Option<Price> {
        self.0.get(&address.to_lowercase()).copied()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.get(address).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Price> {
        self.0.iter()
    }

    /// Returns a new map holding `self` plus every entry of `other` whose
    /// address `self` does not already price. Neither input is modified.
    pub fn extended_with(&self, other: &PriceMap) -> PriceMap {
        let mut merged = self.clone();
        for (address, price) in other.iter() {
            merged.0.entry(address.clone()).or_insert(*price);
        }
        merged
    }
}

impl From<HashMap<String, Price>> for PriceMap {
    fn from(entries: HashMap<String, Price>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<PriceMap> for HashMap<String, Price> {
    fn from(map: PriceMap) -> Self {
        map.0
    }
}

impl FromIterator<(String, Price)> for PriceMap {
    fn from_iter<I: IntoIterator<Item = (String, Price)>>(iter: I) -> Self {
        let mut map = PriceMap::new();
        for (address, price) in iter {
            map.insert(&address, price);
        }
        map
    }
}
