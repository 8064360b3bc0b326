//! Lookup tables derived from the historical dataset.
//!
//! Built once at startup and read-only afterwards. Every value list is sorted
//! lexicographically and deduplicated, and no list is ever empty (a key only
//! exists because at least one record produced it).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::PriceRecord;

/// Derived mappings used to narrow dropdown choices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    province_to_markets: BTreeMap<String, Vec<String>>,
    market_to_categories: BTreeMap<String, Vec<String>>,
    market_category_to_commodities: BTreeMap<(String, String), Vec<String>>,
    category_to_commodities: BTreeMap<String, Vec<String>>,
    commodity_to_default_unit: BTreeMap<String, String>,
    market_to_coords: BTreeMap<String, (f64, f64)>,
    records_used: usize,
}

/// Build the catalog from dataset records.
///
/// Records with an empty categorical field are ignored. A market's coordinates
/// come from its first record carrying both latitude and longitude; a market
/// whose rows only ever carry one of them has no coordinates. That only matters
/// for `FeatureSchema::WithCoords`, where ingest already requires both.
pub fn build(records: &[PriceRecord]) -> Catalog {
    let mut province_to_markets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut market_to_categories: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut market_category: BTreeMap<(String, String), BTreeSet<String>> = BTreeMap::new();
    let mut category_to_commodities: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut unit_counts = UnitCounts::default();
    let mut market_to_coords = BTreeMap::new();
    let mut records_used = 0usize;

    for rec in records.iter().filter(|r| r.is_complete()) {
        records_used += 1;

        province_to_markets
            .entry(rec.province.clone())
            .or_default()
            .insert(rec.market.clone());
        market_to_categories
            .entry(rec.market.clone())
            .or_default()
            .insert(rec.category.clone());
        market_category
            .entry((rec.market.clone(), rec.category.clone()))
            .or_default()
            .insert(rec.commodity.clone());
        category_to_commodities
            .entry(rec.category.clone())
            .or_default()
            .insert(rec.commodity.clone());

        unit_counts.observe(&rec.commodity, &rec.unit);

        // First observation wins; no averaging across records.
        if let Some(coords) = rec.coords() {
            market_to_coords.entry(rec.market.clone()).or_insert(coords);
        }
    }

    Catalog {
        province_to_markets: into_sorted_lists(province_to_markets),
        market_to_categories: into_sorted_lists(market_to_categories),
        market_category_to_commodities: into_sorted_lists(market_category),
        category_to_commodities: into_sorted_lists(category_to_commodities),
        commodity_to_default_unit: unit_counts.most_frequent(),
        market_to_coords,
        records_used,
    }
}

fn into_sorted_lists<K: Ord>(map: BTreeMap<K, BTreeSet<String>>) -> BTreeMap<K, Vec<String>> {
    map.into_iter()
        .map(|(k, set)| (k, set.into_iter().collect()))
        .collect()
}

/// Per-commodity unit frequencies, remembering first-seen order.
#[derive(Debug, Default)]
struct UnitCounts {
    by_commodity: HashMap<String, Vec<(String, usize)>>,
    order: Vec<String>,
}

impl UnitCounts {
    fn observe(&mut self, commodity: &str, unit: &str) {
        if !self.by_commodity.contains_key(commodity) {
            self.order.push(commodity.to_string());
        }
        let units = self.by_commodity.entry(commodity.to_string()).or_default();
        match units.iter_mut().find(|(u, _)| u == unit) {
            Some((_, n)) => *n += 1,
            None => units.push((unit.to_string(), 1)),
        }
    }

    /// Highest count wins; on a tie the unit seen first is kept.
    fn most_frequent(self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for commodity in self.order {
            let Some(units) = self.by_commodity.get(&commodity) else {
                continue;
            };
            let mut best: Option<&(String, usize)> = None;
            for entry in units {
                if best.is_none_or(|b| entry.1 > b.1) {
                    best = Some(entry);
                }
            }
            if let Some((unit, _)) = best {
                out.insert(commodity, unit.clone());
            }
        }
        out
    }
}

impl Catalog {
    pub fn markets(&self, province: &str) -> Option<&[String]> {
        self.province_to_markets.get(province).map(Vec::as_slice)
    }

    pub fn categories(&self, market: &str) -> Option<&[String]> {
        self.market_to_categories.get(market).map(Vec::as_slice)
    }

    pub fn commodities(&self, market: &str, category: &str) -> Option<&[String]> {
        self.market_category_to_commodities
            .get(&(market.to_string(), category.to_string()))
            .map(Vec::as_slice)
    }

    pub fn commodities_in_category(&self, category: &str) -> Option<&[String]> {
        self.category_to_commodities.get(category).map(Vec::as_slice)
    }

    pub fn default_unit(&self, commodity: &str) -> Option<&str> {
        self.commodity_to_default_unit.get(commodity).map(String::as_str)
    }

    pub fn coords_for(&self, market: &str) -> Option<(f64, f64)> {
        self.market_to_coords.get(market).copied()
    }

    pub fn provinces(&self) -> impl Iterator<Item = &str> {
        self.province_to_markets.keys().map(String::as_str)
    }

    pub fn province_count(&self) -> usize {
        self.province_to_markets.len()
    }

    pub fn market_count(&self) -> usize {
        self.market_to_categories.len()
    }

    pub fn category_count(&self) -> usize {
        self.category_to_commodities.len()
    }

    pub fn commodity_count(&self) -> usize {
        self.commodity_to_default_unit.len()
    }

    pub fn located_market_count(&self) -> usize {
        self.market_to_coords.len()
    }

    pub fn records_used(&self) -> usize {
        self.records_used
    }

    pub fn is_empty(&self) -> bool {
        self.records_used == 0
    }
}
