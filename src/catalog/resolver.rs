//! Contextual option lists for the form.
//!
//! Every lookup falls back to the field's full label universe (from the encoder
//! set, not the catalog) when the key is unknown, so a front-end never shows an
//! empty choice list and never sees an error from here.

use crate::catalog::Catalog;
use crate::domain::{Field, FilterOrder, MONTHS, Selection, Variant};
use crate::encode::EncoderSet;

/// Read-only view over the catalog + encoders.
#[derive(Debug, Clone, Copy)]
pub struct OptionResolver<'a> {
    catalog: &'a Catalog,
    encoders: &'a EncoderSet,
}

/// Option lists for every field plus a selection that is consistent with them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedForm {
    pub selection: Selection,
    pub provinces: Vec<String>,
    pub markets: Vec<String>,
    pub categories: Vec<String>,
    pub commodities: Vec<String>,
    pub units: Vec<String>,
}

impl ResolvedForm {
    pub fn options(&self, field: Field) -> &[String] {
        match field {
            Field::Admin1 => &self.provinces,
            Field::Market => &self.markets,
            Field::Category => &self.categories,
            Field::Commodity => &self.commodities,
            Field::Unit => &self.units,
        }
    }
}

impl<'a> OptionResolver<'a> {
    pub fn new(catalog: &'a Catalog, encoders: &'a EncoderSet) -> Self {
        Self { catalog, encoders }
    }

    pub fn provinces(&self) -> &'a [String] {
        self.encoders.options(Field::Admin1)
    }

    pub fn units(&self) -> &'a [String] {
        self.encoders.options(Field::Unit)
    }

    pub fn markets_for(&self, province: &str) -> &'a [String] {
        self.catalog
            .markets(province)
            .unwrap_or_else(|| self.encoders.options(Field::Market))
    }

    pub fn categories_for(&self, market: &str) -> &'a [String] {
        self.catalog
            .categories(market)
            .unwrap_or_else(|| self.encoders.options(Field::Category))
    }

    pub fn commodities_for(&self, market: &str, category: &str) -> &'a [String] {
        self.catalog
            .commodities(market, category)
            .unwrap_or_else(|| self.encoders.options(Field::Commodity))
    }

    pub fn commodities_for_category(&self, category: &str) -> &'a [String] {
        self.catalog
            .commodities_in_category(category)
            .unwrap_or_else(|| self.encoders.options(Field::Commodity))
    }

    /// Most frequent unit for the commodity, else the first known unit.
    pub fn default_unit_for(&self, commodity: &str) -> &'a str {
        self.catalog
            .default_unit(commodity)
            .or_else(|| self.units().first().map(String::as_str))
            .unwrap_or("")
    }

    /// Category choices under the variant's filter order.
    pub fn categories(&self, order: FilterOrder, market: &str) -> &'a [String] {
        match order {
            FilterOrder::MarketFirst => self.categories_for(market),
            FilterOrder::CategoryFirst => self.encoders.options(Field::Category),
        }
    }

    /// Commodity choices under the variant's filter order.
    pub fn commodities(&self, order: FilterOrder, market: &str, category: &str) -> &'a [String] {
        match order {
            FilterOrder::MarketFirst => self.commodities_for(market, category),
            FilterOrder::CategoryFirst => self.commodities_for_category(category),
        }
    }

    /// Run the cascade top-down.
    ///
    /// Values that are no longer offered are replaced with the first entry of
    /// their new list. The unit falls back to the commodity's default when the
    /// commodity was replaced or the unit is unknown.
    pub fn resolve(&self, selection: &Selection, variant: Variant) -> ResolvedForm {
        let mut sel = selection.clone();
        let order = variant.filter_order;

        let provinces = self.provinces();
        keep_or_first(&mut sel.province, provinces);

        let markets = self.markets_for(&sel.province);
        keep_or_first(&mut sel.market, markets);

        let categories = self.categories(order, &sel.market);
        keep_or_first(&mut sel.category, categories);

        let requested_commodity = sel.commodity.clone();
        let commodities = self.commodities(order, &sel.market, &sel.category);
        keep_or_first(&mut sel.commodity, commodities);

        let units = self.units();
        if sel.commodity != requested_commodity || !units.contains(&sel.unit) {
            let default_unit = self.default_unit_for(&sel.commodity);
            sel.unit = if units.iter().any(|u| u == default_unit) {
                default_unit.to_string()
            } else {
                units.first().cloned().unwrap_or_default()
            };
        }

        if !MONTHS.contains(&sel.month) {
            sel.month = *MONTHS.start();
        }

        ResolvedForm {
            selection: sel,
            provinces: provinces.to_vec(),
            markets: markets.to_vec(),
            categories: categories.to_vec(),
            commodities: commodities.to_vec(),
            units: units.to_vec(),
        }
    }

    /// Apply a user change to one field and re-resolve.
    ///
    /// Every field downstream of the changed one is reset, so it lands on the
    /// first entry of its new list (the unit lands on the commodity's default).
    pub fn select(&self, selection: &Selection, field: Field, value: &str, variant: Variant) -> ResolvedForm {
        let mut sel = selection.clone();
        sel.set_label(field, value);
        for dependent in dependents(field, variant.filter_order) {
            sel.set_label(*dependent, "");
        }
        self.resolve(&sel, variant)
    }
}

/// Fields whose option list (transitively) depends on `field`.
pub fn dependents(field: Field, order: FilterOrder) -> &'static [Field] {
    use Field::*;
    match (order, field) {
        (FilterOrder::MarketFirst, Admin1) => &[Market, Category, Commodity, Unit],
        (FilterOrder::MarketFirst, Market) => &[Category, Commodity, Unit],
        (FilterOrder::CategoryFirst, Admin1) => &[Market],
        (FilterOrder::CategoryFirst, Market) => &[],
        (_, Category) => &[Commodity, Unit],
        (_, Commodity) => &[Unit],
        (_, Unit) => &[],
    }
}

fn keep_or_first(value: &mut String, options: &[String]) {
    if options.contains(value) {
        return;
    }
    *value = options.first().cloned().unwrap_or_default();
}
