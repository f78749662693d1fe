//! The café menu: drink kinds with their preparation times.
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Drink {
    pub name: String,
    /// Minutes to prepare one unit.
    pub prep_time: u32,
    /// Share of historical orders, 0..1.
    pub frequency: f64,
    pub price: u32,
}

impl Drink {
    fn new(name: &str, prep_time: u32, frequency: f64, price: u32) -> Self {
        Self {
            name: name.to_string(),
            prep_time,
            frequency,
            price,
        }
    }
}

/// Drinks keyed by their `drinkType` slug.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Menu {
    drinks: BTreeMap<String, Drink>,
}

impl Menu {
    pub fn get(&self, drink_type: &str) -> Option<&Drink> {
        self.drinks.get(drink_type)
    }

    pub fn prep_time(&self, drink_type: &str) -> Option<u32> {
        self.get(drink_type).map(|d| d.prep_time)
    }
}

impl Default for Menu {
    fn default() -> Self {
        let drinks = [
            ("cold-brew", Drink::new("Cold Brew", 1, 0.25, 120)),
            ("espresso", Drink::new("Espresso", 2, 0.20, 150)),
            ("americano", Drink::new("Americano", 2, 0.15, 140)),
            ("cappuccino", Drink::new("Cappuccino", 4, 0.20, 180)),
            ("latte", Drink::new("Latte", 4, 0.12, 200)),
            ("mocha", Drink::new("Specialty (Mocha)", 6, 0.08, 250)),
        ]
        .into_iter()
        .map(|(slug, drink)| (slug.to_string(), drink))
        .collect();
        Self { drinks }
    }
}
