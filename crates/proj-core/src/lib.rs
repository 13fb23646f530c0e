#![deny(warnings)]

//! Core data model for the partner projection engine.
//!
//! This crate defines the serializable records the engine consumes (product
//! catalogs, partner tiers, growth scenarios) together with non-fatal model
//! lints, model file loading and immutable edit helpers. Nothing in here
//! performs projection arithmetic; see `proj-econ` and `proj-runtime`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

pub mod config;
pub mod edit;

pub use config::{load_model, parse_model, ConfigError, ModelFormat};
pub use edit::{EditError, MAX_SCENARIOS};

/// Cafe-size ingredient bag sold wholesale for in-house drink preparation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulkProduct {
    /// Unique catalog key referenced by tiers.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Pack size, informational only (e.g. "1 kg").
    #[serde(default)]
    pub size_units: String,
    /// Servings obtainable from one unit.
    pub servings_per_unit: f64,
    /// Amount charged to the partner per unit.
    pub wholesale_price: f64,
    /// Cost of goods sold per unit. May exceed the wholesale price.
    pub cogs: f64,
}

/// Take-home pouch sold wholesale to a partner for consumer resale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetailProduct {
    /// Unique catalog key referenced by tiers.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Consumer shelf price, informational only.
    #[serde(default)]
    pub retail_price: f64,
    /// Amount charged to the partner per unit; this drives retail revenue.
    pub wholesale_price: f64,
    /// Cost of goods sold per unit.
    pub cogs: f64,
}

/// Cohort a tier fills in a scenario's partner mix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierRole {
    Small,
    Medium,
    Large,
}

impl TierRole {
    /// All roles in their traditional tier order.
    pub const ALL: [TierRole; 3] = [TierRole::Small, TierRole::Medium, TierRole::Large];

    /// Position a tier traditionally occupies when it carries no explicit role.
    pub fn position(self) -> usize {
        match self {
            TierRole::Small => 0,
            TierRole::Medium => 1,
            TierRole::Large => 2,
        }
    }
}

impl fmt::Display for TierRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TierRole::Small => "small",
            TierRole::Medium => "medium",
            TierRole::Large => "large",
        };
        f.write_str(s)
    }
}

/// Partner archetype with a consumption and stocking profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub id: String,
    pub label: String,
    /// Explicit cohort role. Untagged tiers fall back to their position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<TierRole>,
    /// References into the bulk catalog; unknown ids are ignored.
    pub bulk_product_ids: Vec<String>,
    pub drinks_per_day: f64,
    /// Product units per drink, e.g. teaspoons.
    pub units_per_serving: f64,
    pub days_per_month: f64,
    /// References into the retail catalog; may be empty.
    #[serde(default)]
    pub retail_product_ids: Vec<String>,
    /// Retail units sold per month, split evenly across the selected pouches.
    #[serde(default)]
    pub retail_units_per_month: f64,
}

/// Named growth, churn and mix assumptions for a 12-month projection.
///
/// All percentage fields are on the 0-100 scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Join key in chart output; expected to be unique.
    pub name: String,
    pub starting_partners: f64,
    pub new_partners_per_month: f64,
    pub pct_small: f64,
    pub pct_medium: f64,
    pub pct_large: f64,
    pub monthly_churn_pct: f64,
    pub retail_attach_pct: f64,
    /// Presentation only.
    #[serde(default)]
    pub color: String,
}

impl Scenario {
    /// Share of the partner base (0-100 scale) assigned to `role`.
    pub fn pct_for(&self, role: TierRole) -> f64 {
        match role {
            TierRole::Small => self.pct_small,
            TierRole::Medium => self.pct_medium,
            TierRole::Large => self.pct_large,
        }
    }

    pub fn mix_total(&self) -> f64 {
        self.pct_small + self.pct_medium + self.pct_large
    }
}

/// One immutable snapshot of everything the engine consumes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub bulk_products: Vec<BulkProduct>,
    #[serde(default)]
    pub retail_products: Vec<RetailProduct>,
    pub tiers: Vec<Tier>,
    pub scenarios: Vec<Scenario>,
    /// First calendar month of the projection; labels are `M1..M12` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_month: Option<NaiveDate>,
}

impl Default for Model {
    /// Demo model: two bags, two pouches, three cafe tiers and three scenarios.
    fn default() -> Self {
        let bag = |id: &str, name: &str, size: &str, servings: f64, price: f64, cogs: f64| {
            BulkProduct {
                id: id.to_string(),
                name: name.to_string(),
                size_units: size.to_string(),
                servings_per_unit: servings,
                wholesale_price: price,
                cogs,
            }
        };
        let pouch = |id: &str, name: &str, retail: f64, price: f64, cogs: f64| RetailProduct {
            id: id.to_string(),
            name: name.to_string(),
            retail_price: retail,
            wholesale_price: price,
            cogs,
        };
        fn ids(v: &[&str]) -> Vec<String> {
            v.iter().map(|s| s.to_string()).collect()
        }

        Model {
            bulk_products: vec![
                bag("bag-signature", "Signature Blend Bag", "1 kg", 180.0, 80.0, 12.93),
                bag("bag-ceremonial", "Ceremonial Grade Bag", "500 g", 100.0, 95.0, 22.4),
            ],
            retail_products: vec![
                pouch("pouch-classic", "Classic Pouch", 34.99, 17.5, 5.2),
                pouch("pouch-ceremonial", "Ceremonial Pouch", 44.99, 22.5, 8.75),
            ],
            tiers: vec![
                Tier {
                    id: "tier-small".to_string(),
                    label: "Small Cafe".to_string(),
                    role: None,
                    bulk_product_ids: ids(&["bag-signature"]),
                    drinks_per_day: 10.0,
                    units_per_serving: 1.0,
                    days_per_month: 30.0,
                    retail_product_ids: ids(&["pouch-classic"]),
                    retail_units_per_month: 10.0,
                },
                Tier {
                    id: "tier-medium".to_string(),
                    label: "Medium Cafe".to_string(),
                    role: None,
                    bulk_product_ids: ids(&["bag-signature", "bag-ceremonial"]),
                    drinks_per_day: 30.0,
                    units_per_serving: 1.0,
                    days_per_month: 30.0,
                    retail_product_ids: ids(&["pouch-classic", "pouch-ceremonial"]),
                    retail_units_per_month: 25.0,
                },
                Tier {
                    id: "tier-large".to_string(),
                    label: "Large Cafe".to_string(),
                    role: None,
                    bulk_product_ids: ids(&["bag-signature", "bag-ceremonial"]),
                    drinks_per_day: 80.0,
                    units_per_serving: 1.5,
                    days_per_month: 30.0,
                    retail_product_ids: ids(&["pouch-classic", "pouch-ceremonial"]),
                    retail_units_per_month: 60.0,
                },
            ],
            scenarios: vec![
                Scenario {
                    name: "Conservative".to_string(),
                    starting_partners: 1.0,
                    new_partners_per_month: 1.0,
                    pct_small: 60.0,
                    pct_medium: 30.0,
                    pct_large: 10.0,
                    monthly_churn_pct: 3.0,
                    retail_attach_pct: 25.0,
                    color: "#94a3b8".to_string(),
                },
                Scenario {
                    name: "Base Case".to_string(),
                    starting_partners: 1.0,
                    new_partners_per_month: 2.0,
                    pct_small: 50.0,
                    pct_medium: 35.0,
                    pct_large: 15.0,
                    monthly_churn_pct: 2.0,
                    retail_attach_pct: 40.0,
                    color: "#2563eb".to_string(),
                },
                Scenario {
                    name: "Aggressive".to_string(),
                    starting_partners: 3.0,
                    new_partners_per_month: 4.0,
                    pct_small: 40.0,
                    pct_medium: 40.0,
                    pct_large: 20.0,
                    monthly_churn_pct: 1.5,
                    retail_attach_pct: 60.0,
                    color: "#16a34a".to_string(),
                },
            ],
            start_month: None,
        }
    }
}

/// Non-fatal model diagnostics. The engine computes regardless; these are
/// what an editor surfaces as warnings.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelLint {
    /// Scenario mix does not add up to 100%.
    #[error("scenario '{scenario}' mix sums to {total}%, not 100%")]
    MixNotHundred { scenario: String, total: f64 },
    /// Tier references a bulk product missing from the catalog.
    #[error("tier '{tier}' references unknown bulk product '{product}'")]
    DanglingBulkProduct { tier: String, product: String },
    /// Tier references a retail product missing from the catalog.
    #[error("tier '{tier}' references unknown retail product '{product}'")]
    DanglingRetailProduct { tier: String, product: String },
    /// Tier resolves to no bulk product and will report zero bulk revenue.
    #[error("tier '{0}' has no bulk products selected")]
    NoBulkProducts(String),
    /// Two scenarios share a name; chart columns would collide.
    #[error("duplicate scenario name '{0}'")]
    DuplicateScenarioName(String),
    /// More scenarios than an editor allows.
    #[error("{0} scenarios configured, at most {max} are supported", max = MAX_SCENARIOS)]
    TooManyScenarios(usize),
    /// More than one tier is tagged with the same role; only the first is used.
    #[error("more than one tier tagged with role '{0}'")]
    DuplicateRole(TierRole),
}

const MIX_TOLERANCE: f64 = 1e-9;

/// Collect every lint for a model snapshot. An empty list means clean.
pub fn lint_model(model: &Model) -> Vec<ModelLint> {
    let mut lints = Vec::new();
    let bulk_ids: BTreeSet<&str> = model.bulk_products.iter().map(|p| p.id.as_str()).collect();
    let retail_ids: BTreeSet<&str> = model
        .retail_products
        .iter()
        .map(|p| p.id.as_str())
        .collect();

    let mut roles = BTreeSet::new();
    for tier in &model.tiers {
        let mut resolved = 0usize;
        for id in &tier.bulk_product_ids {
            if bulk_ids.contains(id.as_str()) {
                resolved += 1;
            } else {
                lints.push(ModelLint::DanglingBulkProduct {
                    tier: tier.id.clone(),
                    product: id.clone(),
                });
            }
        }
        if resolved == 0 {
            lints.push(ModelLint::NoBulkProducts(tier.id.clone()));
        }
        for id in &tier.retail_product_ids {
            if !retail_ids.contains(id.as_str()) {
                lints.push(ModelLint::DanglingRetailProduct {
                    tier: tier.id.clone(),
                    product: id.clone(),
                });
            }
        }
        if let Some(role) = tier.role {
            if !roles.insert(role) {
                lints.push(ModelLint::DuplicateRole(role));
            }
        }
    }

    if model.scenarios.len() > MAX_SCENARIOS {
        lints.push(ModelLint::TooManyScenarios(model.scenarios.len()));
    }
    let mut names = BTreeSet::new();
    for s in &model.scenarios {
        let total = s.mix_total();
        if (total - 100.0).abs() > MIX_TOLERANCE {
            lints.push(ModelLint::MixNotHundred {
                scenario: s.name.clone(),
                total,
            });
        }
        if !names.insert(s.name.as_str()) {
            lints.push(ModelLint::DuplicateScenarioName(s.name.clone()));
        }
    }
    lints
}
