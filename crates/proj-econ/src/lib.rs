#![deny(warnings)]

//! Unit economics for partner projections.
//!
//! This crate provides:
//! - Per-unit margins for bulk bags and retail pouches
//! - Per-partner monthly economics for a tier, assuming it stocks every
//!   product it is configured for
//!
//! Nothing here validates or fails. Degenerate inputs (empty selections,
//! zero divisors, unknown product ids) contribute zero.

use proj_core::{BulkProduct, Model, RetailProduct, Tier};
use serde::Serialize;
use tracing::debug;

/// Round half toward positive infinity, like JavaScript's `Math.round`.
///
/// `f64::round` rounds half away from zero, which differs for negative
/// halves (-2.5 becomes -3 instead of -2). Margins can be negative, so the
/// projection uses this everywhere instead.
pub fn js_round(v: f64) -> f64 {
    let floor = v.floor();
    if v - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Round to `dp` decimal places using [`js_round`].
pub fn round_to(v: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    js_round(v * factor) / factor
}

/// Margin per bag: wholesale price minus COGS. Negative when COGS exceed price.
pub fn bulk_margin(product: &BulkProduct) -> f64 {
    product.wholesale_price - product.cogs
}

/// Margin as a fraction of wholesale price; exactly 0 when the price is 0.
pub fn bulk_margin_pct(product: &BulkProduct) -> f64 {
    if product.wholesale_price > 0.0 {
        bulk_margin(product) / product.wholesale_price
    } else {
        0.0
    }
}

/// Margin per pouch at wholesale. The consumer retail price plays no part.
pub fn retail_margin(product: &RetailProduct) -> f64 {
    product.wholesale_price - product.cogs
}

/// Retail margin as a fraction of wholesale price; 0 when the price is 0.
pub fn retail_margin_pct(product: &RetailProduct) -> f64 {
    if product.wholesale_price > 0.0 {
        retail_margin(product) / product.wholesale_price
    } else {
        0.0
    }
}

/// Monthly consumption of one bulk product by one partner.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BulkLine {
    pub product_id: String,
    pub name: String,
    /// Units per month, rounded to cents precision.
    pub units: f64,
    /// Revenue per month, rounded to cents.
    pub revenue: f64,
}

/// Per-partner monthly economics of a tier at full attach.
///
/// Bulk figures and totals are rounded to cents. Retail figures are kept at
/// full precision; the projector scales them by attach rate before rounding.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TierEconomics {
    pub tier_id: String,
    pub label: String,
    pub servings_per_month: f64,
    pub bulk_lines: Vec<BulkLine>,
    pub bulk_rev: f64,
    pub bulk_profit: f64,
    pub retail_rev: f64,
    pub retail_profit: f64,
    pub total_rev: f64,
    pub total_profit: f64,
}

fn resolve<'a, T, F>(ids: &[String], catalog: &'a [T], id_of: F) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    ids.iter()
        .filter_map(|id| catalog.iter().find(|p| id_of(*p) == id.as_str()))
        .collect()
}

/// Compute one partner's monthly consumption, revenue and profit for `tier`.
pub fn tier_economics(
    tier: &Tier,
    bulk_catalog: &[BulkProduct],
    retail_catalog: &[RetailProduct],
) -> TierEconomics {
    let bulk = resolve(&tier.bulk_product_ids, bulk_catalog, |p| p.id.as_str());
    let retail = resolve(&tier.retail_product_ids, retail_catalog, |p| p.id.as_str());

    let servings_per_month = tier.drinks_per_day * tier.units_per_serving * tier.days_per_month;
    let servings_per_product = if bulk.is_empty() {
        0.0
    } else {
        servings_per_month / bulk.len() as f64
    };

    let mut bulk_rev = 0.0;
    let mut bulk_profit = 0.0;
    let mut bulk_lines = Vec::with_capacity(bulk.len());
    for p in &bulk {
        let units = if p.servings_per_unit != 0.0 {
            servings_per_product / p.servings_per_unit
        } else {
            0.0
        };
        let revenue = units * p.wholesale_price;
        bulk_rev += revenue;
        bulk_profit += units * bulk_margin(p);
        bulk_lines.push(BulkLine {
            product_id: p.id.clone(),
            name: p.name.clone(),
            units: round_to(units, 2),
            revenue: round_to(revenue, 2),
        });
    }

    let mut retail_rev = 0.0;
    let mut retail_profit = 0.0;
    if !retail.is_empty() {
        let units_per_product = tier.retail_units_per_month / retail.len() as f64;
        for p in &retail {
            retail_rev += units_per_product * p.wholesale_price;
            retail_profit += units_per_product * retail_margin(p);
        }
    }

    debug!(
        tier = %tier.id,
        bulk_selected = bulk.len(),
        retail_selected = retail.len(),
        servings_per_month,
        "tier economics"
    );

    TierEconomics {
        tier_id: tier.id.clone(),
        label: tier.label.clone(),
        servings_per_month,
        bulk_lines,
        bulk_rev: round_to(bulk_rev, 2),
        bulk_profit: round_to(bulk_profit, 2),
        retail_rev,
        retail_profit,
        total_rev: round_to(bulk_rev + retail_rev, 2),
        total_profit: round_to(bulk_profit + retail_profit, 2),
    }
}

/// Tier economics for every tier of the model, in tier order.
pub fn tier_economics_all(model: &Model) -> Vec<TierEconomics> {
    model
        .tiers
        .iter()
        .map(|t| tier_economics(t, &model.bulk_products, &model.retail_products))
        .collect()
}
