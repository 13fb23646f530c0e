#![deny(warnings)]

//! Scenario projector: 12 months of partner growth, revenue and profit.
//!
//! A projection is a fold over twelve months carrying the active partner
//! count and cumulative totals. Each month the prior partner base churns,
//! new partners are added, the base is split into small/medium/large cohorts
//! and every cohort contributes its tier's per-partner economics.

use chrono::{Months, NaiveDate};
use proj_core::{BulkProduct, Model, RetailProduct, Scenario, Tier, TierRole};
use proj_econ::{js_round, round_to, tier_economics, TierEconomics};
use serde::Serialize;
use tracing::debug;

pub mod chart;

pub use chart::{pivot_chart_rows, ChartRow};

/// Length of every projection.
pub const PROJECTION_MONTHS: u32 = 12;

/// One projected month. Currency is rounded to whole units, partner counts
/// to two decimals.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlyResult {
    pub month: u32,
    pub label: String,
    pub total_partners: f64,
    pub small_partners: f64,
    pub medium_partners: f64,
    pub large_partners: f64,
    pub bulk_revenue: f64,
    pub retail_revenue: f64,
    pub total_revenue: f64,
    pub bulk_profit: f64,
    pub retail_profit: f64,
    pub total_profit: f64,
    /// Profit over revenue, one decimal, 0-100 scale.
    pub margin_pct: f64,
    pub cumulative_revenue: f64,
    pub cumulative_profit: f64,
}

/// Tiers filling the small, medium and large cohorts.
#[derive(Clone, Copy, Debug, Default)]
pub struct CohortTiers<'a> {
    pub small: Option<&'a Tier>,
    pub medium: Option<&'a Tier>,
    pub large: Option<&'a Tier>,
}

impl<'a> CohortTiers<'a> {
    pub fn get(&self, role: TierRole) -> Option<&'a Tier> {
        match role {
            TierRole::Small => self.small,
            TierRole::Medium => self.medium,
            TierRole::Large => self.large,
        }
    }

    fn set(&mut self, role: TierRole, tier: Option<&'a Tier>) {
        match role {
            TierRole::Small => self.small = tier,
            TierRole::Medium => self.medium = tier,
            TierRole::Large => self.large = tier,
        }
    }
}

/// Assign tiers to cohorts.
///
/// The first tier tagged with a role fills it. A role nobody is tagged with
/// falls back to the untagged tier at its traditional position (0, 1, 2), so
/// an untagged three-tier list maps small, medium, large in order. Roles left
/// empty contribute nothing.
pub fn resolve_cohorts(tiers: &[Tier]) -> CohortTiers<'_> {
    let mut cohorts = CohortTiers::default();
    for role in TierRole::ALL {
        let tagged = tiers.iter().find(|t| t.role == Some(role));
        let positional = || tiers.get(role.position()).filter(|t| t.role.is_none());
        cohorts.set(role, tagged.or_else(positional));
    }
    cohorts
}

/// Unrounded active partner count for each month.
///
/// Month 1 is the starting base. Afterwards churn is applied to the prior
/// month before the constant net adds arrive.
pub fn partner_curve(scenario: &Scenario) -> Vec<f64> {
    let churn = scenario.monthly_churn_pct / 100.0;
    let mut active = scenario.starting_partners;
    let mut curve = Vec::with_capacity(PROJECTION_MONTHS as usize);
    for month in 1..=PROJECTION_MONTHS {
        if month > 1 {
            active = active * (1.0 - churn) + scenario.new_partners_per_month;
        }
        curve.push(active);
    }
    curve
}

/// Label for a 1-based projection month: `M3`, or `Mar 2025` with a start month.
pub fn month_label(start: Option<NaiveDate>, month: u32) -> String {
    start
        .and_then(|d| d.checked_add_months(Months::new(month.saturating_sub(1))))
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("M{month}"))
}

/// Full-precision monthly figures before display rounding.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct RawMonth {
    pub total_active: f64,
    pub cohorts: [f64; 3],
    pub bulk_rev: f64,
    pub bulk_profit: f64,
    pub retail_rev: f64,
    pub retail_profit: f64,
}

impl RawMonth {
    fn total_revenue(&self) -> f64 {
        self.bulk_rev + self.retail_rev
    }

    fn total_profit(&self) -> f64 {
        self.bulk_profit + self.retail_profit
    }
}

pub(crate) fn simulate(
    scenario: &Scenario,
    tiers: &[Tier],
    bulk_catalog: &[BulkProduct],
    retail_catalog: &[RetailProduct],
) -> Vec<RawMonth> {
    let cohorts = resolve_cohorts(tiers);
    let economics: Vec<(TierRole, Option<TierEconomics>)> = TierRole::ALL
        .iter()
        .map(|&role| {
            let econ = cohorts
                .get(role)
                .map(|t| tier_economics(t, bulk_catalog, retail_catalog));
            (role, econ)
        })
        .collect();
    let attach = scenario.retail_attach_pct / 100.0;

    partner_curve(scenario)
        .into_iter()
        .map(|total_active| {
            let mut raw = RawMonth {
                total_active,
                ..RawMonth::default()
            };
            for (role, econ) in &economics {
                let count = total_active * scenario.pct_for(*role) / 100.0;
                raw.cohorts[role.position()] = count;
                if let Some(e) = econ {
                    raw.bulk_rev += count * e.bulk_rev;
                    raw.bulk_profit += count * e.bulk_profit;
                    raw.retail_rev += count * e.retail_rev * attach;
                    raw.retail_profit += count * e.retail_profit * attach;
                }
            }
            raw
        })
        .collect()
}

/// Project `scenario` over twelve months with `M1..M12` labels.
///
/// The first three cohorts are filled from `tiers` as described in
/// [`resolve_cohorts`]. Pure: identical inputs give identical output.
pub fn project_scenario(
    scenario: &Scenario,
    tiers: &[Tier],
    bulk_catalog: &[BulkProduct],
    retail_catalog: &[RetailProduct],
) -> Vec<MonthlyResult> {
    project_scenario_from(scenario, tiers, bulk_catalog, retail_catalog, None)
}

/// Like [`project_scenario`], labelling months from `start` when given.
pub fn project_scenario_from(
    scenario: &Scenario,
    tiers: &[Tier],
    bulk_catalog: &[BulkProduct],
    retail_catalog: &[RetailProduct],
    start: Option<NaiveDate>,
) -> Vec<MonthlyResult> {
    let raw = simulate(scenario, tiers, bulk_catalog, retail_catalog);
    let mut cumulative_revenue = 0.0;
    let mut cumulative_profit = 0.0;
    let mut out = Vec::with_capacity(raw.len());
    for (month, r) in (1..).zip(raw) {
        let total_revenue = r.total_revenue();
        let total_profit = r.total_profit();
        // Cumulative totals sum the displayed whole-unit monthly totals.
        cumulative_revenue += js_round(total_revenue);
        cumulative_profit += js_round(total_profit);
        let margin_pct = if total_revenue > 0.0 {
            js_round(total_profit / total_revenue * 1000.0) / 10.0
        } else {
            0.0
        };
        out.push(MonthlyResult {
            month,
            label: month_label(start, month),
            total_partners: round_to(r.total_active, 2),
            small_partners: round_to(r.cohorts[0], 2),
            medium_partners: round_to(r.cohorts[1], 2),
            large_partners: round_to(r.cohorts[2], 2),
            bulk_revenue: js_round(r.bulk_rev),
            retail_revenue: js_round(r.retail_rev),
            total_revenue: js_round(total_revenue),
            bulk_profit: js_round(r.bulk_profit),
            retail_profit: js_round(r.retail_profit),
            total_profit: js_round(total_profit),
            margin_pct,
            cumulative_revenue,
            cumulative_profit,
        });
    }
    debug!(
        scenario = %scenario.name,
        cumulative_revenue,
        cumulative_profit,
        "projected scenario"
    );
    out
}

/// A scenario's projection tagged with its name and chart color.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioProjection {
    pub name: String,
    pub color: String,
    pub months: Vec<MonthlyResult>,
}

/// Project every scenario of the model, in scenario order.
pub fn project_model(model: &Model) -> Vec<ScenarioProjection> {
    model
        .scenarios
        .iter()
        .map(|s| ScenarioProjection {
            name: s.name.clone(),
            color: s.color.clone(),
            months: project_scenario_from(
                s,
                &model.tiers,
                &model.bulk_products,
                &model.retail_products,
                model.start_month,
            ),
        })
        .collect()
}

/// Headline KPIs of one projection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub ending_partners: f64,
    pub final_month_revenue: f64,
    pub final_month_profit: f64,
    pub final_margin_pct: f64,
    pub cumulative_revenue: f64,
    pub cumulative_profit: f64,
    /// First month with a positive monthly profit, if any.
    pub first_profitable_month: Option<u32>,
}

pub fn summarize(projection: &ScenarioProjection) -> ScenarioSummary {
    let last = projection.months.last();
    ScenarioSummary {
        name: projection.name.clone(),
        ending_partners: last.map_or(0.0, |m| m.total_partners),
        final_month_revenue: last.map_or(0.0, |m| m.total_revenue),
        final_month_profit: last.map_or(0.0, |m| m.total_profit),
        final_margin_pct: last.map_or(0.0, |m| m.margin_pct),
        cumulative_revenue: last.map_or(0.0, |m| m.cumulative_revenue),
        cumulative_profit: last.map_or(0.0, |m| m.cumulative_profit),
        first_profitable_month: projection
            .months
            .iter()
            .find(|m| m.total_profit > 0.0)
            .map(|m| m.month),
    }
}
