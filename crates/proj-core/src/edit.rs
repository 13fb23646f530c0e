//! Immutable edits over a [`Model`] snapshot.
//!
//! Every helper returns a fresh model and leaves the receiver untouched, so a
//! caller can keep the previous snapshot around for undo or diffing.

use crate::{BulkProduct, Model, RetailProduct, Scenario, Tier};
use thiserror::Error;

/// Upper bound on scenarios an editor keeps side by side.
pub const MAX_SCENARIOS: usize = 5;

/// Failures of the edit helpers. The projection engine itself never errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("{kind} index {index} out of range (len {len})")]
    OutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
    #[error("scenario limit of {0} reached")]
    ScenarioLimit(usize),
    #[error("cannot remove the last scenario")]
    LastScenario,
}

fn replace_at<T: Clone>(
    items: &[T],
    index: usize,
    item: T,
    kind: &'static str,
) -> Result<Vec<T>, EditError> {
    if index >= items.len() {
        return Err(EditError::OutOfRange {
            kind,
            index,
            len: items.len(),
        });
    }
    let mut next = items.to_vec();
    next[index] = item;
    Ok(next)
}

impl Model {
    pub fn with_bulk_product(
        &self,
        index: usize,
        product: BulkProduct,
    ) -> Result<Model, EditError> {
        Ok(Model {
            bulk_products: replace_at(&self.bulk_products, index, product, "bulk product")?,
            ..self.clone()
        })
    }

    pub fn with_retail_product(
        &self,
        index: usize,
        product: RetailProduct,
    ) -> Result<Model, EditError> {
        Ok(Model {
            retail_products: replace_at(&self.retail_products, index, product, "retail product")?,
            ..self.clone()
        })
    }

    pub fn with_tier(&self, index: usize, tier: Tier) -> Result<Model, EditError> {
        Ok(Model {
            tiers: replace_at(&self.tiers, index, tier, "tier")?,
            ..self.clone()
        })
    }

    pub fn with_scenario(&self, index: usize, scenario: Scenario) -> Result<Model, EditError> {
        Ok(Model {
            scenarios: replace_at(&self.scenarios, index, scenario, "scenario")?,
            ..self.clone()
        })
    }

    /// Append a scenario, refusing once [`MAX_SCENARIOS`] are present.
    pub fn with_added_scenario(&self, scenario: Scenario) -> Result<Model, EditError> {
        if self.scenarios.len() >= MAX_SCENARIOS {
            return Err(EditError::ScenarioLimit(MAX_SCENARIOS));
        }
        let mut scenarios = self.scenarios.clone();
        scenarios.push(scenario);
        Ok(Model {
            scenarios,
            ..self.clone()
        })
    }

    /// Remove a scenario; at least one always remains.
    pub fn without_scenario(&self, index: usize) -> Result<Model, EditError> {
        if index >= self.scenarios.len() {
            return Err(EditError::OutOfRange {
                kind: "scenario",
                index,
                len: self.scenarios.len(),
            });
        }
        if self.scenarios.len() == 1 {
            return Err(EditError::LastScenario);
        }
        let mut scenarios = self.scenarios.clone();
        scenarios.remove(index);
        Ok(Model {
            scenarios,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_leaves_original_untouched() {
        let model = Model::default();
        let mut tier = model.tiers[0].clone();
        tier.drinks_per_day = 25.0;
        let next = model.with_tier(0, tier).unwrap();
        assert_eq!(next.tiers[0].drinks_per_day, 25.0);
        assert_eq!(model.tiers[0].drinks_per_day, 10.0);
        assert_eq!(next.tiers[1], model.tiers[1]);
        assert_eq!(next.scenarios, model.scenarios);
    }

    #[test]
    fn replace_out_of_range() {
        let model = Model::default();
        let p = model.bulk_products[0].clone();
        let err = model.with_bulk_product(7, p).unwrap_err();
        assert_eq!(
            err,
            EditError::OutOfRange {
                kind: "bulk product",
                index: 7,
                len: 2
            }
        );
        assert_eq!(err.to_string(), "bulk product index 7 out of range (len 2)");
    }

    #[test]
    fn product_and_scenario_edits() {
        let model = Model::default();
        let mut pouch = model.retail_products[1].clone();
        pouch.wholesale_price = 20.0;
        let next = model.with_retail_product(1, pouch).unwrap();
        assert_eq!(next.retail_products[1].wholesale_price, 20.0);

        let mut sc = model.scenarios[2].clone();
        sc.monthly_churn_pct = 0.0;
        let next = next.with_scenario(2, sc).unwrap();
        assert_eq!(next.scenarios[2].monthly_churn_pct, 0.0);
        assert_eq!(next.retail_products[1].wholesale_price, 20.0);
    }

    #[test]
    fn scenario_cap_is_enforced() {
        let mut model = Model::default();
        let extra = model.scenarios[0].clone();
        while model.scenarios.len() < MAX_SCENARIOS {
            model = model.with_added_scenario(extra.clone()).unwrap();
        }
        assert_eq!(
            model.with_added_scenario(extra).unwrap_err(),
            EditError::ScenarioLimit(MAX_SCENARIOS)
        );
    }

    #[test]
    fn last_scenario_cannot_be_removed() {
        let model = Model::default();
        let one = model.without_scenario(0).unwrap().without_scenario(0).unwrap();
        assert_eq!(one.scenarios.len(), 1);
        assert_eq!(one.scenarios[0].name, "Aggressive");
        assert_eq!(one.without_scenario(0).unwrap_err(), EditError::LastScenario);
        assert!(matches!(
            one.without_scenario(3),
            Err(EditError::OutOfRange { index: 3, .. })
        ));
    }
}
