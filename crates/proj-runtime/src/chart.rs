//! Chart-ready pivot of scenario projections.
//!
//! One row per month, one column per scenario and metric, keyed
//! `"{scenario}_{suffix}"`. Renderers plot straight from these rows.

use crate::ScenarioProjection;
use serde::Serialize;
use std::collections::BTreeMap;

/// Column suffixes, in the order they are written for each scenario.
pub const METRIC_SUFFIXES: [&str; 5] = ["revenue", "profit", "partners", "margin", "cumRevenue"];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartRow {
    pub month: u32,
    pub label: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// Pivot projections into per-month chart rows.
///
/// Rows follow the first projection's months. Scenarios sharing a name
/// write the same columns, so the later one wins.
pub fn pivot_chart_rows(projections: &[ScenarioProjection]) -> Vec<ChartRow> {
    let Some(first) = projections.first() else {
        return vec![];
    };
    first
        .months
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let mut values = BTreeMap::new();
            for p in projections {
                let Some(month) = p.months.get(i) else {
                    continue;
                };
                let metrics = [
                    month.total_revenue,
                    month.total_profit,
                    month.total_partners,
                    month.margin_pct,
                    month.cumulative_revenue,
                ];
                for (suffix, value) in METRIC_SUFFIXES.iter().zip(metrics) {
                    values.insert(format!("{}_{}", p.name, suffix), value);
                }
            }
            ChartRow {
                month: m.month,
                label: m.label.clone(),
                values,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project_model;
    use proj_core::Model;

    #[test]
    fn one_row_per_month_with_every_scenario() {
        let model = Model::default();
        let projections = project_model(&model);
        let rows = pivot_chart_rows(&projections);
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].values.len(), 3 * METRIC_SUFFIXES.len());
        let base = &projections[1].months[4];
        assert_eq!(rows[4].month, 5);
        assert_eq!(rows[4].values["Base Case_revenue"], base.total_revenue);
        assert_eq!(rows[4].values["Base Case_profit"], base.total_profit);
        assert_eq!(rows[4].values["Base Case_partners"], base.total_partners);
        assert_eq!(rows[4].values["Base Case_margin"], base.margin_pct);
        assert_eq!(
            rows[4].values["Base Case_cumRevenue"],
            base.cumulative_revenue
        );
    }

    #[test]
    fn rows_serialize_flat() {
        let projections = project_model(&Model::default());
        let rows = pivot_chart_rows(&projections[..1]);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["month"], 1);
        assert_eq!(json["label"], "M1");
        assert!(json.get("Conservative_cumRevenue").is_some());
        assert!(json.get("values").is_none());
    }

    #[test]
    fn duplicate_names_last_wins() {
        let mut model = Model::default();
        model.scenarios[2].name = "Base Case".to_string();
        let projections = project_model(&model);
        let rows = pivot_chart_rows(&projections);
        assert_eq!(rows[11].values.len(), 2 * METRIC_SUFFIXES.len());
        assert_eq!(
            rows[11].values["Base Case_revenue"],
            projections[2].months[11].total_revenue
        );
    }

    #[test]
    fn no_projections_no_rows() {
        assert!(pivot_chart_rows(&[]).is_empty());
    }
}
