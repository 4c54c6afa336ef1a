//! Reading sections out of a QuickBooks report.

use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Section {
    pub total: f64,
    pub breakdown: Map<String, Value>,
}

fn rows(node: &Value) -> &[Value] {
    let rows = node.get("Rows");
    rows.and_then(|r| r.get("Row"))
        .or(rows)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Last column holds the amount; the first holds the label.
fn amount(col_data: Option<&Value>) -> Option<f64> {
    col_data?
        .as_array()?
        .last()?
        .get("value")?
        .as_str()?
        .replace(',', "")
        .parse()
        .ok()
}

fn label(col_data: Option<&Value>) -> Option<String> {
    let text = col_data?.as_array()?.first()?.get("value")?.as_str()?;
    Some(text.trim().to_lowercase().replace(' ', "_"))
}

/// Finds the top-level section whose `group` matches, e.g. `Income`.
pub(crate) fn section(report: &Value, group: &str) -> Option<Section> {
    let node = rows(report)
        .iter()
        .find(|row| row.get("group").and_then(Value::as_str) == Some(group))?;
    let total = amount(node.pointer("/Summary/ColData"))?;
    let breakdown = rows(node)
        .iter()
        .filter_map(|row| {
            let cols = row.get("ColData");
            Some((label(cols)?, json!(amount(cols)?)))
        })
        .collect();
    Some(Section { total, breakdown })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_total_and_line_items() {
        let report = json!({ "Rows": { "Row": [
            { "group": "Income",
              "Rows": { "Row": [{ "ColData": [{ "value": "Labor Income" }, { "value": "1,250.00" }] }] },
              "Summary": { "ColData": [{ "value": "Total Income" }, { "value": "1250.00" }] } },
            { "group": "Expenses",
              "Summary": { "ColData": [{ "value": "Total Expenses" }, { "value": "300" }] } }
        ]}});
        let income = section(&report, "Income").unwrap();
        assert_eq!(income.total, 1250.0);
        assert_eq!(income.breakdown["labor_income"], 1250.0);

        let expenses = section(&report, "Expenses").unwrap();
        assert_eq!(expenses.total, 300.0);
        assert!(expenses.breakdown.is_empty());

        assert!(section(&report, "OtherIncome").is_none());
    }

    #[test]
    fn accepts_flat_row_arrays() {
        let report = json!({ "Rows": [
            { "type": "Section", "group": "Income", "Summary": { "ColData": [{ "value": "47800" }] } }
        ]});
        assert_eq!(section(&report, "Income").unwrap().total, 47800.0);
    }
}
