use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// One billable line inside a job file. `profit` is derived from
/// `selling - cost` when the line is normalized and is never taken from the
/// client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    #[serde(default)]
    pub description: String,
    pub cost: BigDecimal,
    pub selling: BigDecimal,
    pub profit: BigDecimal,
    #[serde(default)]
    pub notes: String,
}

/// Client-submitted charge line. Money fields tolerate numbers, numeric
/// strings, null, or omission; anything unparseable counts as zero, matching
/// how the entry form has always behaved.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChargeInput {
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub cost: BigDecimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub selling: BigDecimal,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub total_cost: BigDecimal,
    pub total_selling: BigDecimal,
    pub total_profit: BigDecimal,
}

impl Totals {
    pub fn zero() -> Self {
        Self {
            total_cost: BigDecimal::zero(),
            total_selling: BigDecimal::zero(),
            total_profit: BigDecimal::zero(),
        }
    }
}

/// Derives per-line profit for every submitted charge. An empty submission is
/// legal and simply yields zero totals.
pub fn normalize(inputs: Vec<ChargeInput>) -> Vec<Charge> {
    inputs
        .into_iter()
        .map(|input| {
            let profit = &input.selling - &input.cost;
            Charge {
                description: input.description,
                cost: input.cost,
                selling: input.selling,
                profit,
                notes: input.notes,
            }
        })
        .collect()
}

pub fn compute_totals(charges: &[Charge]) -> Totals {
    let mut totals = Totals::zero();
    for charge in charges {
        totals.total_cost += &charge.cost;
        totals.total_selling += &charge.selling;
        totals.total_profit += &charge.profit;
    }
    totals
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_decimal(&value))
}

fn parse_decimal(value: &Value) -> BigDecimal {
    match value {
        Value::Number(number) => {
            BigDecimal::from_str(&number.to_string()).unwrap_or_else(|_| BigDecimal::zero())
        }
        Value::String(raw) => BigDecimal::from_str(raw.trim()).unwrap_or_else(|_| BigDecimal::zero()),
        _ => BigDecimal::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(raw: &str) -> BigDecimal {
        BigDecimal::from_str(raw).unwrap()
    }

    fn line(cost: &str, selling: &str) -> ChargeInput {
        ChargeInput {
            cost: dec(cost),
            selling: dec(selling),
            ..ChargeInput::default()
        }
    }

    #[test]
    fn profit_is_selling_minus_cost_per_line() {
        let charges = normalize(vec![line("100", "150"), line("30.5", "20")]);
        assert_eq!(charges[0].profit, dec("50"));
        assert_eq!(charges[1].profit, dec("-10.5"));
    }

    #[test]
    fn totals_balance_exactly() {
        let charges = normalize(vec![
            line("100.125", "150.250"),
            line("0.1", "0.2"),
            line("42", "41"),
        ]);
        let totals = compute_totals(&charges);
        assert_eq!(
            totals.total_profit,
            &totals.total_selling - &totals.total_cost
        );
        assert_eq!(totals.total_cost, dec("142.225"));
        assert_eq!(totals.total_selling, dec("191.450"));
    }

    #[test]
    fn empty_list_yields_zero_totals() {
        let totals = compute_totals(&normalize(Vec::new()));
        assert_eq!(totals, Totals::zero());
    }

    #[test]
    fn lenient_parsing_accepts_strings_and_defaults_garbage_to_zero() {
        let input: ChargeInput = serde_json::from_value(json!({
            "description": "freight",
            "cost": "100.50",
            "selling": 175,
        }))
        .unwrap();
        assert_eq!(input.cost, dec("100.50"));
        assert_eq!(input.selling, dec("175"));

        let garbage: ChargeInput = serde_json::from_value(json!({
            "cost": "abc",
            "selling": null,
        }))
        .unwrap();
        assert_eq!(garbage.cost, BigDecimal::zero());
        assert_eq!(garbage.selling, BigDecimal::zero());
    }

    #[test]
    fn charges_round_trip_through_json() {
        let charges = normalize(vec![ChargeInput {
            description: "customs clearance".to_string(),
            cost: dec("75.000"),
            selling: dec("120.000"),
            notes: "per shipment".to_string(),
        }]);
        let value = serde_json::to_value(&charges).unwrap();
        let back: Vec<Charge> = serde_json::from_value(value).unwrap();
        assert_eq!(back, charges);
    }
}
