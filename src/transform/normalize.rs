//! Record normalizer: one raw row to one normalized record.
//!
//! Walks the bank's field list in declaration order, coercing each raw cell
//! to its declared type, then runs the bank's transform rules once over the
//! completed record. Transforms never run mid-decode, so a rule may
//! reference any declared field regardless of declaration order.

use crate::error::{NormalizeError, NormalizeResult};
use crate::models::Record;
use crate::parser::RawRow;
use crate::spec::BankSpec;
use crate::transform::{coerce, rules};

/// Normalize one raw row against a bank's spec.
///
/// Fails if a declared field is absent from the row, a cell does not match
/// its declared type, or a transform rule cannot apply.
pub fn normalize_row(bank: &str, spec: &BankSpec, row: &RawRow) -> NormalizeResult<Record> {
    let mut record = Record::new(bank);

    for field in &spec.fields {
        let raw = row
            .get(&field.name)
            .ok_or_else(|| NormalizeError::MissingField(field.name.clone()))?;
        let value = coerce::coerce(field, raw)?;
        record.insert(field.name.clone(), value);
    }

    rules::apply(&mut record, &spec.transform)?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;
    use crate::spec::{FieldSpec, FieldType, Op, Operand, OutputColumn, Rule};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>()
    }

    fn chase_spec() -> BankSpec {
        BankSpec {
            fields: vec![
                FieldSpec::new("amount", FieldType::Float),
                FieldSpec::date("date", "%m/%d/%Y"),
            ],
            transform: vec![Rule(Op::Subtract, "amount".into(), Operand::Int(5))],
            to_csv: vec![OutputColumn {
                name: "Amount".into(),
                field: "amount".into(),
            }],
        }
    }

    #[test]
    fn test_normalizes_and_transforms() {
        let rec = normalize_row(
            "chase",
            &chase_spec(),
            &row(&[("amount", "100.0"), ("date", "01/02/2020")]),
        )
        .unwrap();

        assert_eq!(rec.bank_name(), "chase");
        assert_eq!(rec.get("amount"), Some(&Value::Float(95.0)));
        let expected = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(rec.get("date"), Some(&Value::Date(expected)));
    }

    #[test]
    fn test_missing_field_fails_not_defaults() {
        let err = normalize_row("chase", &chase_spec(), &row(&[("amount", "100.0")])).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingField(f) if f == "date"));
    }

    #[test]
    fn test_bad_cell_reports_field_and_value() {
        let err = normalize_row(
            "chase",
            &chase_spec(),
            &row(&[("amount", "lots"), ("date", "01/02/2020")]),
        )
        .unwrap_err();
        match err {
            NormalizeError::Format { field, value, .. } => {
                assert_eq!(field, "amount");
                assert_eq!(value, "lots");
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_rules_see_fields_declared_later() {
        // A rule on the first field may reference the last declared field:
        // transforms run after every field is decoded.
        let spec = BankSpec {
            fields: vec![
                FieldSpec::new("amount", FieldType::Float),
                FieldSpec::new("fee", FieldType::Float),
            ],
            transform: vec![Rule(
                Op::AddFields,
                "amount".into(),
                Operand::Field("fee".into()),
            )],
            to_csv: vec![OutputColumn {
                name: "Amount".into(),
                field: "amount".into(),
            }],
        };
        let rec = normalize_row("boa", &spec, &row(&[("amount", "10.0"), ("fee", "1.5")])).unwrap();
        assert_eq!(rec.get("amount"), Some(&Value::Float(11.5)));
    }

    #[test]
    fn test_rule_failure_surfaces() {
        let spec = BankSpec {
            fields: vec![FieldSpec::new("amount", FieldType::Float)],
            transform: vec![Rule(Op::Divide, "amount".into(), Operand::Int(0))],
            to_csv: vec![OutputColumn {
                name: "Amount".into(),
                field: "amount".into(),
            }],
        };
        let err = normalize_row("chase", &spec, &row(&[("amount", "10.0")])).unwrap_err();
        assert!(matches!(err, NormalizeError::Rule(_)));
    }
}
