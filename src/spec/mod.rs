//! Bank spec definition.
//!
//! The spec document is a JSON object mapping each bank name to the layout
//! of that bank's CSV export: which columns to read and how to type them,
//! an ordered list of arithmetic transform rules, and the projection into
//! the unified output.
//!
//! ```json
//! {
//!   "chase": {
//!     "fields": [
//!       { "name": "amount", "type": "float" },
//!       { "name": "date", "type": "date", "format": "%m/%d/%Y" }
//!     ],
//!     "transform": [["subtract", "amount", 5]],
//!     "to_csv": [{ "name": "Amount", "field": "amount" }]
//!   }
//! }
//! ```
//!
//! Field types and rule operations are closed enums: an unrecognized type
//! name or operation in the document fails at load time instead of silently
//! passing values through.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{SpecError, SpecResult};
use crate::models::BANK_FIELD;

// =============================================================================
// Field Specs
// =============================================================================

/// Semantic type of one input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Uninterpreted text.
    #[serde(rename = "string", alias = "str")]
    Str,
    /// Base-10 integer.
    #[serde(alias = "integer")]
    Int,
    /// Decimal floating point.
    Float,
    /// Calendar date parsed with the field's `format` pattern.
    Date,
}

impl FieldType {
    /// Human-readable name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Str => "string",
            FieldType::Int => "integer",
            FieldType::Float => "float",
            FieldType::Date => "date",
        }
    }
}

/// One column of a bank's input file: name, type, and (for dates) the
/// strftime parse pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Column name, matching the CSV header.
    pub name: String,

    /// Declared semantic type.
    #[serde(rename = "type")]
    pub ty: FieldType,

    /// Date parse pattern, required iff `ty` is [`FieldType::Date`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl FieldSpec {
    /// Create a non-date field spec.
    pub fn new(name: &str, ty: FieldType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            format: None,
        }
    }

    /// Create a date field spec with its parse pattern.
    pub fn date(name: &str, format: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: FieldType::Date,
            format: Some(format.to_string()),
        }
    }
}

// =============================================================================
// Transform Rules
// =============================================================================

/// Arithmetic operation of a transform rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// `field <- field + literal`
    Add,
    /// `field <- field + record[other]`
    AddFields,
    /// `field <- field / literal` (true division, zero divisor fails)
    Divide,
    /// `field <- field * literal`
    Multiply,
    /// `field <- field - literal`
    Subtract,
}

impl Op {
    /// Verb for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Op::Add | Op::AddFields => "add",
            Op::Divide => "divide",
            Op::Multiply => "multiply",
            Op::Subtract => "subtract",
        }
    }
}

/// Third element of a rule: a numeric literal for the scalar operations,
/// a field name for `add_fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Name of another record field.
    Field(String),
}

/// One transform rule, `[operation, target field, operand]` in the document.
///
/// A tuple struct so the wire format stays a plain 3-element JSON array:
/// `["subtract", "amount", 5]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule(pub Op, pub String, pub Operand);

impl Rule {
    /// The operation to apply.
    pub fn op(&self) -> Op {
        self.0
    }

    /// The field the rule rewrites.
    pub fn field(&self) -> &str {
        &self.1
    }

    /// The literal or field-name operand.
    pub fn operand(&self) -> &Operand {
        &self.2
    }
}

// =============================================================================
// Output Projection
// =============================================================================

/// One column of the unified output: header label and source field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputColumn {
    /// Header label in the unified CSV.
    pub name: String,
    /// Record field projected into this column.
    pub field: String,
}

// =============================================================================
// Bank Specs
// =============================================================================

/// Declarative description of one bank's export: input columns, transform
/// rules, and output projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankSpec {
    /// Input columns in declaration order.
    pub fields: Vec<FieldSpec>,

    /// Transform rules, applied strictly in list order.
    #[serde(default)]
    pub transform: Vec<Rule>,

    /// Projection into the unified output, in column order.
    pub to_csv: Vec<OutputColumn>,
}

impl BankSpec {
    /// Whether `name` is a field this bank's records will contain:
    /// a declared input column or the reserved bank stamp.
    fn declares(&self, name: &str) -> bool {
        name == BANK_FIELD || self.fields.iter().any(|f| f.name == name)
    }
}

/// The whole spec document: bank name to [`BankSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecFile {
    /// Per-bank specs, keyed by the bank name derived from filenames.
    pub banks: HashMap<String, BankSpec>,
}

impl SpecFile {
    /// Parse a spec document from a JSON string.
    ///
    /// Unrecognized field types and rule operations fail here: both are
    /// closed enums, so a typo'd `"tpye"` value or operation name never
    /// reaches the transform stage.
    pub fn from_json(json: &str) -> SpecResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load and parse a spec document from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SpecResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> SpecResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up one bank's spec.
    pub fn get(&self, bank: &str) -> Option<&BankSpec> {
        self.banks.get(bank)
    }

    /// Cross-reference checks on the loaded document.
    ///
    /// Verifies, per bank: no field uses the reserved name; every date field
    /// carries a format pattern; every rule target, `add_fields` operand, and
    /// output column names a field the records will contain; scalar rules
    /// carry numeric operands and `add_fields` a field name. Across banks:
    /// all `to_csv` projections are identical, so the unified output layout
    /// does not depend on iteration order.
    pub fn validate(&self) -> SpecResult<()> {
        if self.banks.is_empty() {
            return Err(SpecError::EmptyDocument);
        }

        for (bank, spec) in &self.banks {
            for field in &spec.fields {
                if field.name == BANK_FIELD {
                    return Err(SpecError::ReservedField {
                        bank: bank.clone(),
                        field: field.name.clone(),
                    });
                }
                if field.ty == FieldType::Date && field.format.is_none() {
                    return Err(SpecError::MissingDateFormat {
                        bank: bank.clone(),
                        field: field.name.clone(),
                    });
                }
            }

            for rule in &spec.transform {
                if !spec.declares(rule.field()) {
                    return Err(SpecError::UnknownFieldRef {
                        bank: bank.clone(),
                        context: format!("transform rule '{}'", rule.op().name()),
                        field: rule.field().to_string(),
                    });
                }
                match (rule.op(), rule.operand()) {
                    (Op::AddFields, Operand::Field(other)) => {
                        if !spec.declares(other) {
                            return Err(SpecError::UnknownFieldRef {
                                bank: bank.clone(),
                                context: "add_fields operand".to_string(),
                                field: other.clone(),
                            });
                        }
                    }
                    (Op::AddFields, _) => {
                        return Err(SpecError::BadOperand {
                            bank: bank.clone(),
                            field: rule.field().to_string(),
                            expected: "a field-name",
                        });
                    }
                    (_, Operand::Field(_)) => {
                        return Err(SpecError::BadOperand {
                            bank: bank.clone(),
                            field: rule.field().to_string(),
                            expected: "a numeric",
                        });
                    }
                    (_, Operand::Int(_) | Operand::Float(_)) => {}
                }
            }

            for col in &spec.to_csv {
                if !spec.declares(&col.field) {
                    return Err(SpecError::UnknownFieldRef {
                        bank: bank.clone(),
                        context: format!("output column '{}'", col.name),
                        field: col.field.clone(),
                    });
                }
            }
        }

        // All banks must agree on the unified layout. Compare against the
        // lexicographically first bank so the error is deterministic.
        let mut names: Vec<&String> = self.banks.keys().collect();
        names.sort();
        let first = names[0];
        let reference = &self.banks[first].to_csv;
        for name in &names[1..] {
            if &self.banks[*name].to_csv != reference {
                return Err(SpecError::ProjectionMismatch {
                    bank: (*name).clone(),
                    first: first.clone(),
                });
            }
        }

        Ok(())
    }

    /// The shared output projection.
    ///
    /// Only meaningful after [`validate`](Self::validate) has confirmed all
    /// banks agree; any entry's `to_csv` is then the unified layout.
    pub fn output_columns(&self) -> SpecResult<&[OutputColumn]> {
        self.banks
            .values()
            .next()
            .map(|spec| spec.to_csv.as_slice())
            .ok_or(SpecError::EmptyDocument)
    }
}

/// Worked example spec for two banks with different layouts.
pub fn example_spec() -> SpecFile {
    let mut banks = HashMap::new();

    banks.insert(
        "chase".to_string(),
        BankSpec {
            fields: vec![
                FieldSpec::new("amount", FieldType::Float),
                FieldSpec::date("date", "%m/%d/%Y"),
                FieldSpec::new("memo", FieldType::Str),
            ],
            transform: vec![Rule(Op::Subtract, "amount".to_string(), Operand::Int(5))],
            to_csv: vec![
                OutputColumn {
                    name: "Bank".to_string(),
                    field: BANK_FIELD.to_string(),
                },
                OutputColumn {
                    name: "Date".to_string(),
                    field: "date".to_string(),
                },
                OutputColumn {
                    name: "Amount".to_string(),
                    field: "amount".to_string(),
                },
            ],
        },
    );

    banks.insert(
        "wellsfargo".to_string(),
        BankSpec {
            fields: vec![
                FieldSpec::new("debit", FieldType::Float),
                FieldSpec::new("credit", FieldType::Float),
                FieldSpec::new("amount", FieldType::Float),
                FieldSpec::date("date", "%Y-%m-%d"),
            ],
            transform: vec![
                Rule(
                    Op::AddFields,
                    "amount".to_string(),
                    Operand::Field("credit".to_string()),
                ),
                Rule(
                    Op::AddFields,
                    "amount".to_string(),
                    Operand::Field("debit".to_string()),
                ),
            ],
            to_csv: vec![
                OutputColumn {
                    name: "Bank".to_string(),
                    field: BANK_FIELD.to_string(),
                },
                OutputColumn {
                    name: "Date".to_string(),
                    field: "date".to_string(),
                },
                OutputColumn {
                    name: "Amount".to_string(),
                    field: "amount".to_string(),
                },
            ],
        },
    );

    SpecFile { banks }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_parses_from_tuple() {
        let rule: Rule = serde_json::from_str(r#"["subtract", "amount", 5]"#).unwrap();
        assert_eq!(rule.op(), Op::Subtract);
        assert_eq!(rule.field(), "amount");
        assert_eq!(rule.operand(), &Operand::Int(5));
    }

    #[test]
    fn test_operand_shapes() {
        let int: Operand = serde_json::from_str("5").unwrap();
        let float: Operand = serde_json::from_str("2.5").unwrap();
        let field: Operand = serde_json::from_str(r#""credit""#).unwrap();
        assert_eq!(int, Operand::Int(5));
        assert_eq!(float, Operand::Float(2.5));
        assert_eq!(field, Operand::Field("credit".to_string()));
    }

    #[test]
    fn test_unknown_operation_rejected_at_load() {
        let result: Result<Rule, _> = serde_json::from_str(r#"["modulo", "amount", 5]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_type_rejected_at_load() {
        let json = r#"{
            "chase": {
                "fields": [{ "name": "amount", "type": "decimal" }],
                "to_csv": [{ "name": "Amount", "field": "amount" }]
            }
        }"#;
        assert!(SpecFile::from_json(json).is_err());
    }

    #[test]
    fn test_integer_alias_accepted() {
        let a: FieldType = serde_json::from_str(r#""int""#).unwrap();
        let b: FieldType = serde_json::from_str(r#""integer""#).unwrap();
        assert_eq!(a, FieldType::Int);
        assert_eq!(b, FieldType::Int);
    }

    #[test]
    fn test_spec_round_trip() {
        let spec = example_spec();
        let json = spec.to_json().unwrap();
        let parsed = SpecFile::from_json(&json).unwrap();
        assert_eq!(parsed, spec);
    }

    #[test]
    fn test_example_spec_validates() {
        assert!(example_spec().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_date_format() {
        let json = r#"{
            "chase": {
                "fields": [{ "name": "date", "type": "date" }],
                "to_csv": [{ "name": "Date", "field": "date" }]
            }
        }"#;
        let spec = SpecFile::from_json(json).unwrap();
        assert!(matches!(
            spec.validate(),
            Err(SpecError::MissingDateFormat { .. })
        ));
    }

    #[test]
    fn test_validate_dangling_rule_target() {
        let json = r#"{
            "chase": {
                "fields": [{ "name": "amount", "type": "float" }],
                "transform": [["add", "balance", 1]],
                "to_csv": [{ "name": "Amount", "field": "amount" }]
            }
        }"#;
        let spec = SpecFile::from_json(json).unwrap();
        assert!(matches!(
            spec.validate(),
            Err(SpecError::UnknownFieldRef { .. })
        ));
    }

    #[test]
    fn test_validate_scalar_rule_with_field_operand() {
        let json = r#"{
            "chase": {
                "fields": [{ "name": "amount", "type": "float" }],
                "transform": [["multiply", "amount", "amount"]],
                "to_csv": [{ "name": "Amount", "field": "amount" }]
            }
        }"#;
        let spec = SpecFile::from_json(json).unwrap();
        assert!(matches!(spec.validate(), Err(SpecError::BadOperand { .. })));
    }

    #[test]
    fn test_validate_projection_mismatch() {
        let json = r#"{
            "chase": {
                "fields": [{ "name": "amount", "type": "float" }],
                "to_csv": [{ "name": "Amount", "field": "amount" }]
            },
            "boa": {
                "fields": [{ "name": "amount", "type": "float" }],
                "to_csv": [{ "name": "Total", "field": "amount" }]
            }
        }"#;
        let spec = SpecFile::from_json(json).unwrap();
        assert!(matches!(
            spec.validate(),
            Err(SpecError::ProjectionMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_reserved_field_name() {
        let json = r#"{
            "chase": {
                "fields": [{ "name": "bank_name", "type": "string" }],
                "to_csv": [{ "name": "Bank", "field": "bank_name" }]
            }
        }"#;
        let spec = SpecFile::from_json(json).unwrap();
        assert!(matches!(
            spec.validate(),
            Err(SpecError::ReservedField { .. })
        ));
    }

    #[test]
    fn test_bank_name_projectable_without_declaration() {
        // The reserved stamp is always present on records, so to_csv may
        // reference it even though no bank declares it as an input column.
        assert!(example_spec().validate().is_ok());
    }

    #[test]
    fn test_empty_document_rejected() {
        let spec = SpecFile::from_json("{}").unwrap();
        assert!(matches!(spec.validate(), Err(SpecError::EmptyDocument)));
    }
}
