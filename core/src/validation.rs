use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON field name as sent by the client
    pub field: String,
    /// Human readable constraint that was not met
    pub constraint: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
        }
    }
}

/// Every violation found while validating one payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.0))]
pub struct ValidationErrors(pub Vec<Violation>);

fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.constraint))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }
}

/// Accumulates violations while the individual fields of a payload are checked.
#[derive(Default)]
pub(crate) struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    pub(crate) fn fail(&mut self, field: &str, constraint: impl Into<String>) {
        self.violations.push(Violation::new(field, constraint));
    }

    /// Required non-negative integer that fits in a u32.
    ///
    /// Integral floats (`3.0`) are accepted, anything with a fractional part is not.
    pub(crate) fn count(&mut self, field: &str, value: Option<&Value>) -> Option<u32> {
        let Some(value) = value else {
            self.fail(field, "field required");
            return None;
        };

        let parsed = match value {
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Ok(u)
                } else if n.is_i64() {
                    // as_u64 already took every non-negative integer
                    Err("must be greater than or equal to 0")
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 && f < 0.0 => {
                            Err("must be greater than or equal to 0")
                        }
                        Some(f) if f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u64),
                        Some(f) if f.fract() == 0.0 => Ok(u64::MAX),
                        _ => Err("must be an integer"),
                    }
                }
            }
            _ => Err("must be an integer"),
        };

        match parsed {
            Ok(u) => match u32::try_from(u) {
                Ok(v) => Some(v),
                Err(_) => {
                    self.fail(field, format!("must be less than or equal to {}", u32::MAX));
                    None
                }
            },
            Err(constraint) => {
                self.fail(field, constraint);
                None
            }
        }
    }

    /// Required finite number.
    pub(crate) fn number(&mut self, field: &str, value: Option<&Value>) -> Option<f64> {
        match value {
            None => {
                self.fail(field, "field required");
                None
            }
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) if f.is_finite() => Some(f),
                _ => {
                    self.fail(field, "must be a finite number");
                    None
                }
            },
            Some(_) => {
                self.fail(field, "must be a number");
                None
            }
        }
    }

    /// Required string parsed into a closed enumeration, never coerced.
    pub(crate) fn choice<T: std::str::FromStr>(
        &mut self,
        field: &str,
        value: Option<&Value>,
        allowed: &str,
    ) -> Option<T> {
        match value {
            None => {
                self.fail(field, "field required");
                None
            }
            Some(Value::String(s)) => match s.parse::<T>() {
                Ok(v) => Some(v),
                Err(_) => {
                    self.fail(field, format!("must be one of: {allowed}"));
                    None
                }
            },
            Some(_) => {
                self.fail(field, format!("must be a string, one of: {allowed}"));
                None
            }
        }
    }

    pub(crate) fn finish(self) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn count_accepts_integral_values_only() {
        let mut c = Checker::default();
        assert_eq!(c.count("a", Some(&json!(3))), Some(3));
        assert_eq!(c.count("b", Some(&json!(4.0))), Some(4));
        assert_eq!(c.count("c", Some(&json!(-1))), None);
        assert_eq!(c.count("d", Some(&json!(1.5))), None);
        assert_eq!(c.count("e", Some(&json!("3"))), None);
        assert_eq!(c.count("f", None), None);
        assert_eq!(c.count("g", Some(&json!(5_000_000_000u64))), None);

        let errors = c.finish().unwrap_err();
        let fields: Vec<_> = errors.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["c", "d", "e", "f", "g"]);
        assert_eq!(errors.violations()[0].constraint, "must be greater than or equal to 0");
        assert_eq!(errors.violations()[3].constraint, "field required");
    }

    #[test]
    fn display_joins_every_violation() {
        let errors = ValidationErrors(vec![
            Violation::new("ball_speed", "must be greater than 0"),
            Violation::new("difficulty", "must be one of: easy, medium, hard"),
        ]);
        assert_eq!(
            errors.to_string(),
            "ball_speed: must be greater than 0; difficulty: must be one of: easy, medium, hard"
        );
    }
}
