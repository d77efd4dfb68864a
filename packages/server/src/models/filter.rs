use std::str::FromStr;

use crate::error::AppError;

/// Base per-field filter: equality, set membership and null checks.
///
/// All slots are independent and optional; an empty filter constrains
/// nothing. `Clone` yields a fully independent deep copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<T> {
    pub equals: Option<T>,
    pub not_equals: Option<T>,
    pub is_in: Option<Vec<T>>,
    pub not_in: Option<Vec<T>>,
    /// `Some(true)` requires the column to be non-null, `Some(false)` null.
    pub specified: Option<bool>,
}

// Manual impl: the empty filter exists for any T, so no `T: Default` bound.
impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self {
            equals: None,
            not_equals: None,
            is_in: None,
            not_in: None,
            specified: None,
        }
    }
}

/// Filter for ordered fields (integers, timestamps): base operators plus
/// total-order comparisons.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter<T> {
    pub common: Filter<T>,
    pub greater_than: Option<T>,
    pub greater_than_or_equal: Option<T>,
    pub less_than: Option<T>,
    pub less_than_or_equal: Option<T>,
}

impl<T> Default for RangeFilter<T> {
    fn default() -> Self {
        Self {
            common: Filter::default(),
            greater_than: None,
            greater_than_or_equal: None,
            less_than: None,
            less_than_or_equal: None,
        }
    }
}

/// Filter for text fields: base operators plus case-sensitive substring
/// matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringFilter {
    pub common: Filter<String>,
    pub contains: Option<String>,
    pub does_not_contain: Option<String>,
}

fn parse_value<T: FromStr>(field: &str, op: &str, raw: &str) -> Result<T, AppError> {
    raw.parse().map_err(|_| {
        AppError::Validation(format!("Invalid value '{raw}' for filter {field}.{op}"))
    })
}

/// `in`/`notIn` accept both repeated parameters and comma-separated values;
/// each call appends to the accumulated set.
fn parse_list<T: FromStr>(
    field: &str,
    op: &str,
    raw: &str,
    target: &mut Option<Vec<T>>,
) -> Result<(), AppError> {
    let values = target.get_or_insert_with(Vec::new);
    for part in raw.split(',') {
        values.push(parse_value(field, op, part)?);
    }
    Ok(())
}

fn unknown_operator(field: &str, op: &str) -> AppError {
    AppError::Validation(format!("Unsupported filter operator '{op}' for field '{field}'"))
}

impl<T: FromStr> Filter<T> {
    /// Dispatch one `<field>.<operator>=<value>` query parameter into the
    /// matching slot.
    pub fn apply(&mut self, field: &str, op: &str, raw: &str) -> Result<(), AppError> {
        match op {
            "equals" => self.equals = Some(parse_value(field, op, raw)?),
            "notEquals" => self.not_equals = Some(parse_value(field, op, raw)?),
            "in" => parse_list(field, op, raw, &mut self.is_in)?,
            "notIn" => parse_list(field, op, raw, &mut self.not_in)?,
            "specified" => self.specified = Some(parse_value(field, op, raw)?),
            _ => return Err(unknown_operator(field, op)),
        }
        Ok(())
    }
}

impl<T: FromStr> RangeFilter<T> {
    pub fn apply(&mut self, field: &str, op: &str, raw: &str) -> Result<(), AppError> {
        match op {
            "greaterThan" => self.greater_than = Some(parse_value(field, op, raw)?),
            "greaterThanOrEqual" => {
                self.greater_than_or_equal = Some(parse_value(field, op, raw)?)
            }
            "lessThan" => self.less_than = Some(parse_value(field, op, raw)?),
            "lessThanOrEqual" => self.less_than_or_equal = Some(parse_value(field, op, raw)?),
            _ => self.common.apply(field, op, raw)?,
        }
        Ok(())
    }
}

impl StringFilter {
    pub fn apply(&mut self, field: &str, op: &str, raw: &str) -> Result<(), AppError> {
        match op {
            "contains" => self.contains = Some(raw.to_string()),
            "doesNotContain" => self.does_not_contain = Some(raw.to_string()),
            _ => self.common.apply(field, op, raw)?,
        }
        Ok(())
    }
}
