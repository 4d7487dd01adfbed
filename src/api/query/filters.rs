//! Search criteria filters
//!
//! Filters inside a group are OR alternatives; groups are AND clauses.
//! `[[a=1, b=2], [c=3]]` means `(a=1 OR b=2) AND c=3`. There is no way to
//! express an OR between AND clauses in the wire format.

/// A single field condition.
///
/// `condition_type` is the Magento condition name (`"gt"`, `"in"`,
/// `"like"`, ...). `None` means the server default `"eq"` and keeps the
/// condition key off the wire entirely, which the protocol requires.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: FilterValue,
    pub condition_type: Option<String>,
}

impl Filter {
    /// Equality filter.
    pub fn new(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self { field: field.into(), value: value.into(), condition_type: None }
    }

    pub fn with_condition(
        field: impl Into<String>,
        value: impl Into<FilterValue>,
        condition_type: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            condition_type: Some(condition_type.into()),
        }
    }
}

/// A filter value as it goes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
}

impl FilterValue {
    /// Render the value as a query parameter.
    pub fn to_param_string(&self) -> String {
        match self {
            FilterValue::String(s) => s.clone(),
            FilterValue::Integer(i) => i.to_string(),
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Boolean(b) => b.to_string(),
        }
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Integer(value as i64)
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        FilterValue::Integer(value as i64)
    }
}

impl From<u64> for FilterValue {
    fn from(value: u64) -> Self {
        FilterValue::Integer(value as i64)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Boolean(value)
    }
}

/// An ordered group of OR-combined filters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterGroup {
    pub filters: Vec<Filter>,
}

impl FilterGroup {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }

    /// Group holding a single filter.
    pub fn of(filter: Filter) -> Self {
        Self { filters: vec![filter] }
    }

    /// Append an OR alternative.
    pub fn or(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
}

impl From<Filter> for FilterGroup {
    fn from(filter: Filter) -> Self {
        FilterGroup::of(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_constructors() {
        let filter = Filter::new("status", "processing");
        assert_eq!(filter.condition_type, None);

        let filter = Filter::with_condition("entity_id", 42, "gt");
        assert_eq!(filter.condition_type.as_deref(), Some("gt"));
        assert_eq!(filter.value, FilterValue::Integer(42));
    }

    #[test]
    fn test_filter_value_rendering() {
        assert_eq!(FilterValue::from("abc").to_param_string(), "abc");
        assert_eq!(FilterValue::from(12i64).to_param_string(), "12");
        assert_eq!(FilterValue::from(2.5).to_param_string(), "2.5");
        assert_eq!(FilterValue::from(true).to_param_string(), "true");
    }

    #[test]
    fn test_filter_group_or() {
        let group = FilterGroup::of(Filter::new("a", 1)).or(Filter::new("b", 2));
        assert_eq!(group.filters.len(), 2);
    }
}
