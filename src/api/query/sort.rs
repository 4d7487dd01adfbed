//! Search criteria sort orders

/// One sort clause; several can be given and apply in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOrder {
    Asc(String),
    Desc(String),
}

impl SortOrder {
    pub fn asc(field: impl Into<String>) -> Self {
        Self::Asc(field.into())
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::Desc(field.into())
    }

    pub fn field(&self) -> &str {
        match self {
            SortOrder::Asc(field) | SortOrder::Desc(field) => field,
        }
    }

    /// Direction as the wire expects it.
    pub fn direction(&self) -> &'static str {
        match self {
            SortOrder::Asc(_) => "asc",
            SortOrder::Desc(_) => "desc",
        }
    }
}
