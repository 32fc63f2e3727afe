//! Typed filter predicates
//!
//! The minimum predicate algebra the lifecycle engine requires:
//! equality, emptiness, boolean composition, substring match and
//! relative-time comparison. `to_formula` renders the store's query
//! syntax with string values escaped.

/// A literal value in an equality predicate
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Str(String),
    Num(i64),
    Bool(bool),
}

/// A query predicate over one table
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals a literal value
    Eq(String, FilterValue),

    /// Field is blank/absent
    IsEmpty(String),

    /// Field has a (truthy) value
    NotEmpty(String),

    /// Case-insensitive substring match
    Contains { field: String, needle: String },

    /// Field timestamp is earlier than `now - minutes`
    BeforeNowMinus { field: String, minutes: i64 },

    /// Field timestamp is later than now
    AfterNow(String),

    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq_str(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Eq(field.into(), FilterValue::Str(value.into()))
    }

    pub fn eq_num(field: impl Into<String>, value: i64) -> Self {
        Filter::Eq(field.into(), FilterValue::Num(value))
    }

    pub fn eq_bool(field: impl Into<String>, value: bool) -> Self {
        Filter::Eq(field.into(), FilterValue::Bool(value))
    }

    pub fn is_empty(field: impl Into<String>) -> Self {
        Filter::IsEmpty(field.into())
    }

    pub fn not_empty(field: impl Into<String>) -> Self {
        Filter::NotEmpty(field.into())
    }

    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    /// Render the store's formula syntax.
    pub fn to_formula(&self) -> String {
        match self {
            Filter::Eq(field, value) => match value {
                FilterValue::Str(s) => {
                    format!("{{{}}}=\"{}\"", field, escape_str(s))
                }
                FilterValue::Num(n) => format!("{{{}}}={}", field, n),
                FilterValue::Bool(true) => format!("{{{}}}=TRUE()", field),
                FilterValue::Bool(false) => format!("{{{}}}=FALSE()", field),
            },
            // An empty-looking field can read back as "" or BLANK()
            // depending on its type, so match both.
            Filter::IsEmpty(field) => {
                format!("OR({{{0}}}=\"\", {{{0}}}=BLANK())", field)
            }
            Filter::NotEmpty(field) => format!("{{{}}}", field),
            Filter::Contains { field, needle } => format!(
                "FIND(LOWER(\"{}\"), LOWER({{{}}}))",
                escape_str(needle),
                field
            ),
            Filter::BeforeNowMinus { field, minutes } => format!(
                "IS_BEFORE({{{}}}, DATEADD(NOW(), -{}, 'minutes'))",
                field, minutes
            ),
            Filter::AfterNow(field) => format!("IS_AFTER({{{}}}, NOW())", field),
            Filter::And(parts) => compose("AND", parts),
            Filter::Or(parts) => compose("OR", parts),
        }
    }
}

fn compose(op: &str, parts: &[Filter]) -> String {
    match parts {
        [] => "TRUE()".to_string(),
        [single] => single.to_formula(),
        many => {
            let inner: Vec<String> = many.iter().map(|f| f.to_formula()).collect();
            format!("{}({})", op, inner.join(", "))
        }
    }
}

fn escape_str(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
