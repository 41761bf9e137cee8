//! Condition grammar for FSM transition guards
//!
//! A condition is a one-key object whose key selects the variant:
//!
//! ```yaml
//! when:
//!   or:
//!     - eq: { locals.state: "idle" }
//!     - and:
//!         - gt: { shared.counter: 10 }
//!         - not: { has_tags: [maintenance] }
//! ```
//!
//! Leaf checks compare one state field against a literal. `and`/`or`/`not`
//! nest other conditions.

use super::one_entry;
use crate::schema::Keyword;
use serde::ser::SerializeMap;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

fn state_field_regex() -> &'static regex::Regex {
    static REGEX: OnceLock<regex::Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        regex::Regex::new(r"^(locals|shared|globals)\.(.+)$").expect("state field regex is valid")
    })
}

/// Root scope of a state field reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateScope {
    /// Variables of the current template
    Locals,
    /// Variables shared between templates of one generator
    Shared,
    /// Variables shared across generators
    Globals,
}

impl StateScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locals => "locals",
            Self::Shared => "shared",
            Self::Globals => "globals",
        }
    }
}

/// Invalid state field reference
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid state field '{0}', expected '<locals|shared|globals>.<name>'")]
pub struct StateFieldError(pub String);

/// Dotted reference into a state scope, e.g. `locals.counter`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateField {
    scope: StateScope,
    path: String,
}

impl StateField {
    pub fn scope(&self) -> StateScope {
        self.scope
    }

    /// Everything after the scope, e.g. `counter` for `locals.counter`
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl FromStr for StateField {
    type Err = StateFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = state_field_regex()
            .captures(s)
            .ok_or_else(|| StateFieldError(s.to_string()))?;

        let scope = match &captures[1] {
            "locals" => StateScope::Locals,
            "shared" => StateScope::Shared,
            _ => StateScope::Globals,
        };

        Ok(Self {
            scope,
            path: captures[2].to_string(),
        })
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.scope.as_str(), self.path)
    }
}

impl Serialize for StateField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StateField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

/// A state field paired with the operand it is checked against
///
/// Serializes as the one-entry map `{<field>: <value>}`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCheck<T> {
    pub field: StateField,
    pub value: T,
}

impl<T> FieldCheck<T> {
    pub fn new(field: StateField, value: T) -> Self {
        Self { field, value }
    }
}

impl<T: Serialize> Serialize for FieldCheck<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.value)?;
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldCheck<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (field, value) = one_entry::<D, String, T>(deserializer, "state field")?;
        Ok(Self {
            field: field.parse().map_err(de::Error::custom)?,
            value,
        })
    }
}

/// Operand of `has_tags`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    One(String),
    Many(Vec<String>),
}

impl Tags {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let tags: &[String] = match self {
            Self::One(tag) => std::slice::from_ref(tag),
            Self::Many(tags) => tags,
        };
        tags.iter().map(String::as_str)
    }
}

/// Partial timestamp used by `before` and `after`
///
/// Absent components match any value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampComponents {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub microsecond: Option<u32>,
}

impl TimestampComponents {
    /// Whether every component is a wildcard
    pub fn is_wildcard(&self) -> bool {
        *self == Self::default()
    }
}

/// Discriminant of a [`Condition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
    Matches,
    LenEq,
    LenGt,
    LenGe,
    LenLt,
    LenLe,
    Contains,
    In,
    Defined,
    HasTags,
    Before,
    After,
    And,
    Or,
    Not,
}

impl Keyword for ConditionKind {
    const NAMES: &'static [&'static str] = &[
        "eq", "gt", "ge", "lt", "le", "matches", "len_eq", "len_gt", "len_ge", "len_lt", "len_le",
        "contains", "in", "defined", "has_tags", "before", "after", "and", "or", "not",
    ];

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "eq" => Self::Eq,
            "gt" => Self::Gt,
            "ge" => Self::Ge,
            "lt" => Self::Lt,
            "le" => Self::Le,
            "matches" => Self::Matches,
            "len_eq" => Self::LenEq,
            "len_gt" => Self::LenGt,
            "len_ge" => Self::LenGe,
            "len_lt" => Self::LenLt,
            "len_le" => Self::LenLe,
            "contains" => Self::Contains,
            "in" => Self::In,
            "defined" => Self::Defined,
            "has_tags" => Self::HasTags,
            "before" => Self::Before,
            "after" => Self::After,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            _ => return None,
        })
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Matches => "matches",
            Self::LenEq => "len_eq",
            Self::LenGt => "len_gt",
            Self::LenGe => "len_ge",
            Self::LenLt => "len_lt",
            Self::LenLe => "len_le",
            Self::Contains => "contains",
            Self::In => "in",
            Self::Defined => "defined",
            Self::HasTags => "has_tags",
            Self::Before => "before",
            Self::After => "after",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Guard condition of an FSM transition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(FieldCheck<Value>),
    Gt(FieldCheck<Number>),
    Ge(FieldCheck<Number>),
    Lt(FieldCheck<Number>),
    Le(FieldCheck<Number>),
    /// Regular expression match; the pattern is known to compile
    Matches(FieldCheck<String>),
    LenEq(FieldCheck<u64>),
    LenGt(FieldCheck<u64>),
    LenGe(FieldCheck<u64>),
    LenLt(FieldCheck<u64>),
    LenLe(FieldCheck<u64>),
    Contains(FieldCheck<Value>),
    In(FieldCheck<Vec<Value>>),
    Defined(StateField),
    HasTags(Tags),
    Before(TimestampComponents),
    After(TimestampComponents),
    /// At least two conditions, all of which must hold
    And(Vec<Condition>),
    /// At least two conditions, any of which must hold
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::Eq(_) => ConditionKind::Eq,
            Self::Gt(_) => ConditionKind::Gt,
            Self::Ge(_) => ConditionKind::Ge,
            Self::Lt(_) => ConditionKind::Lt,
            Self::Le(_) => ConditionKind::Le,
            Self::Matches(_) => ConditionKind::Matches,
            Self::LenEq(_) => ConditionKind::LenEq,
            Self::LenGt(_) => ConditionKind::LenGt,
            Self::LenGe(_) => ConditionKind::LenGe,
            Self::LenLt(_) => ConditionKind::LenLt,
            Self::LenLe(_) => ConditionKind::LenLe,
            Self::Contains(_) => ConditionKind::Contains,
            Self::In(_) => ConditionKind::In,
            Self::Defined(_) => ConditionKind::Defined,
            Self::HasTags(_) => ConditionKind::HasTags,
            Self::Before(_) => ConditionKind::Before,
            Self::After(_) => ConditionKind::After,
            Self::And(_) => ConditionKind::And,
            Self::Or(_) => ConditionKind::Or,
            Self::Not(_) => ConditionKind::Not,
        }
    }

    /// Nesting depth; a leaf check has depth 1
    pub fn depth(&self) -> usize {
        match self {
            Self::And(children) | Self::Or(children) => {
                1 + children.iter().map(Condition::depth).max().unwrap_or(0)
            }
            Self::Not(child) => 1 + child.depth(),
            _ => 1,
        }
    }

    /// State fields referenced anywhere in the tree, in document order
    pub fn state_fields(&self) -> Vec<&StateField> {
        let mut fields = Vec::new();
        self.collect_state_fields(&mut fields);
        fields
    }

    fn collect_state_fields<'a>(&'a self, out: &mut Vec<&'a StateField>) {
        match self {
            Self::Eq(check) | Self::Contains(check) => out.push(&check.field),
            Self::Gt(check) | Self::Ge(check) | Self::Lt(check) | Self::Le(check) => {
                out.push(&check.field)
            }
            Self::Matches(check) => out.push(&check.field),
            Self::LenEq(check)
            | Self::LenGt(check)
            | Self::LenGe(check)
            | Self::LenLt(check)
            | Self::LenLe(check) => out.push(&check.field),
            Self::In(check) => out.push(&check.field),
            Self::Defined(field) => out.push(field),
            Self::HasTags(_) | Self::Before(_) | Self::After(_) => {}
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_state_fields(out);
                }
            }
            Self::Not(child) => child.collect_state_fields(out),
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        let key = self.kind().name();
        match self {
            Self::Eq(check) | Self::Contains(check) => map.serialize_entry(key, check)?,
            Self::Gt(check) | Self::Ge(check) | Self::Lt(check) | Self::Le(check) => {
                map.serialize_entry(key, check)?
            }
            Self::Matches(check) => map.serialize_entry(key, check)?,
            Self::LenEq(check)
            | Self::LenGt(check)
            | Self::LenGe(check)
            | Self::LenLt(check)
            | Self::LenLe(check) => map.serialize_entry(key, check)?,
            Self::In(check) => map.serialize_entry(key, check)?,
            Self::Defined(field) => map.serialize_entry(key, field)?,
            Self::HasTags(tags) => map.serialize_entry(key, tags)?,
            Self::Before(ts) | Self::After(ts) => map.serialize_entry(key, ts)?,
            Self::And(children) | Self::Or(children) => map.serialize_entry(key, children)?,
            Self::Not(child) => map.serialize_entry(key, child)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        crate::validate::validate_condition(&value).map_err(serde::de::Error::custom)
    }
}
