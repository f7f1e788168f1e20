use std::fmt;

use serde::Serialize;

/// The scalar type of a flag or positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArgType {
    Int,
    Float,
    String,
    Bool,
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgType::Int => "int",
            ArgType::Float => "float",
            ArgType::String => "string",
            ArgType::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A single typed value bound to a parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, with ints widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// What a parameter resolves to: one value, or an ordered sequence when the
/// parameter allows multiple values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    Single(Value),
    Multiple(Vec<Value>),
}

impl ArgValue {
    pub fn single(value: impl Into<Value>) -> Self {
        ArgValue::Single(value.into())
    }

    pub fn multiple<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        ArgValue::Multiple(values.into_iter().map(Into::into).collect())
    }

    pub fn as_single(&self) -> Option<&Value> {
        match self {
            ArgValue::Single(v) => Some(v),
            ArgValue::Multiple(_) => None,
        }
    }

    pub fn as_multiple(&self) -> Option<&[Value]> {
        match self {
            ArgValue::Single(_) => None,
            ArgValue::Multiple(values) => Some(values),
        }
    }
}

impl From<Value> for ArgValue {
    fn from(v: Value) -> Self {
        ArgValue::Single(v)
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Single(v) => write!(f, "{v}"),
            ArgValue::Multiple(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoerceError {
    #[error("value could not be parsed to an integer")]
    Int,
    #[error("value could not be parsed to a float")]
    Float,
    #[error("value could not be parsed into a bool")]
    Bool,
}

/// Infer the type of a value. Total over the closed set of value kinds.
pub fn infer_arg_type(value: &Value) -> ArgType {
    match value {
        Value::Int(_) => ArgType::Int,
        Value::Float(_) => ArgType::Float,
        Value::String(_) => ArgType::String,
        Value::Bool(_) => ArgType::Bool,
    }
}

/// Parse `raw` as a value of `arg_type`.
pub fn value_from_str(arg_type: ArgType, raw: &str) -> Result<Value, CoerceError> {
    match arg_type {
        ArgType::Int => raw
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| CoerceError::Int),
        ArgType::Float => raw
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| CoerceError::Float),
        ArgType::Bool => match raw {
            "true" | "t" | "1" => Ok(Value::Bool(true)),
            "false" | "f" | "0" => Ok(Value::Bool(false)),
            _ => Err(CoerceError::Bool),
        },
        ArgType::String => Ok(Value::String(raw.to_string())),
    }
}

/// Whether `sample` is a member of `one_of`, compared by string form.
pub fn matches_one_of(one_of: &[Value], sample: &Value) -> bool {
    let wanted = sample.to_string();
    one_of.iter().any(|candidate| candidate.to_string() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_int() {
        assert_eq!(value_from_str(ArgType::Int, "42"), Ok(Value::Int(42)));
        assert_eq!(value_from_str(ArgType::Int, "-7"), Ok(Value::Int(-7)));
        assert_eq!(value_from_str(ArgType::Int, "4x"), Err(CoerceError::Int));
        assert_eq!(value_from_str(ArgType::Int, "1.5"), Err(CoerceError::Int));
    }

    #[test]
    fn int_string_form_reparses() {
        for n in [0i64, 1, -1, 42, i64::MAX, i64::MIN] {
            let v = value_from_str(ArgType::Int, &n.to_string()).unwrap();
            assert_eq!(value_from_str(ArgType::Int, &v.to_string()).unwrap(), v);
        }
    }

    #[test]
    fn parse_float() {
        assert_eq!(value_from_str(ArgType::Float, "1.5"), Ok(Value::Float(1.5)));
        assert_eq!(value_from_str(ArgType::Float, "3"), Ok(Value::Float(3.0)));
        assert_eq!(value_from_str(ArgType::Float, "abc"), Err(CoerceError::Float));
    }

    #[test]
    fn parse_bool_forms() {
        for raw in ["true", "t", "1"] {
            assert_eq!(value_from_str(ArgType::Bool, raw), Ok(Value::Bool(true)));
        }
        for raw in ["false", "f", "0"] {
            assert_eq!(value_from_str(ArgType::Bool, raw), Ok(Value::Bool(false)));
        }
        assert_eq!(value_from_str(ArgType::Bool, "TRUE"), Err(CoerceError::Bool));
        assert_eq!(value_from_str(ArgType::Bool, "yes"), Err(CoerceError::Bool));
    }

    #[test]
    fn parse_string_is_verbatim() {
        assert_eq!(
            value_from_str(ArgType::String, " a b "),
            Ok(Value::String(" a b ".into()))
        );
    }

    #[test]
    fn infer_types() {
        assert_eq!(infer_arg_type(&Value::from(3)), ArgType::Int);
        assert_eq!(infer_arg_type(&Value::from(3.0)), ArgType::Float);
        assert_eq!(infer_arg_type(&Value::from("x")), ArgType::String);
        assert_eq!(infer_arg_type(&Value::from(true)), ArgType::Bool);
    }

    #[test]
    fn one_of_compares_string_forms() {
        let one_of = vec![Value::from("json"), Value::from("yaml")];
        assert!(matches_one_of(&one_of, &Value::from("yaml")));
        assert!(!matches_one_of(&one_of, &Value::from("toml")));

        let ints = vec![Value::from(1), Value::from(2)];
        assert!(matches_one_of(&ints, &Value::Int(2)));
        assert!(!matches_one_of(&ints, &Value::Int(3)));
    }

    #[test]
    fn arg_value_display() {
        assert_eq!(ArgValue::single("a").to_string(), "a");
        assert_eq!(ArgValue::multiple([1, 2]).to_string(), "[1, 2]");
    }
}
