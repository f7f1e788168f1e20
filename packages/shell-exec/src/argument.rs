use std::fmt;
use std::sync::Arc;

use cmdtree_shell::value::{infer_arg_type, matches_one_of, value_from_str, ArgType, Value};

use crate::completer::{suggest_values, Completer, Suggestion};
use crate::error::{SchemaError, ValueError};

/// Declaration of a positional parameter, as written by the caller.
#[derive(Clone, Default)]
pub struct ArgumentSpec {
    pub name: String,
    pub description: String,
    /// Defaults to the OneOf members' type, else `String`.
    pub arg_type: Option<ArgType>,
    /// Only the last argument of a command may absorb overflow tokens.
    pub allow_multiple: bool,
    pub one_of: Option<Vec<Value>>,
    pub completer: Option<Completer>,
}

impl ArgumentSpec {
    pub fn new(name: impl Into<String>) -> Self {
        ArgumentSpec {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn arg_type(mut self, arg_type: ArgType) -> Self {
        self.arg_type = Some(arg_type);
        self
    }

    pub fn allow_multiple(mut self) -> Self {
        self.allow_multiple = true;
        self
    }

    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.one_of = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn completer<F>(mut self, completer: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        self.completer = Some(Arc::new(completer));
        self
    }

    /// Resolve the declaration into a validated argument. Does not mutate
    /// the spec, so validating the same spec again gives the same result.
    pub fn validate(&self) -> Result<Argument, SchemaError> {
        if self.name.is_empty() {
            return Err(SchemaError::EmptyArgumentName);
        }

        let arg_type = self
            .arg_type
            .or_else(|| {
                self.one_of
                    .as_ref()
                    .and_then(|values| values.first())
                    .map(infer_arg_type)
            })
            .unwrap_or(ArgType::String);

        if self.allow_multiple && arg_type == ArgType::Bool {
            return Err(SchemaError::IncompatibleWithBool("AllowMultiple"));
        }

        check_one_of(self.one_of.as_deref(), arg_type)?;

        Ok(Argument {
            name: self.name.clone(),
            description: self.description.clone(),
            arg_type,
            allow_multiple: self.allow_multiple,
            one_of: self.one_of.clone(),
            completer: self.completer.clone(),
        })
    }
}

impl fmt::Debug for ArgumentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSpec")
            .field("name", &self.name)
            .field("arg_type", &self.arg_type)
            .field("allow_multiple", &self.allow_multiple)
            .field("one_of", &self.one_of)
            .finish_non_exhaustive()
    }
}

/// A validated positional parameter.
#[derive(Clone)]
pub struct Argument {
    name: String,
    description: String,
    arg_type: ArgType,
    allow_multiple: bool,
    one_of: Option<Vec<Value>>,
    completer: Option<Completer>,
}

impl Argument {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn arg_type(&self) -> ArgType {
        self.arg_type
    }

    pub fn allow_multiple(&self) -> bool {
        self.allow_multiple
    }

    pub fn one_of(&self) -> Option<&[Value]> {
        self.one_of.as_deref()
    }

    /// `<name>` or `<name...>`.
    pub fn invocation(&self) -> String {
        if self.allow_multiple {
            format!("<{}...>", self.name)
        } else {
            format!("<{}>", self.name)
        }
    }

    pub fn parse_value(&self, raw: &str) -> Result<Value, ValueError> {
        parse_checked(self.arg_type, self.one_of.as_deref(), raw)
    }

    pub fn suggest_values(&self, prefix: &str) -> Vec<Suggestion> {
        suggest_values(self.one_of.as_deref(), self.completer.as_ref(), prefix)
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("arg_type", &self.arg_type)
            .field("allow_multiple", &self.allow_multiple)
            .field("one_of", &self.one_of)
            .finish_non_exhaustive()
    }
}

pub(crate) fn check_one_of(one_of: Option<&[Value]>, arg_type: ArgType) -> Result<(), SchemaError> {
    for value in one_of.unwrap_or_default() {
        if infer_arg_type(value) != arg_type {
            return Err(SchemaError::OneOfTypeMismatch {
                value: value.to_string(),
                arg_type,
            });
        }
    }
    Ok(())
}

/// Coerce `raw` and check it against the permitted values, if any.
pub(crate) fn parse_checked(
    arg_type: ArgType,
    one_of: Option<&[Value]>,
    raw: &str,
) -> Result<Value, ValueError> {
    let value = value_from_str(arg_type, raw)?;
    if let Some(one_of) = one_of {
        if !matches_one_of(one_of, &value) {
            let allowed: Vec<String> = one_of.iter().map(ToString::to_string).collect();
            return Err(ValueError::NotOneOf {
                value: value.to_string(),
                allowed: allowed.join(", "),
            });
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdtree_shell::value::CoerceError;

    #[test]
    fn empty_name_is_rejected() {
        let err = ArgumentSpec::new("").validate().unwrap_err();
        assert_eq!(err, SchemaError::EmptyArgumentName);
    }

    #[test]
    fn type_defaults_to_string() {
        let arg = ArgumentSpec::new("path").validate().unwrap();
        assert_eq!(arg.arg_type(), ArgType::String);
    }

    #[test]
    fn type_is_unified_with_one_of() {
        let arg = ArgumentSpec::new("level").one_of([1, 2, 3]).validate().unwrap();
        assert_eq!(arg.arg_type(), ArgType::Int);
    }

    #[test]
    fn one_of_must_match_declared_type() {
        let err = ArgumentSpec::new("level")
            .arg_type(ArgType::Int)
            .one_of(["low", "high"])
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::OneOfTypeMismatch {
                value: "low".into(),
                arg_type: ArgType::Int,
            }
        );
    }

    #[test]
    fn mixed_one_of_is_rejected() {
        let err = ArgumentSpec::new("x")
            .one_of([Value::from("a"), Value::from(1)])
            .validate()
            .unwrap_err();
        assert!(matches!(err, SchemaError::OneOfTypeMismatch { .. }));
    }

    #[test]
    fn multiple_bool_is_rejected() {
        let err = ArgumentSpec::new("switches")
            .arg_type(ArgType::Bool)
            .allow_multiple()
            .validate()
            .unwrap_err();
        assert_eq!(err, SchemaError::IncompatibleWithBool("AllowMultiple"));
    }

    #[test]
    fn validate_is_repeatable() {
        let spec = ArgumentSpec::new("kind").one_of(["process", "group"]);
        let first = spec.validate().unwrap();
        let second = spec.validate().unwrap();
        assert_eq!(first.arg_type(), second.arg_type());
        assert_eq!(first.one_of(), second.one_of());
    }

    #[test]
    fn parse_value_checks_one_of() {
        let arg = ArgumentSpec::new("kind")
            .one_of(["process", "group"])
            .validate()
            .unwrap();
        assert_eq!(arg.parse_value("group"), Ok(Value::from("group")));
        assert!(matches!(
            arg.parse_value("thread"),
            Err(ValueError::NotOneOf { .. })
        ));
    }

    #[test]
    fn parse_value_coerces() {
        let arg = ArgumentSpec::new("count")
            .arg_type(ArgType::Int)
            .validate()
            .unwrap();
        assert_eq!(arg.parse_value("12"), Ok(Value::Int(12)));
        assert_eq!(
            arg.parse_value("twelve"),
            Err(ValueError::Coerce(CoerceError::Int))
        );
    }

    #[test]
    fn invocation_marks_multiple() {
        let one = ArgumentSpec::new("file").validate().unwrap();
        let many = ArgumentSpec::new("files").allow_multiple().validate().unwrap();
        assert_eq!(one.invocation(), "<file>");
        assert_eq!(many.invocation(), "<files...>");
    }
}
