use std::fmt;
use std::sync::Arc;

use cmdtree_shell::value::{infer_arg_type, ArgType, ArgValue, Value};

use crate::argument::{check_one_of, parse_checked};
use crate::completer::{suggest_values, Completer, Suggestion};
use crate::error::{SchemaError, ValueError};

pub const HELP_FLAG: &str = "help";
const HELP_DESCRIPTION: &str = "display contextual help";

/// Declaration of a named parameter, as written by the caller.
#[derive(Clone, Default)]
pub struct FlagSpec {
    /// Long form, invoked as `--name`.
    pub name: Option<String>,
    /// Single character, invoked as `-x`.
    pub short_name: Option<String>,
    pub description: String,
    /// Unspecified means `Bool`.
    pub arg_type: Option<ArgType>,
    pub allow_multiple: bool,
    pub default_value: Option<ArgValue>,
    pub one_of: Option<Vec<Value>>,
    pub completer: Option<Completer>,
    pub is_required: bool,
}

impl FlagSpec {
    pub fn new(name: impl Into<String>) -> Self {
        FlagSpec {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn short_only(short_name: impl Into<String>) -> Self {
        FlagSpec {
            short_name: Some(short_name.into()),
            ..Default::default()
        }
    }

    /// The `--help` flag every command carries.
    pub fn help() -> Self {
        FlagSpec::new(HELP_FLAG)
            .arg_type(ArgType::Bool)
            .description(HELP_DESCRIPTION)
    }

    pub fn short(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
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

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(ArgValue::Single(value.into()));
        self
    }

    pub fn default_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.default_value = Some(ArgValue::multiple(values));
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

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Same long name and description as the injected help flag.
    pub(crate) fn is_help(&self) -> bool {
        self.name.as_deref() == Some(HELP_FLAG) && self.description == HELP_DESCRIPTION
    }

    /// Resolve the declaration into a validated flag. Does not mutate the
    /// spec, so validating the same spec again gives the same result.
    pub fn validate(&self) -> Result<Flag, SchemaError> {
        let name = self.name.clone().filter(|n| !n.is_empty());
        let short_name = self.short_name.clone().filter(|n| !n.is_empty());

        if name.is_none() && short_name.is_none() {
            return Err(SchemaError::MissingFlagName);
        }
        if let Some(name) = &name {
            if name.chars().count() < 2 {
                return Err(SchemaError::FlagNameTooShort(name.clone()));
            }
        }
        if let Some(short) = &short_name {
            if short.chars().count() != 1 {
                return Err(SchemaError::ShortNameLength(short.clone()));
            }
        }

        let arg_type = self.arg_type.unwrap_or(ArgType::Bool);

        let mut default_value = self.default_value.clone();
        if arg_type == ArgType::Bool {
            if self.one_of.is_some() {
                return Err(SchemaError::IncompatibleWithBool("OneOf"));
            }
            if self.completer.is_some() {
                return Err(SchemaError::IncompatibleWithBool("Completer"));
            }
            if self.allow_multiple {
                return Err(SchemaError::IncompatibleWithBool("AllowMultiple"));
            }
            default_value.get_or_insert(ArgValue::Single(Value::Bool(false)));
        }

        check_one_of(self.one_of.as_deref(), arg_type)?;

        let default_value = default_value
            .map(|default| check_default(default, arg_type, self.allow_multiple))
            .transpose()?;

        Ok(Flag {
            name,
            short_name,
            description: self.description.clone(),
            arg_type,
            allow_multiple: self.allow_multiple,
            default_value,
            one_of: self.one_of.clone(),
            completer: self.completer.clone(),
            is_required: self.is_required,
        })
    }
}

impl fmt::Debug for FlagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSpec")
            .field("name", &self.name)
            .field("short_name", &self.short_name)
            .field("arg_type", &self.arg_type)
            .field("allow_multiple", &self.allow_multiple)
            .field("default_value", &self.default_value)
            .field("one_of", &self.one_of)
            .field("is_required", &self.is_required)
            .finish_non_exhaustive()
    }
}

fn check_default(
    default: ArgValue,
    arg_type: ArgType,
    allow_multiple: bool,
) -> Result<ArgValue, SchemaError> {
    match (default, allow_multiple) {
        (ArgValue::Single(value), false) => Ok(ArgValue::Single(coerce_default(value, arg_type)?)),
        (ArgValue::Multiple(values), true) => values
            .into_iter()
            .map(|value| coerce_default(value, arg_type))
            .collect::<Result<Vec<_>, _>>()
            .map(ArgValue::Multiple),
        (ArgValue::Single(_), true) => Err(SchemaError::DefaultNotSequence),
        (ArgValue::Multiple(_), false) => Err(SchemaError::DefaultIsSequence),
    }
}

/// Ints are widened for float flags; any other mismatch is an error.
fn coerce_default(value: Value, arg_type: ArgType) -> Result<Value, SchemaError> {
    match (value, arg_type) {
        (Value::Int(i), ArgType::Float) => Ok(Value::Float(i as f64)),
        (value, arg_type) if infer_arg_type(&value) == arg_type => Ok(value),
        (value, arg_type) => Err(SchemaError::DefaultTypeMismatch {
            value: value.to_string(),
            arg_type,
        }),
    }
}

/// A validated named parameter.
#[derive(Clone)]
pub struct Flag {
    name: Option<String>,
    short_name: Option<String>,
    description: String,
    arg_type: ArgType,
    allow_multiple: bool,
    default_value: Option<ArgValue>,
    one_of: Option<Vec<Value>>,
    completer: Option<Completer>,
    is_required: bool,
}

impl Flag {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
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

    pub fn default_value(&self) -> Option<&ArgValue> {
        self.default_value.as_ref()
    }

    pub fn one_of(&self) -> Option<&[Value]> {
        self.one_of.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    /// The name the flag's value is stored under: the long name, or the
    /// short name when there is none.
    pub fn key(&self) -> &str {
        self.name
            .as_deref()
            .or(self.short_name.as_deref())
            .unwrap_or_default()
    }

    /// Long and short names, in that order.
    pub fn lookup_names(&self) -> impl Iterator<Item = &str> {
        self.name.as_deref().into_iter().chain(self.short_name.as_deref())
    }

    /// How the flag is typed on the command line, e.g. `-t, --type <string>`.
    pub fn invocation(&self) -> String {
        let mut text = match (&self.short_name, &self.name) {
            (Some(short), Some(name)) => format!("-{short}, --{name}"),
            (None, Some(name)) => format!("--{name}"),
            (Some(short), None) => format!("-{short}"),
            (None, None) => String::new(),
        };
        if self.arg_type != ArgType::Bool {
            text.push_str(&format!(" <{}>", self.arg_type));
        }
        text
    }

    /// Invocation with long-only flags indented to line up under `-x, `.
    pub fn padded_invocation(&self) -> String {
        if self.short_name.is_none() {
            format!("    {}", self.invocation())
        } else {
            self.invocation()
        }
    }

    /// Name as the user typed it in an error message.
    pub(crate) fn display_name(&self) -> String {
        match (&self.name, &self.short_name) {
            (Some(name), _) => format!("--{name}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => String::new(),
        }
    }

    pub fn parse_value(&self, raw: &str) -> Result<Value, ValueError> {
        parse_checked(self.arg_type, self.one_of.as_deref(), raw)
    }

    /// Value of a bare boolean flag: the opposite of its default.
    pub(crate) fn toggled(&self) -> Value {
        let default = self
            .default_value
            .as_ref()
            .and_then(ArgValue::as_single)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Value::Bool(!default)
    }

    pub fn suggest_values(&self, prefix: &str) -> Vec<Suggestion> {
        suggest_values(self.one_of.as_deref(), self.completer.as_ref(), prefix)
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("short_name", &self.short_name)
            .field("arg_type", &self.arg_type)
            .field("allow_multiple", &self.allow_multiple)
            .field("default_value", &self.default_value)
            .field("one_of", &self.one_of)
            .field("is_required", &self.is_required)
            .finish_non_exhaustive()
    }
}
