use cmdtree_shell::value::{ArgType, CoerceError};

/// Raised while registering commands. Always fatal to startup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("argument must have a non-empty name")]
    EmptyArgumentName,
    #[error("value in OneOf \"{value}\" did not match the argument type \"{arg_type}\"")]
    OneOfTypeMismatch { value: String, arg_type: ArgType },
    #[error("flag must specify at least one of a name or short name")]
    MissingFlagName,
    #[error("flag name \"{0}\" cannot be shorter than 2 characters")]
    FlagNameTooShort(String),
    #[error("short name \"{0}\" must be exactly 1 character long")]
    ShortNameLength(String),
    #[error("{0} is not compatible with boolean parameters")]
    IncompatibleWithBool(&'static str),
    #[error("default value for an AllowMultiple flag must be a sequence")]
    DefaultNotSequence,
    #[error("default value for a single-valued flag cannot be a sequence")]
    DefaultIsSequence,
    #[error("default value \"{value}\" did not match the flag type \"{arg_type}\"")]
    DefaultTypeMismatch { value: String, arg_type: ArgType },
    #[error("only the last argument may allow multiple values, \"{0}\" is not last")]
    MultipleNotLast(String),
    #[error("command \"{command}\" - {source}")]
    InCommand {
        command: String,
        #[source]
        source: Box<SchemaError>,
    },
    #[error("command \"{0}\" cannot contain both subcommands and positional arguments")]
    SubcommandsWithArguments(String),
    #[error("command \"{0}\" cannot contain both subcommands and an OnExecute handler")]
    SubcommandsWithHandler(String),
    #[error("command \"{0}\" does not implement an OnExecute handler")]
    MissingHandler(String),
    #[error("argument name \"{name}\" on command \"{command}\" is already defined as parent command flag")]
    ArgumentShadowsParentFlag { name: String, command: String },
    #[error("argument name \"{name}\" on command \"{command}\" is already defined as a flag")]
    ArgumentShadowsFlag { name: String, command: String },
    #[error("argument name \"{name}\" on command \"{command}\" is defined multiple times")]
    DuplicateArgument { name: String, command: String },
    #[error("flag name \"{name}\" on command \"{command}\" is already defined as parent command flag")]
    FlagShadowsParentFlag { name: String, command: String },
    #[error("flag name \"{name}\" on command \"{command}\" is defined multiple times")]
    DuplicateFlag { name: String, command: String },
    #[error("sub-command \"{name}\" under \"{parent}\" is defined multiple times")]
    DuplicateSubcommand { name: String, parent: String },
    #[error("command \"{0}\" is defined multiple times")]
    DuplicateCommand(String),
}

impl SchemaError {
    pub(crate) fn in_command(self, command: &str) -> Self {
        SchemaError::InCommand {
            command: command.to_string(),
            source: Box::new(self),
        }
    }
}

/// Why a single token could not become a parameter value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error(transparent)]
    Coerce(#[from] CoerceError),
    #[error("\"{value}\" is not one of {allowed}")]
    NotOneOf { value: String, allowed: String },
}

/// Raised while tokenizing, resolving or classifying one line. The session
/// continues after reporting it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command \"{0}\"")]
    UnknownCommand(String),
    #[error("nothing to {0} from")]
    NothingToFlowFrom(&'static str),
    #[error("redirect must be the final stage of the line")]
    RedirectNotFinal,
    #[error("redirect expects exactly one destination, got {0}")]
    RedirectTarget(usize),
    #[error("missing flag name in \"{0}\"")]
    MissingFlagName(String),
    #[error("malformed flag {token}, did you mean {suggestion}")]
    MalformedFlag { token: String, suggestion: String },
    #[error("unrecognized flag {0}")]
    UnrecognizedFlag(String),
    #[error("missing value for flag {0}")]
    MissingFlagValue(String),
    #[error("invalid value for flag {flag}: {source}")]
    InvalidFlagValue {
        flag: String,
        #[source]
        source: ValueError,
    },
    #[error("invalid value for argument {argument}: {source}")]
    InvalidArgumentValue {
        argument: String,
        #[source]
        source: ValueError,
    },
    #[error("command \"{0}\" does not accept any positional arguments")]
    NoPositionalArguments(String),
    #[error("too many positional arguments provided to \"{0}\"")]
    TooManyPositionalArguments(String),
    #[error("command \"{command}\" - missing required flag {flag}")]
    MissingRequiredFlag { command: String, flag: String },
    #[error("command \"{command}\" - missing argument <{argument}>")]
    MissingArgument { command: String, argument: String },
}
