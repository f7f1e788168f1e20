use std::collections::HashMap;

use cmdtree_shell::value::{ArgType, ArgValue, Value};
use tracing::debug;

use crate::argmap::ArgMap;
use crate::command::Command;
use crate::error::ParseError;
use crate::flag::Flag;

/// Merge inherited and own flags into one lookup by long and short name.
/// Own flags win on collision.
pub(crate) fn flag_lookup<'a>(
    command: &'a Command,
    inherited: &[&'a Flag],
) -> HashMap<&'a str, &'a Flag> {
    let mut lookup = HashMap::new();
    for flag in inherited.iter().copied().chain(command.flags()) {
        for name in flag.lookup_names() {
            lookup.insert(name, flag);
        }
    }
    lookup
}

fn bind_flag(flag: &Flag, value: Value, map: &mut ArgMap) {
    if flag.allow_multiple() {
        map.push(flag.key(), value);
    } else {
        map.insert(flag.key(), ArgValue::Single(value));
    }
}

fn bind_flag_raw(flag: &Flag, raw: &str, map: &mut ArgMap) -> Result<(), ParseError> {
    let value = flag
        .parse_value(raw)
        .map_err(|source| ParseError::InvalidFlagValue {
            flag: flag.display_name(),
            source,
        })?;
    bind_flag(flag, value, map);
    Ok(())
}

/// Split a flag token into its name and optional `=value`. Returns `None`
/// for tokens that are not flags.
fn split_flag(token: &str) -> Option<(&str, Option<&str>, bool)> {
    let (body, long) = match token.strip_prefix("--") {
        Some(body) => (body, true),
        None => (token.strip_prefix('-')?, false),
    };
    let (name, value) = match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    };
    Some((name, value, long))
}

/// Turn the tokens left after resolution into a name to value map.
///
/// One left-to-right pass. The only state is the flag waiting for its
/// value. After the pass, unset flags take their defaults and required
/// flags without one fail.
pub fn classify_tokens(
    command: &Command,
    tokens: &[String],
    inherited: &[&Flag],
) -> Result<ArgMap, ParseError> {
    let lookup = flag_lookup(command, inherited);
    let arguments = command.arguments();

    let mut map = ArgMap::new();
    let mut arg_num = 0;
    let mut no_flags = false;
    let mut pending: Option<&Flag> = None;

    for token in tokens {
        if let Some(flag) = pending.take() {
            bind_flag_raw(flag, token, &mut map)?;
            continue;
        }

        if !no_flags {
            if token == "--" {
                no_flags = true;
                continue;
            }

            if let Some((name, value, long)) = split_flag(token) {
                if name.is_empty() {
                    return Err(ParseError::MissingFlagName(token.clone()));
                }
                let name_len = name.chars().count();
                if long && name_len == 1 {
                    return Err(ParseError::MalformedFlag {
                        token: token.clone(),
                        suggestion: format!("-{name}"),
                    });
                }
                if !long && name_len > 1 {
                    return Err(ParseError::MalformedFlag {
                        token: token.clone(),
                        suggestion: format!("-{token}"),
                    });
                }

                let Some(&flag) = lookup.get(name) else {
                    return Err(ParseError::UnrecognizedFlag(token.clone()));
                };

                match value {
                    Some(raw) => bind_flag_raw(flag, raw, &mut map)?,
                    None if flag.arg_type() == ArgType::Bool => {
                        bind_flag(flag, flag.toggled(), &mut map);
                    }
                    None => pending = Some(flag),
                }
                continue;
            }
        }

        let Some(last) = arguments.last() else {
            return Err(ParseError::NoPositionalArguments(command.name().to_string()));
        };
        let current = match arguments.get(arg_num) {
            Some(arg) => arg,
            None if last.allow_multiple() => last,
            None => {
                return Err(ParseError::TooManyPositionalArguments(
                    command.name().to_string(),
                ))
            }
        };

        let value = current
            .parse_value(token)
            .map_err(|source| ParseError::InvalidArgumentValue {
                argument: current.name().to_string(),
                source,
            })?;
        if current.allow_multiple() {
            map.push(current.name(), value);
        } else {
            map.insert(current.name(), ArgValue::Single(value));
        }
        arg_num += 1;
    }

    if let Some(flag) = pending {
        return Err(ParseError::MissingFlagValue(flag.display_name()));
    }

    for argument in arguments {
        if map.contains(argument.name()) {
            continue;
        }
        if argument.allow_multiple() {
            map.insert(argument.name(), ArgValue::Multiple(Vec::new()));
        } else {
            return Err(ParseError::MissingArgument {
                command: command.name().to_string(),
                argument: argument.name().to_string(),
            });
        }
    }

    for flag in inherited.iter().copied().chain(command.flags()) {
        if map.contains(flag.key()) {
            continue;
        }
        match flag.default_value() {
            Some(default) => map.insert(flag.key(), default.clone()),
            None if flag.is_required() => {
                return Err(ParseError::MissingRequiredFlag {
                    command: command.name().to_string(),
                    flag: flag.display_name(),
                })
            }
            None => {}
        }
    }

    debug!(command = command.name(), args = ?map, "classified tokens");
    Ok(map)
}
