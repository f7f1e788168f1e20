use std::sync::Arc;

use cmdtree_shell::value::Value;

/// Returns candidate completions for a partially typed value.
pub type Completer = Arc<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// A completion candidate handed to the line reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Text that replaces the token under the cursor.
    pub value: String,
    /// Label shown in the suggestion list.
    pub display: String,
}

impl Suggestion {
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Suggestion {
            display: value.clone(),
            value,
        }
    }
}

/// OneOf members matching `prefix` take precedence over the completer.
pub(crate) fn suggest_values(
    one_of: Option<&[Value]>,
    completer: Option<&Completer>,
    prefix: &str,
) -> Vec<Suggestion> {
    if let Some(one_of) = one_of {
        return one_of
            .iter()
            .map(ToString::to_string)
            .filter(|candidate| candidate.starts_with(prefix))
            .map(Suggestion::plain)
            .collect();
    }

    match completer {
        Some(completer) => (**completer)(prefix).into_iter().map(Suggestion::plain).collect(),
        None => Vec::new(),
    }
}
