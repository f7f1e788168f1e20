use crate::token::{FlowControl, TokenGroup};

/// Split an input line into pipeline stages.
///
/// Single pass over the characters. Spaces and tabs outside quotes separate
/// tokens; `'` and `"` group characters into one token and are dropped; `|`
/// and `>` outside quotes end the current group and open a new one tagged
/// with that operator. A trailing group with no tokens is dropped, but empty
/// groups before an operator are kept so the executor can reject them.
pub fn tokenize(line: &str) -> Vec<TokenGroup> {
    let (mut groups, last, _) = scan(line);
    if !last.is_empty() {
        groups.push(last);
    }
    groups
}

/// The group still being typed at the end of a partial line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialGroup {
    /// Tokens of the last group. Its flow is the operator that opened it,
    /// and it may have no tokens yet.
    pub group: TokenGroup,
    /// The last token is unfinished: the line ends inside it or inside an
    /// open quote. When false, the next token has not started.
    pub token_open: bool,
}

/// Tokenize a line that is still being typed, keeping the last group even
/// when it is empty.
pub fn tokenize_partial(line: &str) -> PartialGroup {
    let (_, group, token_open) = scan(line);
    PartialGroup { group, token_open }
}

/// Returns the finished groups, the last group, and whether the line ended
/// inside a token.
fn scan(line: &str) -> (Vec<TokenGroup>, TokenGroup, bool) {
    let mut groups = Vec::new();
    let mut group = TokenGroup::new(FlowControl::None);
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut pos = 0;

    let mut current = String::new();
    // Set once a token has started, so that '' yields an empty token.
    let mut in_token = false;
    let mut quote: Option<char> = None;

    while pos < len {
        let c = chars[pos];
        pos += 1;

        if let Some(q) = quote {
            if c == q {
                quote = None;
            } else {
                current.push(c);
            }
            continue;
        }

        match c {
            ' ' | '\t' => {
                flush_token(&mut group, &mut current, &mut in_token);
            }
            '\'' | '"' => {
                quote = Some(c);
                in_token = true;
            }
            '|' | '>' => {
                flush_token(&mut group, &mut current, &mut in_token);
                let flow = if c == '|' {
                    FlowControl::Pipe
                } else {
                    FlowControl::Redirect
                };
                groups.push(std::mem::replace(&mut group, TokenGroup::new(flow)));
            }
            _ => {
                current.push(c);
                in_token = true;
            }
        }
    }

    // Unterminated quotes run to end of line.
    let token_open = in_token;
    flush_token(&mut group, &mut current, &mut in_token);
    (groups, group, token_open)
}

fn flush_token(group: &mut TokenGroup, current: &mut String, in_token: &mut bool) {
    if *in_token {
        group.tokens.push(std::mem::take(current));
        *in_token = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(group: &TokenGroup) -> Vec<&str> {
        group.tokens.iter().map(String::as_str).collect()
    }

    #[test]
    fn leading_and_trailing_whitespace() {
        let groups = tokenize("  hello   there  macaroni    ");
        assert_eq!(groups.len(), 1);
        assert_eq!(words(&groups[0]), vec!["hello", "there", "macaroni"]);
        assert_eq!(groups[0].flow, FlowControl::None);
    }

    #[test]
    fn single_quotes_group_words() {
        let groups = tokenize("  a   'b c'  d");
        assert_eq!(groups.len(), 1);
        assert_eq!(words(&groups[0]), vec!["a", "b c", "d"]);
    }

    #[test]
    fn double_quotes_group_words() {
        let groups = tokenize(r#"echo "hello world""#);
        assert_eq!(words(&groups[0]), vec!["echo", "hello world"]);
    }

    #[test]
    fn other_quote_is_literal_inside_quotes() {
        let groups = tokenize(r#"say "it's fine" 'a "b"'"#);
        assert_eq!(words(&groups[0]), vec!["say", "it's fine", r#"a "b""#]);
    }

    #[test]
    fn quotes_join_adjacent_text() {
        let groups = tokenize("pre'fix suf'fix");
        assert_eq!(words(&groups[0]), vec!["prefix suffix"]);
    }

    #[test]
    fn empty_quotes_yield_empty_token() {
        let groups = tokenize("grep ''");
        assert_eq!(words(&groups[0]), vec!["grep", ""]);
    }

    #[test]
    fn tabs_separate_tokens() {
        let groups = tokenize("a\tb\t\tc");
        assert_eq!(words(&groups[0]), vec!["a", "b", "c"]);
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        let groups = tokenize("echo 'abc def");
        assert_eq!(words(&groups[0]), vec!["echo", "abc def"]);
    }

    #[test]
    fn pipe_and_redirect_split_groups() {
        let groups = tokenize("ls | grep x > out.txt");
        assert_eq!(groups.len(), 3);
        assert_eq!(words(&groups[0]), vec!["ls"]);
        assert_eq!(groups[0].flow, FlowControl::None);
        assert_eq!(words(&groups[1]), vec!["grep", "x"]);
        assert_eq!(groups[1].flow, FlowControl::Pipe);
        assert_eq!(words(&groups[2]), vec!["out.txt"]);
        assert_eq!(groups[2].flow, FlowControl::Redirect);
    }

    #[test]
    fn operators_without_spaces() {
        let groups = tokenize("ls|grep x>out.txt");
        assert_eq!(groups.len(), 3);
        assert_eq!(words(&groups[0]), vec!["ls"]);
        assert_eq!(words(&groups[1]), vec!["grep", "x"]);
        assert_eq!(words(&groups[2]), vec!["out.txt"]);
    }

    #[test]
    fn quoted_operators_are_literal() {
        let groups = tokenize("grep 'a|b' \"> c\"");
        assert_eq!(groups.len(), 1);
        assert_eq!(words(&groups[0]), vec!["grep", "a|b", "> c"]);
    }

    #[test]
    fn leading_operator_keeps_empty_first_group() {
        let groups = tokenize("| grep x");
        assert_eq!(groups.len(), 2);
        assert!(groups[0].is_empty());
        assert_eq!(groups[0].flow, FlowControl::None);
        assert_eq!(words(&groups[1]), vec!["grep", "x"]);
        assert_eq!(groups[1].flow, FlowControl::Pipe);
    }

    #[test]
    fn trailing_empty_group_is_dropped() {
        let groups = tokenize("ls | ");
        assert_eq!(groups.len(), 1);
        assert_eq!(words(&groups[0]), vec!["ls"]);
    }

    #[test]
    fn empty_line() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn rejoined_tokens_are_deterministic() {
        let a = tokenize("farm   add  -t 'mammal'");
        let b = tokenize("farm add -t mammal");
        assert_eq!(a[0].tokens.join(" "), b[0].tokens.join(" "));
    }

    #[test]
    fn partial_line_reports_open_token() {
        let partial = tokenize_partial("farm ad");
        assert_eq!(words(&partial.group), vec!["farm", "ad"]);
        assert!(partial.token_open);

        let partial = tokenize_partial("farm add ");
        assert_eq!(words(&partial.group), vec!["farm", "add"]);
        assert!(!partial.token_open);

        let partial = tokenize_partial("");
        assert!(partial.group.is_empty());
        assert!(!partial.token_open);
    }

    #[test]
    fn partial_line_keeps_empty_last_group() {
        let partial = tokenize_partial("ls | ");
        assert!(partial.group.is_empty());
        assert_eq!(partial.group.flow, FlowControl::Pipe);
        assert!(!partial.token_open);

        let partial = tokenize_partial("ls >");
        assert_eq!(partial.group.flow, FlowControl::Redirect);
    }

    #[test]
    fn partial_line_inside_quote() {
        let partial = tokenize_partial("grep 'a|");
        assert_eq!(words(&partial.group), vec!["grep", "a|"]);
        assert_eq!(partial.group.flow, FlowControl::None);
        assert!(partial.token_open);

        let partial = tokenize_partial("grep \"a ");
        assert_eq!(words(&partial.group), vec!["grep", "a "]);
        assert!(partial.token_open);
    }
}
