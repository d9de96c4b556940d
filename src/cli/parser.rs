//! Flag/value extraction for one tokenized command line.
//!
//! Tokens arrive split on whitespace with quotes still attached, so a value such
//! as `"Grocery Store"` spans two tokens. The scanner is a small state machine:
//! it expects a flag, then a value, and switches into a quoted state when a value
//! opens a quote without closing it. Problems are collected rather than returned
//! at the first one, so a caller can show everything wrong with a line at once.

use std::collections::HashMap;
use std::fmt;

use crate::cli::registry::{CommandSignature, COMMANDS};

const QUOTE: char = '"';

/// Flag to value mapping produced by a successful parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    values: HashMap<String, String>,
}

impl ParsedArgs {
    pub fn get(&self, flag: &str) -> Option<&str> {
        self.values.get(flag).map(String::as_str)
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.values.contains_key(flag)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.values
    }

    // Repeated flags overwrite: the last occurrence wins.
    fn insert(&mut self, flag: &str, value: String) {
        self.values.insert(flag.to_string(), value);
    }
}

/// A single problem found while scanning a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseIssue {
    UnknownCommand {
        command: String,
        suggestion: Option<&'static str>,
    },
    UnknownFlag(String),
    MissingValue(String),
    UnclosedQuote(String),
    UnexpectedArgument(String),
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseIssue::UnknownCommand {
                command,
                suggestion: Some(best),
            } => write!(f, "Unknown command: {command} (did you mean `{best}`?)"),
            ParseIssue::UnknownCommand {
                command,
                suggestion: None,
            } => write!(f, "Unknown command: {command}"),
            ParseIssue::UnknownFlag(flag) => write!(f, "Unknown flag: {flag}"),
            ParseIssue::MissingValue(flag) => write!(f, "Flag {flag} requires a value"),
            ParseIssue::UnclosedQuote(flag) => write!(f, "Unclosed quote for flag: {flag}"),
            ParseIssue::UnexpectedArgument(arg) => {
                write!(f, "Unexpected argument: {arg}. Expected a flag.")
            }
        }
    }
}

/// Every issue found in one line, plus whatever values could still be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors {
    issues: Vec<ParseIssue>,
    partial: ParsedArgs,
}

impl ParseErrors {
    fn single(issue: ParseIssue) -> Self {
        Self {
            issues: vec![issue],
            partial: ParsedArgs::default(),
        }
    }

    /// Error for a line whose leading words match no registered command.
    pub fn unknown_command(command: &str) -> Self {
        Self::single(ParseIssue::UnknownCommand {
            command: command.to_string(),
            suggestion: COMMANDS.suggest(command),
        })
    }

    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Values collected despite the errors, e.g. an unterminated quoted value.
    ///
    /// An unclosed quote swallows the rest of the line: flags after it end up
    /// inside the partial value and are not read as flags.
    pub fn partial(&self) -> &ParsedArgs {
        &self.partial
    }

    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("\n"))
    }
}

impl std::error::Error for ParseErrors {}

enum ScanState<'a> {
    ExpectFlag,
    ExpectValue { flag: &'a str },
    InQuote { flag: &'a str, words: Vec<&'a str> },
}

/// Splits a raw line on whitespace. Quotes are left in place for [`parse`].
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Looks up `command` in the built-in table and parses `tokens` against it.
pub fn parse_command<S: AsRef<str>>(tokens: &[S], command: &str) -> Result<ParsedArgs, ParseErrors> {
    match COMMANDS.get(command) {
        Some(signature) => parse(tokens, signature),
        None => Err(ParseErrors::unknown_command(command)),
    }
}

/// Parses `tokens` (command name included) against `signature`.
pub fn parse<S: AsRef<str>>(
    tokens: &[S],
    signature: &CommandSignature,
) -> Result<ParsedArgs, ParseErrors> {
    let mut args = ParsedArgs::default();
    let mut issues = Vec::new();
    let mut state = ScanState::ExpectFlag;

    for token in tokens.iter().skip(signature.word_count()) {
        let token: &str = token.as_ref();
        state = match state {
            ScanState::ExpectFlag => expect_flag(token, signature, &mut issues),
            ScanState::ExpectValue { flag } if token.starts_with('-') => {
                issues.push(ParseIssue::MissingValue(flag.to_string()));
                expect_flag(token, signature, &mut issues)
            }
            ScanState::ExpectValue { flag } => {
                if let Some(opened) = open_quote(token) {
                    ScanState::InQuote {
                        flag,
                        words: vec![opened],
                    }
                } else {
                    args.insert(flag, strip_quotes(token).to_string());
                    ScanState::ExpectFlag
                }
            }
            ScanState::InQuote { flag, mut words } => match token.strip_suffix(QUOTE) {
                Some(last) => {
                    words.push(last);
                    args.insert(flag, words.join(" "));
                    ScanState::ExpectFlag
                }
                None => {
                    words.push(token);
                    ScanState::InQuote { flag, words }
                }
            },
        };
    }

    match state {
        ScanState::ExpectFlag => {}
        ScanState::ExpectValue { flag } => issues.push(ParseIssue::MissingValue(flag.to_string())),
        ScanState::InQuote { flag, words } => {
            issues.push(ParseIssue::UnclosedQuote(flag.to_string()));
            args.insert(flag, words.join(" "));
        }
    }

    if issues.is_empty() {
        Ok(args)
    } else {
        tracing::debug!(command = signature.name, issues = issues.len(), "command line rejected");
        Err(ParseErrors {
            issues,
            partial: args,
        })
    }
}

fn expect_flag<'a>(
    token: &'a str,
    signature: &CommandSignature,
    issues: &mut Vec<ParseIssue>,
) -> ScanState<'a> {
    if !token.starts_with('-') {
        issues.push(ParseIssue::UnexpectedArgument(token.to_string()));
        ScanState::ExpectFlag
    } else if signature.accepts(token) {
        ScanState::ExpectValue { flag: token }
    } else {
        issues.push(ParseIssue::UnknownFlag(token.to_string()));
        ScanState::ExpectFlag
    }
}

/// Returns the text after an opening quote that is not closed within `token`.
fn open_quote(token: &str) -> Option<&str> {
    let rest = token.strip_prefix(QUOTE)?;
    if rest.ends_with(QUOTE) {
        None
    } else {
        Some(rest)
    }
}

/// Strips a quote pair enclosing a single token: `"abc"` becomes `abc`.
fn strip_quotes(token: &str) -> &str {
    token
        .strip_prefix(QUOTE)
        .and_then(|rest| rest.strip_suffix(QUOTE))
        .unwrap_or(token)
}
