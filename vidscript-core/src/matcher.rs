//! Turns a token stream into command nodes using the pattern table.
//!
//! Directives are matched left to right. A directive that matches becomes
//! exactly one node and advances the cursor past its window. A directive that
//! fails contributes exactly one error; the cursor then moves forward to the
//! next token that is a registered command name or a comment.

use serde::Serialize;

use crate::error::{DirectiveError, Location};
use crate::node::{CommandNode, CommentParams};
use crate::patterns::{ExpectedToken, Params, PatternRegistry, Validation, registry};
use crate::tokenizer::{Token, tokenize};

/// Everything the parser learned from one text buffer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    pub commands: Vec<CommandNode>,
    pub errors: Vec<DirectiveError>,
    /// Matched token windows joined by single spaces, one per command
    pub parsed: Vec<String>,
    /// Where each command's directive starts, one per command
    pub locations: Vec<Location>,
}

impl ParseResult {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

struct Matched {
    node: CommandNode,
    consumed: usize,
    source: String,
}

/// Tokenize and parse a directive buffer
pub fn parse(source: &str) -> ParseResult {
    parse_tokens(&tokenize(source))
}

pub fn parse_tokens(tokens: &[Token]) -> ParseResult {
    let registry = registry();
    let mut result = ParseResult::default();
    let mut cursor = 0;

    while cursor < tokens.len() {
        let token = &tokens[cursor];

        if token.is_comment() {
            result.commands.push(CommandNode::Comment(CommentParams {
                text: token.text.clone(),
            }));
            result.parsed.push(token.text.clone());
            result.locations.push(location(token));
            cursor += 1;
            continue;
        }

        match match_directive(registry, tokens, cursor) {
            Ok(matched) => {
                log::debug!("Matched directive: {}", matched.source);
                result.commands.push(matched.node);
                result.parsed.push(matched.source);
                result.locations.push(location(token));
                cursor += matched.consumed;
            }
            Err(err) => {
                log::debug!("Directive at {}:{} failed: {}", token.line, token.column, err);
                result.errors.push(err);
                cursor = resync(registry, tokens, cursor + 1);
            }
        }
    }

    result
}

fn location(token: &Token) -> Location {
    Location {
        line: token.line,
        column: token.column,
    }
}

/// Index of the next token a directive can start at
fn resync(registry: &PatternRegistry, tokens: &[Token], from: usize) -> usize {
    tokens[from.min(tokens.len())..]
        .iter()
        .position(|t| t.is_comment() || registry.is_command(&t.text))
        .map_or(tokens.len(), |offset| from + offset)
}

fn match_directive(
    registry: &PatternRegistry,
    tokens: &[Token],
    start: usize,
) -> Result<Matched, DirectiveError> {
    let keyword = &tokens[start];
    let pattern = registry
        .get(&keyword.text)
        .ok_or_else(|| DirectiveError::UnknownCommand {
            command: keyword.text.clone(),
            location: location(keyword),
        })?;

    let incomplete = || DirectiveError::Incomplete {
        command: pattern.name.to_string(),
        location: location(keyword),
    };

    if start + pattern.max_required() >= tokens.len() {
        return Err(incomplete());
    }

    let end = (start + pattern.max_position() + 1).min(tokens.len());
    let window = &tokens[start..end];

    let mut expected: Vec<&ExpectedToken> = pattern.expected_tokens.iter().collect();
    expected.sort_by_key(|e| e.position);

    let mut params = Params::default();
    let mut consumed = 1;
    // Once an optional token is missing, everything after it is missing too
    let mut truncated = false;

    for entry in expected {
        let token = if truncated {
            None
        } else {
            window.get(entry.position)
        };

        match token {
            Some(token) if entry.matcher.matches(&token.text) => {
                if let Some(name) = entry.param {
                    params.insert(name, token.text.clone());
                }
                consumed = consumed.max(entry.position + 1);
            }
            _ if entry.optional => {
                truncated = true;
                if let (Some(name), Some(default)) = (entry.param, entry.default) {
                    params.insert(name, default);
                }
            }
            Some(token) => {
                return Err(DirectiveError::InvalidArguments {
                    command: pattern.name.to_string(),
                    token: token.text.clone(),
                    position: entry.position,
                    location: location(token),
                });
            }
            None => return Err(incomplete()),
        }
    }

    let source = window[..consumed]
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let rejected = |reason: Option<String>| DirectiveError::ValidationFailed {
        command: pattern.name.to_string(),
        source_text: source.clone(),
        reason,
        location: location(keyword),
    };

    if let Validation::Invalid(reason) = (pattern.validate)(&params) {
        return Err(rejected(reason));
    }
    let node = (pattern.create_node)(&params).ok_or_else(|| rejected(None))?;

    Ok(Matched {
        node,
        consumed,
        source,
    })
}
