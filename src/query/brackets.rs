//! Bracket parser
//!
//! Turns a raw filter string into a tree of [`QueryToken`]s.
//!
//! The same parenthesis syntax serves two purposes: `and(...)`, `or(...)`
//! and `not(...)` open a boolean group, while `field.in.(...)` opens a value
//! list. Which one applies is decided only by the piece immediately in front
//! of the `(`. An empty piece in front of `(` opens an anonymous bracket whose
//! content is spliced into the enclosing group.
//!
//! The parser is an explicit loop over an explicit frame stack; it keeps no
//! state between calls.

use super::errors::{QueryError, QueryResult};
use super::operators::Operator;
use super::token::{Connective, OrderToken, Piece, QueryToken, RawValue};

#[derive(Debug)]
enum FrameKind {
    Root,
    Group(Connective),
    Anonymous,
    ValueList { path: Vec<String>, operator: String },
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    tokens: Vec<QueryToken>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            tokens: Vec::new(),
        }
    }
}

/// Parses a filter string into its top-level tokens.
///
/// Top-level tokens are implicitly joined with AND by the compiler.
pub fn parse(input: &str) -> QueryResult<Vec<QueryToken>> {
    validate_brackets(input)?;

    let mut stack = vec![Frame::new(FrameKind::Root)];
    let mut cursor = 0;

    loop {
        let rest = &input[cursor..];
        let open = rest.find('(');
        let close = rest.find(')');

        match (open, close) {
            (Some(o), c) if c.map_or(true, |c| o < c) => {
                let frame = top(&mut stack, input)?;
                if matches!(frame.kind, FrameKind::ValueList { .. }) {
                    return Err(QueryError::malformed(&rest[..=o], input));
                }

                let pieces: Vec<&str> = rest[..o].split(',').collect();
                let (last, leading) = match pieces.split_last() {
                    Some(split) => split,
                    None => return Err(QueryError::BracketImbalance(input.to_string())),
                };
                for piece in leading {
                    push_piece(&mut frame.tokens, piece, input)?;
                }

                stack.push(Frame::new(open_kind(last, input)?));
                cursor += o + 1;
            }
            (_, Some(c)) => {
                let Frame { kind, mut tokens } = match stack.pop() {
                    Some(frame) if !stack.is_empty() => frame,
                    _ => return Err(QueryError::BracketImbalance(input.to_string())),
                };
                let content = &rest[..c];
                let parent = top(&mut stack, input)?;

                match kind {
                    FrameKind::ValueList { path, operator } => {
                        let values = content
                            .split(',')
                            .map(str::trim)
                            .filter(|value| !value.is_empty())
                            .map(str::to_string)
                            .collect();
                        parent.tokens.push(QueryToken::Leaf {
                            path,
                            operator,
                            value: RawValue::List(values),
                        });
                    }
                    FrameKind::Group(connective) => {
                        for piece in content.split(',') {
                            push_piece(&mut tokens, piece, input)?;
                        }
                        parent.tokens.push(QueryToken::group(connective, tokens));
                    }
                    FrameKind::Anonymous => {
                        for piece in content.split(',') {
                            push_piece(&mut tokens, piece, input)?;
                        }
                        parent.tokens.append(&mut tokens);
                    }
                    FrameKind::Root => {
                        return Err(QueryError::BracketImbalance(input.to_string()));
                    }
                }
                cursor += c + 1;
            }
            _ => {
                let frame = top(&mut stack, input)?;
                for piece in rest.split(',') {
                    push_piece(&mut frame.tokens, piece, input)?;
                }
                break;
            }
        }
    }

    match stack.pop() {
        Some(root) if stack.is_empty() => Ok(root.tokens),
        _ => Err(QueryError::BracketImbalance(input.to_string())),
    }
}

/// Checks that the input is non-blank and its parentheses are balanced and
/// correctly ordered, scanning left to right.
pub fn validate_brackets(input: &str) -> QueryResult<()> {
    if input.trim().is_empty() {
        return Err(QueryError::BracketImbalance(input.to_string()));
    }

    let mut depth: usize = 0;
    for ch in input.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| QueryError::BracketImbalance(input.to_string()))?;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(QueryError::BracketImbalance(input.to_string()));
    }
    Ok(())
}

/// Parses an order string: `path[.asc|.desc]` pieces separated by commas.
///
/// A bare path sorts ascending.
pub fn parse_order(input: &str) -> QueryResult<Vec<OrderToken>> {
    let mut tokens = Vec::new();

    for piece in input.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        if piece.contains('(') || piece.contains(')') {
            return Err(QueryError::malformed(piece, input));
        }

        let segments: Vec<&str> = piece.split('.').collect();
        let (path, operator) = match segments.split_last() {
            Some((last, path))
                if !path.is_empty() && matches!(*last, "asc" | "desc") =>
            {
                (path, *last)
            }
            _ => (segments.as_slice(), Operator::Asc.as_str()),
        };

        if path.iter().any(|segment| segment.is_empty()) {
            return Err(QueryError::malformed(piece, input));
        }

        tokens.push(OrderToken {
            path: path.iter().map(|s| s.to_string()).collect(),
            operator: operator.to_string(),
        });
    }

    Ok(tokens)
}

fn top<'a>(stack: &'a mut [Frame], input: &str) -> QueryResult<&'a mut Frame> {
    stack
        .last_mut()
        .ok_or_else(|| QueryError::BracketImbalance(input.to_string()))
}

/// Decides what the piece in front of `(` opens
fn open_kind(piece: &str, input: &str) -> QueryResult<FrameKind> {
    match Piece::classify(piece, input)? {
        Piece::Empty => Ok(FrameKind::Anonymous),
        Piece::Connective(connective) => Ok(FrameKind::Group(connective)),
        Piece::Leaf {
            path,
            operator,
            value,
        } if value.is_empty()
            && Operator::from_token(&operator).map_or(false, |op| op.takes_list()) =>
        {
            Ok(FrameKind::ValueList { path, operator })
        }
        Piece::Leaf { .. } => Err(QueryError::malformed(piece.trim(), input)),
    }
}

fn push_piece(tokens: &mut Vec<QueryToken>, piece: &str, input: &str) -> QueryResult<()> {
    match Piece::classify(piece, input)? {
        Piece::Empty => Ok(()),
        Piece::Connective(_) => Err(QueryError::malformed(piece.trim(), input)),
        Piece::Leaf {
            path,
            operator,
            value,
        } => {
            tokens.push(QueryToken::Leaf {
                path,
                operator,
                value: RawValue::Scalar(value),
            });
            Ok(())
        }
    }
}
