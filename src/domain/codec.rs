//! Flat array encoding: pre-order `[payload, marker]` pairs.
//!
//! The marker carries the number of direct children of the node whose payload
//! precedes it. Its textual form is the count wrapped in `@` on both sides:
//!
//! ```text
//! root ── a ── b          ["root", "@2@", "a", "@2@", "b", "@0@", "d", "@0@", "c", "@0@"]
//!      │   └── d
//!      └── c
//! ```
//!
//! Decoding reads all pairs from one shared cursor: the children of a node are
//! the pairs that immediately follow it, depth first.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::domain::error::{DecodeError, TreeResult};
use crate::domain::node::TreeNode;

pub const MARKER_DELIMITER: char = '@';

/// One element of an encoded tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<T> {
    Payload(T),
    /// Number of direct children of the preceding payload's node
    Marker(usize),
}

/// Renders a child count as `@N@`.
pub fn format_marker(count: usize) -> String {
    format!("{MARKER_DELIMITER}{count}{MARKER_DELIMITER}")
}

/// Parses `@N@` into `N`. Anything else (signs, blanks, missing delimiters) is `None`.
pub fn parse_marker(token: &str) -> Option<usize> {
    let digits = token
        .strip_prefix(MARKER_DELIMITER)?
        .strip_suffix(MARKER_DELIMITER)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Sequential reader over a token stream, tracking the position for errors.
struct Cursor<I> {
    tokens: I,
    position: usize,
}

impl<T, I: Iterator<Item = Token<T>>> Cursor<I> {
    /// Next `(payload, child_count)` pair, `None` at a clean end of input.
    fn next_pair(&mut self) -> Result<Option<(T, usize)>, DecodeError> {
        let payload = match self.tokens.next() {
            None => return Ok(None),
            Some(Token::Payload(data)) => data,
            Some(Token::Marker(_)) => {
                return Err(DecodeError::ExpectedPayload {
                    position: self.position,
                })
            }
        };
        self.position += 1;

        match self.tokens.next() {
            Some(Token::Marker(count)) => {
                self.position += 1;
                Ok(Some((payload, count)))
            }
            _ => Err(DecodeError::ExpectedMarker {
                position: self.position,
            }),
        }
    }

    fn remaining(self) -> usize {
        self.tokens.count()
    }
}

impl<T> TreeNode<T> {
    pub fn decode(tokens: impl IntoIterator<Item = Token<T>>) -> TreeResult<Self> {
        Self::decode_with_limit(tokens, usize::MAX)
    }

    /// Decodes, rejecting trees with more than `max_depth` levels.
    ///
    /// Fails on empty input, misplaced payloads or markers, child counts that
    /// exceed the remaining pairs, and tokens left after the root's subtree.
    #[instrument(level = "debug", skip(tokens))]
    pub fn decode_with_limit(
        tokens: impl IntoIterator<Item = Token<T>>,
        max_depth: usize,
    ) -> TreeResult<Self> {
        let mut cursor = Cursor {
            tokens: tokens.into_iter(),
            position: 0,
        };
        let (data, count) = cursor.next_pair()?.ok_or(DecodeError::Empty)?;
        if max_depth == 0 {
            return Err(DecodeError::DepthExceeded { limit: max_depth }.into());
        }

        let root = TreeNode::new(data);
        // (node, children still to read)
        let mut stack = vec![(root.clone(), count)];

        loop {
            let Some(top) = stack.last_mut() else { break };
            if top.1 == 0 {
                stack.pop();
                continue;
            }
            top.1 -= 1;
            let parent = top.0.clone();

            let Some((data, count)) = cursor.next_pair()? else {
                let missing = 1 + stack.iter().map(|(_, n)| n).sum::<usize>();
                return Err(DecodeError::Truncated { missing }.into());
            };
            let child = TreeNode::new(data);
            parent.push_fresh_child(&child, &root);

            stack.push((child, count));
            if stack.len() > max_depth {
                return Err(DecodeError::DepthExceeded { limit: max_depth }.into());
            }
        }

        let trailing = cursor.remaining();
        if trailing > 0 {
            return Err(DecodeError::TrailingTokens { count: trailing }.into());
        }
        debug!(nodes = root.len(), "decoded tree");
        Ok(root)
    }
}

impl<T: Clone> TreeNode<T> {
    /// Pre-order `[payload, marker]` pairs for the subtree rooted here.
    pub fn encode(&self) -> Vec<Token<T>> {
        let mut tokens = Vec::new();
        for node in self.iter() {
            tokens.push(Token::Payload(node.data().clone()));
            tokens.push(Token::Marker(node.child_count()));
        }
        tokens
    }
}

impl<T: fmt::Display> TreeNode<T> {
    /// Textual form of [`TreeNode::encode`]: payloads via `Display`, markers as `@N@`.
    pub fn encode_strings(&self) -> Vec<String> {
        let mut items = Vec::new();
        for node in self.iter() {
            items.push(node.data().to_string());
            items.push(format_marker(node.child_count()));
        }
        items
    }
}

impl<T> TreeNode<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    pub fn decode_strings<S: AsRef<str>>(items: &[S]) -> TreeResult<Self> {
        Self::decode_strings_with_limit(items, usize::MAX)
    }

    /// Parses even positions as payloads and odd positions as markers, then decodes.
    pub fn decode_strings_with_limit<S: AsRef<str>>(
        items: &[S],
        max_depth: usize,
    ) -> TreeResult<Self> {
        let tokens = items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let item = item.as_ref();
                if position % 2 == 1 {
                    parse_marker(item)
                        .map(Token::Marker)
                        .ok_or_else(|| DecodeError::InvalidMarker {
                            position,
                            token: item.to_string(),
                        })
                } else {
                    item.parse::<T>()
                        .map(Token::Payload)
                        .map_err(|e| DecodeError::InvalidPayload {
                            position,
                            reason: e.to_string(),
                        })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::decode_with_limit(tokens, max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("@0@", Some(0))]
    #[case("@2@", Some(2))]
    #[case("@117@", Some(117))]
    #[case("@-1@", None)]
    #[case("@+1@", None)]
    #[case("@@", None)]
    #[case("@ 1@", None)]
    #[case("2", None)]
    #[case("@2", None)]
    #[case("x@2@", None)]
    fn test_parse_marker(#[case] token: &str, #[case] expected: Option<usize>) {
        assert_eq!(parse_marker(token), expected);
    }

    #[test]
    fn test_format_marker() {
        assert_eq!(format_marker(0), "@0@");
        assert_eq!(format_marker(12), "@12@");
    }

    #[test]
    fn given_marker_first_when_decode_then_expected_payload() {
        let err = TreeNode::<i32>::decode(vec![Token::Marker(0)]).unwrap_err();
        assert_eq!(err, DecodeError::ExpectedPayload { position: 0 }.into());
    }

    #[test]
    fn given_payload_without_marker_when_decode_then_expected_marker() {
        let tokens = vec![Token::Payload(1), Token::Marker(1), Token::Payload(2)];
        let err = TreeNode::decode(tokens).unwrap_err();
        assert_eq!(err, DecodeError::ExpectedMarker { position: 3 }.into());
    }
}
