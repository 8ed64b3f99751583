//! Goal cell token decoding
//!
//! A goal cell is either `SPACE`, a bare object name (`POLYANET`) or
//! `<MODIFIER>_<NAME>` where the modifier is a color (`BLUE_SOLOON`) or a
//! direction (`RIGHT_COMETH`).
//!
//! Modifier detection is keyed on the object name appearing anywhere in the
//! token, and the name half after the underscore is never checked against the
//! expected literal. `BLUE_SOLOONS` decodes as a blue SOLOON, and any token
//! without SOLOON or COMETH decodes as a POLYANET. Only the modifier half is
//! strict, since it has to become a typed [`Color`] or [`Direction`].

use crate::types::{Color, Direction, ObjectSpec, Placement, Position};
use crate::{MegaverseError, Result};

const SPACE: &str = "SPACE";
const SOLOON: &str = "SOLOON";
const COMETH: &str = "COMETH";

/// Modifier half of a split token, still as written in the goal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier<'a> {
    Color(&'a str),
    Direction(&'a str),
}

/// Token split into its object name and optional modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenParts<'a> {
    pub name: &'a str,
    pub modifier: Option<Modifier<'a>>,
}

impl<'a> TokenParts<'a> {
    pub fn color(&self) -> Option<&'a str> {
        match self.modifier {
            Some(Modifier::Color(color)) => Some(color),
            _ => None,
        }
    }

    pub fn direction(&self) -> Option<&'a str> {
        match self.modifier {
            Some(Modifier::Direction(direction)) => Some(direction),
            _ => None,
        }
    }
}

/// True for the empty-cell token, in any case
pub fn is_space(token: &str) -> bool {
    token.eq_ignore_ascii_case(SPACE)
}

/// Split a token at its first underscore when it names a SOLOON or COMETH
///
/// Tokens without an underscore, or naming neither marker, are returned whole
/// as the name.
pub fn split_token(token: &str) -> TokenParts<'_> {
    if token.contains(SOLOON) {
        split_with(token, Modifier::Color)
    } else if token.contains(COMETH) {
        split_with(token, Modifier::Direction)
    } else {
        TokenParts {
            name: token,
            modifier: None,
        }
    }
}

fn split_with<'a>(token: &'a str, wrap: fn(&'a str) -> Modifier<'a>) -> TokenParts<'a> {
    match token.split_once('_') {
        Some((modifier, name)) => TokenParts {
            name,
            modifier: Some(wrap(modifier)),
        },
        None => TokenParts {
            name: token,
            modifier: None,
        },
    }
}

/// Decode a goal token into a placement at `position`
pub fn parse_token(token: &str, position: Position) -> Result<Placement> {
    let invalid = |reason: String| MegaverseError::InvalidToken {
        token: token.to_string(),
        reason,
    };

    let object = if token.contains(SOLOON) {
        let modifier = split_token(token)
            .color()
            .ok_or_else(|| invalid("missing color".to_string()))?;
        ObjectSpec::ColoredMarker(modifier.parse::<Color>().map_err(invalid)?)
    } else if token.contains(COMETH) {
        let modifier = split_token(token)
            .direction()
            .ok_or_else(|| invalid("missing direction".to_string()))?;
        ObjectSpec::DirectionalMarker(modifier.parse::<Direction>().map_err(invalid)?)
    } else {
        ObjectSpec::Basic
    };

    Ok(Placement::new(object, position))
}
