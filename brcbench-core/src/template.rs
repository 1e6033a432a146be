//! Run Command Templates
//!
//! A run command is an argv whose single placeholder token receives the
//! input file path. The slot is located once at construction so substitution
//! can never fail later.

use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Placeholder substituted with the input file path
pub const PLACEHOLDER: &str = "{file}";

/// Errors raised while validating a command template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The argv was empty
    #[error("command template is empty")]
    Empty,

    /// No token contained the placeholder
    #[error("command template has no `{{file}}` token")]
    MissingPlaceholder,

    /// More than one token contained the placeholder
    #[error("command template has {0} `{{file}}` tokens, expected exactly one")]
    MultiplePlaceholders(usize),
}

/// Run command with exactly one token carrying the input-file slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CommandTemplate {
    tokens: Vec<String>,
    slot: usize,
}

impl CommandTemplate {
    /// Validate an argv and locate its placeholder token
    pub fn new<I, S>(tokens: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(TemplateError::Empty);
        }

        let slots: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.contains(PLACEHOLDER))
            .map(|(index, _)| index)
            .collect();

        match slots.as_slice() {
            [] => Err(TemplateError::MissingPlaceholder),
            [slot] => Ok(Self {
                slot: *slot,
                tokens,
            }),
            many => Err(TemplateError::MultiplePlaceholders(many.len())),
        }
    }

    /// Raw tokens, placeholder included
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Index of the token holding the placeholder
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Produce the concrete argv for `input`.
    ///
    /// The path is spliced in as an `OsStr`, so non-UTF-8 paths reach the
    /// child byte for byte.
    pub fn render(&self, input: &Path) -> Vec<OsString> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                if index == self.slot {
                    substitute(token, input.as_os_str())
                } else {
                    OsString::from(token)
                }
            })
            .collect()
    }
}

fn substitute(token: &str, input: &OsStr) -> OsString {
    let mut rendered = OsString::with_capacity(token.len() + input.len());
    for (index, piece) in token.split(PLACEHOLDER).enumerate() {
        if index > 0 {
            rendered.push(input);
        }
        rendered.push(piece);
    }
    rendered
}

impl TryFrom<Vec<String>> for CommandTemplate {
    type Error = TemplateError;

    fn try_from(tokens: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(tokens)
    }
}

impl From<CommandTemplate> for Vec<String> {
    fn from(template: CommandTemplate) -> Self {
        template.tokens
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}
