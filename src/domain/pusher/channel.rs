//! Channel name formatting.
//!
//! Channel names arrive from application code verbatim. Before they reach the
//! messaging client they are normalized to the character set accepted by
//! Pusher-compatible services: `A-Z a-z 0-9 _ - = @ , . ;`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Longest channel name the messaging service accepts.
pub const MAX_CHANNEL_NAME_LEN: usize = 164;

/// Replacement for characters outside the accepted set.
const REPLACEMENT: char = '-';

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '=' | '@' | ',' | '.' | ';')
}

/// Formats a raw channel name for the messaging client.
///
/// Surrounding whitespace is trimmed, disallowed characters become `-` and
/// the result is cut to [`MAX_CHANNEL_NAME_LEN`] characters.
pub fn format_channel_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if is_allowed(c) { c } else { REPLACEMENT })
        .take(MAX_CHANNEL_NAME_LEN)
        .collect()
}

/// A channel name that has already been formatted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelName(String);

impl ChannelName {
    /// Formats `name` and rejects it if nothing is left.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        let formatted = format_channel_name(name);
        if formatted.is_empty() {
            return Err(ValidationError::empty_field("channel"));
        }
        Ok(Self(formatted))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `private-` and `presence-` channels, which require
    /// authorization on hosted services.
    pub fn is_private(&self) -> bool {
        self.0.starts_with("private-") || self.0.starts_with("presence-")
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ChannelName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ChannelName> for String {
    fn from(name: ChannelName) -> Self {
        name.0
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_names_are_unchanged() {
        assert_eq!(format_channel_name("private-orders_2024"), "private-orders_2024");
        assert_eq!(format_channel_name("a=b@c,d.e;f"), "a=b@c,d.e;f");
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(format_channel_name("  orders \n"), "orders");
    }

    #[test]
    fn disallowed_characters_are_replaced() {
        assert_eq!(format_channel_name("user/42 updates"), "user-42-updates");
        assert_eq!(format_channel_name("café"), "caf-");
    }

    #[test]
    fn long_names_are_truncated() {
        let name = "x".repeat(500);
        assert_eq!(format_channel_name(&name).len(), MAX_CHANNEL_NAME_LEN);
    }

    #[test]
    fn parse_rejects_blank_names() {
        assert_eq!(
            ChannelName::parse("   "),
            Err(ValidationError::empty_field("channel"))
        );
    }

    #[test]
    fn parse_formats_name() {
        let name = ChannelName::parse("room #1").unwrap();
        assert_eq!(name.as_str(), "room--1");
    }

    #[test]
    fn private_and_presence_channels_are_detected() {
        assert!(ChannelName::parse("private-a").unwrap().is_private());
        assert!(ChannelName::parse("presence-a").unwrap().is_private());
        assert!(!ChannelName::parse("public-a").unwrap().is_private());
    }

    #[test]
    fn deserialization_formats_and_validates() {
        let name: ChannelName = serde_json::from_str("\"a b\"").unwrap();
        assert_eq!(name.as_str(), "a-b");
        assert!(serde_json::from_str::<ChannelName>("\"\"").is_err());
    }

    proptest! {
        #[test]
        fn formatted_names_only_contain_allowed_characters(name in ".*") {
            let formatted = format_channel_name(&name);
            prop_assert!(formatted.chars().all(is_allowed));
            prop_assert!(formatted.chars().count() <= MAX_CHANNEL_NAME_LEN);
        }

        #[test]
        fn formatting_is_idempotent(name in ".*") {
            let once = format_channel_name(&name);
            prop_assert_eq!(format_channel_name(&once), once.clone());
        }
    }
}
