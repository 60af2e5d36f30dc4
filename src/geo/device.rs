//! User-agent classification.
//!
//! A heuristic, not a parser: each field is decided by an ordered list of
//! substring rules where the first match wins. Ordering matters because the
//! tokens overlap (Chromium-based Edge carries "Chrome" and "Safari", iPad
//! user agents also say "Mac OS").

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Browser {
    Firefox,
    Chrome,
    Safari,
    Edge,
    Opera,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Os {
    Windows,
    #[serde(rename = "macOS")]
    MacOs,
    Linux,
    Android,
    #[serde(rename = "iOS")]
    Ios,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceKind {
    Mobile,
    Tablet,
    Desktop,
}

/// Device hints derived from a user-agent string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeviceProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<Browser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceKind>,
}

/// How a rule inspects the user-agent string.
#[derive(Debug, Clone, Copy)]
pub enum Pattern {
    /// Any of the tokens is present.
    AnyOf(&'static [&'static str]),
    /// `token` is present and `unless` is not.
    Without {
        token: &'static str,
        unless: &'static str,
    },
}

impl Pattern {
    pub fn matches(&self, user_agent: &str) -> bool {
        match *self {
            Pattern::AnyOf(tokens) => tokens.iter().any(|t| user_agent.contains(t)),
            Pattern::Without { token, unless } => {
                user_agent.contains(token) && !user_agent.contains(unless)
            }
        }
    }
}

/// A single classification rule yielding `value` on match.
#[derive(Debug, Clone, Copy)]
pub struct Rule<T> {
    pub pattern: Pattern,
    pub value: T,
}

const fn any<T>(tokens: &'static [&'static str], value: T) -> Rule<T> {
    Rule {
        pattern: Pattern::AnyOf(tokens),
        value,
    }
}

pub const BROWSER_RULES: [Rule<Browser>; 5] = [
    any(&["Firefox"], Browser::Firefox),
    any(&["Chrome"], Browser::Chrome),
    Rule {
        pattern: Pattern::Without {
            token: "Safari",
            unless: "Chrome",
        },
        value: Browser::Safari,
    },
    any(&["Edge"], Browser::Edge),
    any(&["Opera", "OPR"], Browser::Opera),
];

pub const OS_RULES: [Rule<Os>; 5] = [
    any(&["Windows"], Os::Windows),
    any(&["Mac OS"], Os::MacOs),
    any(&["Linux"], Os::Linux),
    any(&["Android"], Os::Android),
    any(&["iOS", "iPhone", "iPad"], Os::Ios),
];

pub const DEVICE_RULES: [Rule<DeviceKind>; 2] = [
    any(&["Mobile"], DeviceKind::Mobile),
    any(&["Tablet", "iPad"], DeviceKind::Tablet),
];

/// Value of the first rule matching `user_agent`.
pub fn first_match<T: Copy>(rules: &[Rule<T>], user_agent: &str) -> Option<T> {
    rules
        .iter()
        .find(|rule| rule.pattern.matches(user_agent))
        .map(|rule| rule.value)
}

/// Classify a user-agent string. An empty string yields an empty profile;
/// anything else always gets a device kind, `Desktop` by default.
pub fn classify_user_agent(user_agent: &str) -> DeviceProfile {
    if user_agent.is_empty() {
        return DeviceProfile::default();
    }

    DeviceProfile {
        browser: first_match(&BROWSER_RULES, user_agent),
        os: first_match(&OS_RULES, user_agent),
        device: Some(first_match(&DEVICE_RULES, user_agent).unwrap_or(DeviceKind::Desktop)),
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Browser::Firefox => "Firefox",
            Browser::Chrome => "Chrome",
            Browser::Safari => "Safari",
            Browser::Edge => "Edge",
            Browser::Opera => "Opera",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Os::Windows => "Windows",
            Os::MacOs => "macOS",
            Os::Linux => "Linux",
            Os::Android => "Android",
            Os::Ios => "iOS",
        };
        f.write_str(name)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceKind::Mobile => "Mobile",
            DeviceKind::Tablet => "Tablet",
            DeviceKind::Desktop => "Desktop",
        };
        f.write_str(name)
    }
}
