//! Topic grammar for the device bus.
//!
//! ## Topic Format
//!
//! Commands (published): `command/<sensor>/<resource>/<method>/<correlation_id>`
//! Responses (subscribed): `response/<sensor>/<resource>/<method>/<correlation_id>`
//! Exports (subscribed): `export/<sensor>/<export_name>`
//!
//! Segment counts are fixed per family. A topic with the wrong arity or the
//! wrong leading segment is rejected as a whole, never partially parsed.

use std::fmt;

use crate::error::{Error, Result};
use crate::types::{Method, Resource};

/// The three topic families, discriminated by their first segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicFamily {
    Command,
    Response,
    Export,
}

impl TopicFamily {
    pub fn name(&self) -> &'static str {
        match self {
            TopicFamily::Command => "command",
            TopicFamily::Response => "response",
            TopicFamily::Export => "export",
        }
    }

    /// Fixed number of `/`-separated segments.
    pub fn arity(&self) -> usize {
        match self {
            TopicFamily::Command | TopicFamily::Response => 5,
            TopicFamily::Export => 3,
        }
    }
}

impl fmt::Display for TopicFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether `topic` matches the MQTT subscription `filter`.
///
/// `+` matches exactly one level, a trailing `#` matches the parent level and
/// everything below it. Wildcards in the first level never match topics
/// starting with `$`.
pub fn topic_matches_filter(topic: &str, filter: &str) -> bool {
    if topic.starts_with('$') && filter.starts_with(['+', '#']) {
        return false;
    }

    let mut levels = topic.split('/');
    let mut patterns = filter.split('/').peekable();
    while let Some(pattern) = patterns.next() {
        if pattern == "#" {
            return patterns.peek().is_none();
        }
        match levels.next() {
            Some(level) if pattern == "+" || pattern == level => {}
            _ => return false,
        }
    }
    levels.next().is_none()
}

/// Fields of a command or response topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedTopic {
    pub sensor: String,
    pub resource: String,
    pub method: String,
    pub correlation_id: String,
}

/// Fields of an export topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTopic {
    pub sensor: String,
    pub export_name: String,
}

/// A decoded topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTopic {
    Command(AddressedTopic),
    Response(AddressedTopic),
    Export(ExportTopic),
}

impl ParsedTopic {
    pub fn family(&self) -> TopicFamily {
        match self {
            ParsedTopic::Command(_) => TopicFamily::Command,
            ParsedTopic::Response(_) => TopicFamily::Response,
            ParsedTopic::Export(_) => TopicFamily::Export,
        }
    }

    pub fn sensor(&self) -> &str {
        match self {
            ParsedTopic::Command(t) | ParsedTopic::Response(t) => &t.sensor,
            ParsedTopic::Export(t) => &t.sensor,
        }
    }
}

fn check_segment(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidTopic(format!("empty {} segment", name)));
    }
    if value.contains('/') {
        return Err(Error::InvalidTopic(format!(
            "{} segment '{}' contains '/'",
            name, value
        )));
    }
    Ok(())
}

/// Build `command/<target>/<resource>/<method>/<correlation_id>`.
pub fn encode_command_topic(
    target: &str,
    resource: Resource,
    method: Method,
    correlation_id: &str,
) -> Result<String> {
    check_segment("sensor", target)?;
    check_segment("correlation id", correlation_id)?;
    Ok(format!(
        "{}/{}/{}/{}/{}",
        TopicFamily::Command.name(),
        target,
        resource.as_str(),
        method.as_str(),
        correlation_id
    ))
}

/// Decode a raw topic as a member of `family`.
pub fn decode_topic(raw: &str, family: TopicFamily) -> Result<ParsedTopic> {
    let segments: Vec<&str> = raw.split('/').collect();
    if segments.len() != family.arity() {
        return Err(Error::InvalidArity {
            topic: raw.to_string(),
            expected: family.arity(),
            found: segments.len(),
        });
    }
    if segments[0] != family.name() {
        return Err(Error::InvalidTopic(format!(
            "'{}' is not a {} topic",
            raw, family
        )));
    }
    if let Some(position) = segments.iter().position(|s| s.is_empty()) {
        return Err(Error::InvalidTopic(format!(
            "'{}' has an empty segment at position {}",
            raw, position
        )));
    }

    let parsed = match family {
        TopicFamily::Export => ParsedTopic::Export(ExportTopic {
            sensor: segments[1].to_string(),
            export_name: segments[2].to_string(),
        }),
        TopicFamily::Command | TopicFamily::Response => {
            let addressed = AddressedTopic {
                sensor: segments[1].to_string(),
                resource: segments[2].to_string(),
                method: segments[3].to_string(),
                correlation_id: segments[4].to_string(),
            };
            if family == TopicFamily::Command {
                ParsedTopic::Command(addressed)
            } else {
                ParsedTopic::Response(addressed)
            }
        }
    };
    Ok(parsed)
}
