//! Minimal parser for text exposition sample lines.
//!
//! Comment (`#`) and blank lines are skipped. Each remaining line is
//! `name[{label="value",...}] value [timestamp]`; the timestamp is ignored.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{MetricsError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSample {
    pub name: String,
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl ParsedSample {
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub fn parse_text(input: &str) -> Result<Vec<ParsedSample>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim_start();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            parse_line(line).map_err(|reason| MetricsError::InvalidExposition {
                line: i + 1,
                reason,
            })
        })
        .collect()
}

fn parse_line(line: &str) -> std::result::Result<ParsedSample, String> {
    let mut chars = line.trim().chars().peekable();

    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c == '{' || c.is_whitespace() {
            break;
        }
        name.push(c);
        chars.next();
    }
    if name.is_empty() {
        return Err("missing metric name".into());
    }

    let labels = if chars.peek() == Some(&'{') {
        chars.next();
        parse_labels(&mut chars)?
    } else {
        Vec::new()
    };

    let rest: String = chars.collect();
    let token = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| "missing value".to_string())?;
    let value = parse_value(token).ok_or_else(|| format!("bad value {token:?}"))?;

    Ok(ParsedSample {
        name,
        labels,
        value,
    })
}

fn parse_labels(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<Vec<(String, String)>, String> {
    let mut labels = Vec::new();
    loop {
        skip_spaces(chars);
        match chars.peek() {
            Some('}') => {
                chars.next();
                return Ok(labels);
            }
            Some(',') if !labels.is_empty() => {
                chars.next();
                continue;
            }
            None => return Err("unterminated label set".into()),
            _ => {}
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            key.push(c);
            chars.next();
        }
        skip_spaces(chars);
        if chars.next() != Some('=') {
            return Err(format!("expected '=' after label {key:?}"));
        }
        skip_spaces(chars);
        if chars.next() != Some('"') {
            return Err(format!("expected quoted value for label {key:?}"));
        }

        let mut value = String::new();
        loop {
            match chars.next() {
                Some('"') => break,
                Some('\\') => match chars.next() {
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some('n') => value.push('\n'),
                    other => return Err(format!("bad escape {other:?} in label {key:?}")),
                },
                Some(c) => value.push(c),
                None => return Err(format!("unterminated value for label {key:?}")),
            }
        }
        labels.push((key, value));
    }
}

fn skip_spaces(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn parse_value(token: &str) -> Option<f64> {
    match token {
        "+Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other => other.parse().ok(),
    }
}
