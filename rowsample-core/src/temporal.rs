//! Conversion of temporal values to epoch milliseconds
//!
//! Date columns may declare a format pattern either in `strftime` syntax
//! (anything containing `%`) or in the host's letter syntax such as
//! `yyyy-MM-dd HH:mm:ss.SSS`. Letter patterns are translated to `strftime`
//! once per column when a [`DateParser`] is built.

use chrono::{NaiveDate, NaiveDateTime};

use crate::value::FieldValue;

const ISO_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses temporal field values of one column into epoch milliseconds
#[derive(Debug, Clone)]
pub struct DateParser {
    /// Pattern as declared, kept for error messages
    declared: Option<String>,

    /// Translated `strftime` pattern; `None` when the declared pattern
    /// could not be translated
    strftime: Option<String>,
}

impl DateParser {
    /// Build a parser for a declared format pattern
    pub fn new(declared: Option<&str>) -> Self {
        let strftime = match declared {
            None => None,
            Some(p) if p.contains('%') => Some(p.to_string()),
            Some(p) => translate_pattern(p),
        };

        Self {
            declared: declared.map(str::to_string),
            strftime,
        }
    }

    /// Describe the format for diagnostics
    pub fn describe(&self) -> &str {
        self.declared.as_deref().unwrap_or("ISO-8601")
    }

    /// Convert a field value to milliseconds since the UNIX epoch.
    ///
    /// Dates convert directly, integers and numbers are taken to be epoch
    /// milliseconds already, strings are parsed with the column format.
    /// Returns `None` if the value cannot be read as a date.
    pub fn epoch_millis(&self, value: &FieldValue) -> Option<f64> {
        match value {
            FieldValue::Date(dt) => Some(to_millis(dt)),
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Number(n) => Some(*n),
            FieldValue::String(s) => self.parse(s.trim()).map(|dt| to_millis(&dt)),
            FieldValue::Boolean(_) | FieldValue::Null => None,
        }
    }

    fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        match (&self.declared, &self.strftime) {
            (Some(_), Some(fmt)) => parse_with(text, fmt),
            (Some(_), None) => None,
            (None, _) => ISO_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .or_else(|| parse_with(text, ISO_DATE_FORMAT)),
        }
    }
}

fn parse_with(text: &str, fmt: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, fmt).ok().or_else(|| {
        NaiveDate::parse_from_str(text, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

fn to_millis(dt: &NaiveDateTime) -> f64 {
    dt.and_utc().timestamp_millis() as f64
}

/// Translate a letter pattern (`yyyy-MM-dd`) into `strftime` syntax.
///
/// Returns `None` for letters with no `strftime` counterpart.
pub fn translate_pattern(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // quoted literal; '' is an escaped quote
            i += 1;
            if i < chars.len() && chars[i] == '\'' {
                out.push('\'');
                i += 1;
                continue;
            }
            while i < chars.len() {
                if chars[i] == '\'' {
                    if i + 1 < chars.len() && chars[i + 1] == '\'' {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        let directive = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1 | 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', _) => "%d",
            ('H', _) => "%H",
            ('h', _) => "%I",
            ('m', _) => "%M",
            ('s', _) => "%S",
            // fraction after a dot takes any number of digits
            ('S', _) if out.ends_with('.') => {
                out.pop();
                "%.f"
            }
            ('S', _) => "%3f",
            ('a', _) => "%p",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('Z', _) => "%z",
            ('X', _) => "%:z",
            _ => return None,
        };
        out.push_str(directive);
        i += run;
    }

    Some(out)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
