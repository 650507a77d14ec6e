use std::borrow::Cow;
use std::fmt::Write;

use bytes::{Bytes, BytesMut};

use crate::collector::FamilySnapshot;
use crate::metric::Sample;

/// Content type for the `/metrics` response.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render every family: HELP, TYPE, then one line per sample.
pub fn encode_text<I>(families: I) -> Bytes
where
    I: IntoIterator<Item = FamilySnapshot>,
{
    let mut out = BytesMut::new();
    for family in families {
        write_family(&mut out, &family);
    }
    out.freeze()
}

/// Append one family to `out`.
pub fn write_family<W: Write>(out: &mut W, family: &FamilySnapshot) {
    let _ = writeln!(out, "# HELP {} {}", family.name, escape_help(&family.help));
    let _ = writeln!(out, "# TYPE {} {}", family.name, family.kind.as_str());
    for sample in &family.samples {
        write_sample(out, sample);
    }
}

fn write_sample<W: Write>(out: &mut W, sample: &Sample) {
    let _ = out.write_str(&sample.name);
    if !sample.labels.is_empty() {
        let _ = out.write_char('{');
        for (i, (k, v)) in sample.labels.iter().enumerate() {
            if i > 0 {
                let _ = out.write_char(',');
            }
            let _ = write!(out, "{}=\"{}\"", k, escape_label_value(v));
        }
        let _ = out.write_char('}');
    }
    let _ = writeln!(out, " {}", format_value(sample.value));
}

/// Escape `\`, `"` and newline in a label value.
pub fn escape_label_value(v: &str) -> Cow<'_, str> {
    if !v.contains(['\\', '"', '\n']) {
        return Cow::Borrowed(v);
    }
    Cow::Owned(
        v.replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n"),
    )
}

/// Escape `\` and newline in help text (quotes stay as they are).
pub fn escape_help(v: &str) -> Cow<'_, str> {
    if !v.contains(['\\', '\n']) {
        return Cow::Borrowed(v);
    }
    Cow::Owned(v.replace('\\', "\\\\").replace('\n', "\\n"))
}

/// Locale-independent number rendering: `3`, `0.25`, `+Inf`, `-Inf`, `NaN`.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{v}")
    }
}
