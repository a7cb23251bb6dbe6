//! Text serialization of a timeline plus verse content, and its inverse.
//!
//! The report is the only persistence mechanism in the system: a user
//! exports it, edits timings or text by hand, and re-imports it. The codec
//! is therefore tolerant on input (extra, reordered or unknown blocks are
//! accepted) and canonical on output.

use std::collections::BTreeMap;

use crate::{content::model::Verse, timeline::store::Timeline};

/// Fixed first line of every report.
pub const REPORT_BANNER: &str = "ZAMAN DAMGASI RAPORU";
/// Divider emitted after the title line.
const REPORT_DIVIDER: &str = "--------------------------";
/// Placeholder for verses missing from the current verse list.
const MISSING_TEXT: &str = "Metin bulunamadı";
/// Message emitted instead of a report when the timeline is empty.
const EMPTY_TIMELINE_MESSAGE: &str = "Bu okuyucu için zaman damgası verisi bulunamadı.";

const PREFIX_PRIMARY: &str = "Arapça: ";
const PREFIX_TRANSLITERATION: &str = "Okunuş: ";
const PREFIX_TRANSLATION: &str = "Meal: ";

/// One parsed report block.
///
/// Body fields are `None` when the corresponding line was absent, so the
/// apply path can distinguish "not present in the report" from "present and
/// empty".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportBlock {
    /// Verse key from the block header. Not validated against any verse
    /// list here; unknown keys (liturgical inserts and other sentinels) are
    /// checked at apply time.
    pub verse_key: String,
    /// Start bound in milliseconds.
    pub timestamp_from: u64,
    /// End bound in milliseconds.
    pub timestamp_to: u64,
    /// `Arapça:` line content.
    pub primary_text: Option<String>,
    /// `Okunuş:` line content.
    pub transliteration: Option<String>,
    /// `Meal:` line content.
    pub translation: Option<String>,
}

/// Serialize the timeline plus verse content into the canonical report.
///
/// Blocks are sorted by `timestamp_from`. The transliteration line prefers
/// the override map over the verse's built-in transliteration and is
/// omitted when both are absent; the translation line is emitted with
/// inline footnote markers stripped and omitted when empty.
pub fn generate(
    timeline: &Timeline,
    verses: &[Verse],
    overrides: &BTreeMap<String, String>,
    title: &str,
) -> String {
    if timeline.is_empty() {
        return EMPTY_TIMELINE_MESSAGE.to_string();
    }

    let mut report = format!("{REPORT_BANNER}\n{title}\n{REPORT_DIVIDER}\n");

    let mut sorted: Vec<_> = timeline.segments().to_vec();
    sorted.sort_by_key(|s| s.timestamp_from);

    for seg in &sorted {
        let verse = verses.iter().find(|v| v.verse_key == seg.verse_key);
        let primary = verse.map(|v| v.primary_text.as_str()).unwrap_or(MISSING_TEXT);
        let transliteration = overrides
            .get(&seg.verse_key)
            .map(String::as_str)
            .or_else(|| verse.and_then(|v| v.transliteration_text.as_deref()))
            .filter(|t| !t.is_empty());
        let translation = verse
            .map(|v| strip_footnotes(&v.translation_text))
            .filter(|t| !t.is_empty());

        report.push_str(&format!(
            "[{} -> {}] {}\n",
            format_timestamp(seg.timestamp_from),
            format_timestamp(seg.timestamp_to),
            seg.verse_key
        ));
        report.push_str(&format!("{PREFIX_PRIMARY}{primary}\n"));
        if let Some(t) = transliteration {
            report.push_str(&format!("{PREFIX_TRANSLITERATION}{t}\n"));
        }
        if let Some(t) = translation {
            report.push_str(&format!("{PREFIX_TRANSLATION}{t}\n"));
        }
        report.push('\n');
    }

    report
}

/// Parse an edited report back into blocks.
///
/// Line-oriented state machine: a line matching the strict header pattern
/// `[mm:ss.mmm -> mm:ss.mmm] <key>` opens a new block and emits the
/// previous open one; within a block, body lines are matched by literal
/// prefix and everything else is ignored; EOF flushes the last open block.
pub fn parse(text: &str) -> Vec<ReportBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<ReportBlock> = None;

    for raw in text.lines() {
        let line = raw.trim_end_matches('\r');
        if let Some((from, to, key)) = parse_header(line) {
            if let Some(done) = open.take() {
                blocks.push(done);
            }
            open = Some(ReportBlock {
                verse_key: key,
                timestamp_from: from,
                timestamp_to: to,
                primary_text: None,
                transliteration: None,
                translation: None,
            });
            continue;
        }

        let Some(block) = open.as_mut() else {
            continue;
        };
        if let Some(rest) = line.strip_prefix(PREFIX_TRANSLITERATION) {
            block.transliteration = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix(PREFIX_TRANSLATION) {
            block.translation = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix(PREFIX_PRIMARY) {
            block.primary_text = Some(rest.to_string());
        }
    }

    if let Some(done) = open.take() {
        blocks.push(done);
    }
    blocks
}

/// Remove inline footnote markers (`<sup …>…</sup>` spans) from
/// translation text. Unterminated spans are left as-is.
pub fn strip_footnotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<sup") {
        let Some(end) = rest[start..].find("</sup>") else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &rest[start + end + "</sup>".len()..];
    }
    out.push_str(rest);
    out
}

/// Format milliseconds as `mm:ss.mmm` (minutes zero-padded to at least two
/// digits and allowed to exceed two).
pub(crate) fn format_timestamp(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let mins = total_seconds / 60;
    let secs = total_seconds % 60;
    let millis = ms % 1000;
    format!("{mins:02}:{secs:02}.{millis:03}")
}

/// Parse a `[mm:ss.mmm -> mm:ss.mmm] <key>` header line.
fn parse_header(line: &str) -> Option<(u64, u64, String)> {
    let rest = line.strip_prefix('[')?;
    let (range, key) = rest.split_once(']')?;
    let (from_s, to_s) = range.split_once(" -> ")?;
    let from = parse_timestamp(from_s.trim())?;
    let to = parse_timestamp(to_s.trim())?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((from, to, key.to_string()))
}

/// Parse `mm:ss.mmm` into milliseconds as `(mm*60+ss)*1000+mmm`.
fn parse_timestamp(s: &str) -> Option<u64> {
    let (mins, rest) = s.split_once(':')?;
    let (secs, millis) = rest.split_once('.')?;
    if mins.is_empty() || secs.len() != 2 || millis.len() != 3 {
        return None;
    }
    let mins: u64 = mins.parse().ok()?;
    let secs: u64 = secs.parse().ok()?;
    let millis: u64 = millis.parse().ok()?;
    if secs >= 60 {
        return None;
    }
    Some((mins * 60 + secs) * 1000 + millis)
}

#[cfg(test)]
#[path = "../../tests/unit/report/codec.rs"]
mod tests;
