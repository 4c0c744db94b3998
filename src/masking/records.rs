// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Line-level view of a delimited file: sentinel handling, field splitting
//! and rendering back to text with the original line endings.

use crate::error::{MaskError, Result};

pub const DEFAULT_DELIMITER: char = '|';

/// Which physical lines are header/footer sentinels rather than data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentinelMode {
    #[default]
    None,
    FirstLine,
    LastLine,
    Both,
}

impl SentinelMode {
    /// Accepts the `NF` / `NL` / `NFL` codes, plus `NONE` (or an empty
    /// string) for files without sentinels.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" | "N" => Ok(SentinelMode::None),
            "NF" => Ok(SentinelMode::FirstLine),
            "NL" => Ok(SentinelMode::LastLine),
            "NFL" => Ok(SentinelMode::Both),
            other => Err(MaskError::configuration(format!(
                "invalid ignore_lines value '{other}' (expected NF, NL, NFL or NONE)"
            ))),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            SentinelMode::None => "NONE",
            SentinelMode::FirstLine => "NF",
            SentinelMode::LastLine => "NL",
            SentinelMode::Both => "NFL",
        }
    }

    fn keeps_first(self) -> bool {
        matches!(self, SentinelMode::FirstLine | SentinelMode::Both)
    }

    fn keeps_last(self) -> bool {
        matches!(self, SentinelMode::LastLine | SentinelMode::Both)
    }
}

/// A file split into optional sentinels and the data rows between them.
/// Each line keeps its own terminator so mixed `\n` / `\r\n` files render
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    pub head: Option<String>,
    pub rows: Vec<String>,
    pub tail: Option<String>,
    head_ending: &'static str,
    tail_ending: &'static str,
    /// One per original row; rows appended later use `default_ending`.
    row_endings: Vec<&'static str>,
    default_ending: &'static str,
    /// Terminator of the last physical line, empty when the file has none.
    final_ending: &'static str,
}

fn split_line(piece: &str) -> (String, &'static str) {
    if let Some(line) = piece.strip_suffix("\r\n") {
        (line.to_string(), "\r\n")
    } else if let Some(line) = piece.strip_suffix('\n') {
        (line.to_string(), "\n")
    } else {
        (piece.to_string(), "")
    }
}

impl RecordSet {
    pub fn split(text: &str, mode: SentinelMode) -> Self {
        let mut lines: Vec<(String, &'static str)> =
            text.split_inclusive('\n').map(split_line).collect();
        let final_ending = lines.last().map(|(_, ending)| *ending).unwrap_or("");

        let (head, head_ending) = if mode.keeps_first() && !lines.is_empty() {
            let (line, ending) = lines.remove(0);
            (Some(line), ending)
        } else {
            (None, "")
        };
        let (tail, tail_ending) = match lines.pop() {
            Some((line, ending)) if mode.keeps_last() => (Some(line), ending),
            Some(line) => {
                lines.push(line);
                (None, "")
            }
            None => (None, ""),
        };

        let default_ending = lines
            .iter()
            .map(|(_, ending)| *ending)
            .chain([head_ending, tail_ending])
            .find(|ending| !ending.is_empty())
            .unwrap_or("\n");
        let (rows, row_endings): (Vec<String>, Vec<&'static str>) = lines.into_iter().unzip();

        Self {
            head,
            rows,
            tail,
            head_ending,
            tail_ending,
            row_endings,
            default_ending,
            final_ending,
        }
    }

    /// One-based physical line number of data row `idx`.
    pub fn line_number(&self, idx: usize) -> usize {
        idx + 1 + usize::from(self.head.is_some())
    }

    pub fn sentinel_count(&self) -> usize {
        usize::from(self.head.is_some()) + usize::from(self.tail.is_some())
    }

    pub fn render(&self) -> String {
        let rows = self.rows.iter().enumerate().map(|(idx, row)| {
            let ending = self
                .row_endings
                .get(idx)
                .copied()
                .unwrap_or(self.default_ending);
            (row.as_str(), ending)
        });
        let lines: Vec<(&str, &str)> = self
            .head
            .as_deref()
            .map(|head| (head, self.head_ending))
            .into_iter()
            .chain(rows)
            .chain(self.tail.as_deref().map(|tail| (tail, self.tail_ending)))
            .collect();

        let last = lines.len().saturating_sub(1);
        let mut out = String::new();
        for (idx, (line, ending)) in lines.into_iter().enumerate() {
            out.push_str(line);
            if idx == last {
                out.push_str(self.final_ending);
            } else if ending.is_empty() {
                out.push_str(self.default_ending);
            } else {
                out.push_str(ending);
            }
        }
        out
    }
}

pub fn split_fields(row: &str, delimiter: char) -> Vec<String> {
    row.split(delimiter).map(str::to_string).collect()
}

pub fn join_fields(fields: &[String], delimiter: char) -> String {
    let mut buf = [0u8; 4];
    fields.join(&*delimiter.encode_utf8(&mut buf))
}

/// Parse a delimiter override. Accepts a literal character, `PIPE`, `TAB`,
/// `COMMA`, or a hex escape like `\x1f` / `0x1f`.
pub fn parse_delimiter(value: &str) -> Result<char> {
    if value.is_empty() {
        return Err(MaskError::configuration("delimiter cannot be empty"));
    }
    match value.to_ascii_uppercase().as_str() {
        "PIPE" => return Ok('|'),
        "TAB" => return Ok('\t'),
        "COMMA" => return Ok(','),
        _ => {}
    }
    if let Some(hex) = value.strip_prefix("\\x").or_else(|| value.strip_prefix("0x")) {
        let code = u32::from_str_radix(hex, 16).map_err(|_| {
            MaskError::configuration(format!("invalid delimiter hex value: {value}"))
        })?;
        return char::from_u32(code).ok_or_else(|| {
            MaskError::configuration(format!("delimiter code {value} is not valid Unicode"))
        });
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch != '\n' && ch != '\r' => Ok(ch),
        _ => Err(MaskError::configuration(
            "delimiter must be a single character or hex code like \\x1f",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_codes_round_trip() {
        for code in ["NF", "NL", "NFL", "NONE"] {
            assert_eq!(SentinelMode::parse(code).unwrap().code(), code);
        }
        assert_eq!(SentinelMode::parse("nfl").unwrap(), SentinelMode::Both);
        assert!(SentinelMode::parse("NX").is_err());
    }

    #[test]
    fn split_strips_requested_sentinels() {
        let text = "HDR\na|1\nb|2\nTRL\n";
        let both = RecordSet::split(text, SentinelMode::Both);
        assert_eq!(both.head.as_deref(), Some("HDR"));
        assert_eq!(both.tail.as_deref(), Some("TRL"));
        assert_eq!(both.rows, vec!["a|1", "b|2"]);
        assert_eq!(both.line_number(0), 2);
        assert_eq!(both.sentinel_count(), 2);

        let none = RecordSet::split(text, SentinelMode::None);
        assert_eq!(none.rows.len(), 4);
        assert_eq!(none.line_number(0), 1);

        let last = RecordSet::split(text, SentinelMode::LastLine);
        assert_eq!(last.head, None);
        assert_eq!(last.tail.as_deref(), Some("TRL"));
    }

    #[test]
    fn render_is_byte_identical_when_untouched() {
        for text in [
            "HDR\r\na|1\r\nb|2\r\n",
            "a|1\nb|2",
            "a|1\n\nb|2\n",
            "HDR\r\na|1\nb|2\nTRL\r\n",
            "a|1\r\nb|2\nc|3",
            "",
            "only\n",
        ] {
            for mode in [
                SentinelMode::None,
                SentinelMode::FirstLine,
                SentinelMode::LastLine,
                SentinelMode::Both,
            ] {
                assert_eq!(RecordSet::split(text, mode).render(), text, "{text:?} {mode:?}");
            }
        }
    }

    #[test]
    fn mixed_line_endings_keep_every_row() {
        let text = "HDR\r\na|X\nb|X\nc|X\r\n";
        let set = RecordSet::split(text, SentinelMode::FirstLine);
        assert_eq!(set.head.as_deref(), Some("HDR"));
        assert_eq!(set.rows, vec!["a|X", "b|X", "c|X"]);
        assert_eq!(set.render(), text);
    }

    #[test]
    fn appended_rows_get_a_terminator() {
        let mut set = RecordSet::split("a|1\r\nb|2", SentinelMode::None);
        set.rows.push("c|3".to_string());
        assert_eq!(set.render(), "a|1\r\nb|2\r\nc|3");

        let mut set = RecordSet::split("H\na|1\nT\n", SentinelMode::Both);
        set.rows.push("b|2".to_string());
        assert_eq!(set.render(), "H\na|1\nb|2\nT\n");
    }

    #[test]
    fn single_line_with_both_sentinels_becomes_head() {
        let set = RecordSet::split("only\n", SentinelMode::Both);
        assert_eq!(set.head.as_deref(), Some("only"));
        assert_eq!(set.tail, None);
        assert!(set.rows.is_empty());
    }

    #[test]
    fn fields_split_and_join_on_any_char() {
        let fields = split_fields("a\u{1f}b\u{1f}", '\u{1f}');
        assert_eq!(fields, vec!["a", "b", ""]);
        assert_eq!(join_fields(&fields, '\u{1f}'), "a\u{1f}b\u{1f}");
    }

    #[test]
    fn parse_delimiter_variants() {
        assert_eq!(parse_delimiter("|").unwrap(), '|');
        assert_eq!(parse_delimiter("pipe").unwrap(), '|');
        assert_eq!(parse_delimiter("TAB").unwrap(), '\t');
        assert_eq!(parse_delimiter("\\x1f").unwrap(), '\u{1f}');
        assert_eq!(parse_delimiter("0x2C").unwrap(), ',');
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("||").is_err());
        assert!(parse_delimiter("\\xZZ").is_err());
    }
}
