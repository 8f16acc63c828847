//! Text chunk parsers (tEXt, iTXt)
//!
//! `tEXt` is `keyword \0 text`, both Latin-1. `iTXt` is
//! `keyword \0 flag method language \0 translated \0 text`; the fields are
//! located by the first four null bytes in the payload and nothing past
//! the fourth is rescanned. `zTXt` is routed here but not inflated, so it
//! contributes nothing.

use super::ChunkType;
use crate::{
    metadata::{InternationalText, TextMetadata, TextValue, RAW_DATA_KEY},
    primitives::{latin1, to_hex},
};
use log::{trace, warn};

/// Why a text chunk could not be interpreted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextParseIssue {
    /// A field that must be UTF-8 was not
    #[error("iTXt {field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },
}

/// Parse a text chunk payload into keyword entries
///
/// Missing separators are not an issue; the chunk just contributes no
/// entry. Tags other than `tEXt` and `iTXt` yield an empty mapping.
pub fn parse_text(chunk_type: ChunkType, data: &[u8]) -> Result<TextMetadata, TextParseIssue> {
    let mut entries = TextMetadata::new();

    match chunk_type {
        ChunkType::TEXT => {
            if let Some((keyword, value)) = parse_latin1_text(data) {
                entries.insert(keyword, TextValue::Plain(value));
            }
        }
        ChunkType::ITXT => {
            if let Some((keyword, value)) = parse_international_text(data)? {
                entries.insert(keyword, TextValue::International(value));
            }
        }
        other => trace!("No text interpretation for {other} chunk"),
    }

    Ok(entries)
}

/// Parse a text chunk, replacing the result with a raw-hex entry on failure
///
/// The fallback is all-or-nothing: a chunk never contributes both parsed
/// entries and the raw entry.
pub fn text_entries(chunk_type: ChunkType, data: &[u8]) -> TextMetadata {
    parse_text(chunk_type, data).unwrap_or_else(|issue| {
        warn!("Unreadable {chunk_type} chunk ({issue}); keeping raw bytes");
        TextMetadata::from([(RAW_DATA_KEY.to_string(), TextValue::Plain(to_hex(data)))])
    })
}

fn parse_latin1_text(data: &[u8]) -> Option<(String, String)> {
    let null = data.iter().position(|&b| b == 0)?;
    Some((latin1(&data[..null]), latin1(&data[null + 1..])))
}

fn parse_international_text(
    data: &[u8],
) -> Result<Option<(String, InternationalText)>, TextParseIssue> {
    let nulls: Vec<usize> = data
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == 0)
        .map(|(i, _)| i)
        .take(4)
        .collect();

    let &[keyword_end, lang_start, lang_end, translated_end] = nulls.as_slice() else {
        return Ok(None);
    };

    let keyword = latin1(&data[..keyword_end]);
    let compressed = data.get(keyword_end + 1).copied().unwrap_or(0) == 1;
    let language = latin1(&data[lang_start + 1..lang_end]);
    let translated_keyword = utf8(&data[lang_end + 1..translated_end], "translated keyword")?;

    let body = &data[translated_end + 1..];
    // Compressed text is kept as-is, byte for byte
    let text = if compressed {
        latin1(body)
    } else {
        utf8(body, "text")?
    };

    Ok(Some((
        keyword,
        InternationalText {
            text,
            language,
            translated_keyword,
            compressed,
        },
    )))
}

fn utf8(bytes: &[u8], field: &'static str) -> Result<String, TextParseIssue> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| TextParseIssue::InvalidUtf8 { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn itxt(entries: &TextMetadata, key: &str) -> InternationalText {
        entries[key].as_international().unwrap().clone()
    }

    #[test]
    fn test_text_chunk() {
        let entries = text_entries(ChunkType::TEXT, b"Author\0Jane");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["Author"], TextValue::Plain("Jane".into()));
    }

    #[test]
    fn test_text_chunk_latin1_and_embedded_nulls() {
        let entries = text_entries(ChunkType::TEXT, b"Comment\0caf\xe9\0more");
        assert_eq!(entries["Comment"].text(), "caf\u{e9}\u{0}more");
    }

    #[test]
    fn test_text_chunk_without_separator() {
        assert!(text_entries(ChunkType::TEXT, b"NoSeparator").is_empty());
        assert!(text_entries(ChunkType::TEXT, b"").is_empty());
    }

    #[test]
    fn test_itxt_four_nulls() {
        let entries = text_entries(ChunkType::ITXT, b"Title\0\0\0\0Hello");
        let value = itxt(&entries, "Title");
        assert_eq!(value.text, "Hello");
        assert_eq!(value.language, "");
        assert_eq!(value.translated_keyword, "");
        assert!(!value.compressed);
    }

    #[test]
    fn test_itxt_language_and_translation() {
        let entries = text_entries(ChunkType::ITXT, b"Title\0\x01\0en\0Titel\0compressed body");
        let value = itxt(&entries, "Title");
        assert!(value.compressed);
        assert_eq!(value.language, "en");
        assert_eq!(value.translated_keyword, "Titel");
        assert_eq!(value.text, "compressed body");
    }

    #[test]
    fn test_itxt_body_not_rescanned() {
        let entries = text_entries(ChunkType::ITXT, "Desc\0\0\0\0a\0b\0\u{e9}".as_bytes());
        assert_eq!(itxt(&entries, "Desc").text, "a\0b\0\u{e9}");
    }

    #[test]
    fn test_itxt_too_few_nulls() {
        assert!(text_entries(ChunkType::ITXT, b"Title\0\0en\0Hello").is_empty());
    }

    #[test]
    fn test_itxt_invalid_utf8_falls_back_to_raw() {
        let payload = b"Title\0\0\0\0\xff\xfe";
        let entries = text_entries(ChunkType::ITXT, payload);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[RAW_DATA_KEY].text(), to_hex(payload));
        assert!(matches!(
            parse_text(ChunkType::ITXT, payload),
            Err(TextParseIssue::InvalidUtf8 { field: "text" })
        ));
    }

    #[test]
    fn test_itxt_invalid_utf8_translated_keyword_falls_back_to_raw() {
        let payload = b"Title\0\0\0\xc3\0Hello";
        assert!(matches!(
            parse_text(ChunkType::ITXT, payload),
            Err(TextParseIssue::InvalidUtf8 {
                field: "translated keyword"
            })
        ));
        let entries = text_entries(ChunkType::ITXT, payload);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[RAW_DATA_KEY].text(), to_hex(payload));
    }

    #[test]
    fn test_itxt_flag_and_method_nulls_count_as_separators() {
        // Flag 0 and method 0 are the second and third nulls, so "en"
        // lands in the translated keyword and the body keeps its leading null
        let entries = text_entries(ChunkType::ITXT, b"Title\0\x00\0en\0\0Hello");
        let value = itxt(&entries, "Title");
        assert_eq!(value.language, "");
        assert_eq!(value.translated_keyword, "en");
        assert_eq!(value.text, "\0Hello");
        assert!(!value.compressed);
    }

    #[test]
    fn test_compressed_itxt_is_not_decoded() {
        let entries = text_entries(ChunkType::ITXT, b"Title\0\x01\0\0\0\x78\x9c\xff");
        let value = itxt(&entries, "Title");
        assert!(value.compressed);
        assert_eq!(value.text, "\u{78}\u{9c}\u{ff}");
    }

    #[test]
    fn test_ztxt_and_other_tags_contribute_nothing() {
        assert!(text_entries(ChunkType::ZTXT, b"Key\0\0\x78\x9c").is_empty());
        assert!(text_entries(ChunkType::TIME, b"Key\0Value").is_empty());
    }
}
