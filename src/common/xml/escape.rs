use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::Event;

// Static initialization: automaton is built only once, thread-safe.
// A single left-to-right pass means an `&` produced by one replacement is
// never seen again, so ampersands are never double-escaped.
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

// Use LeftmostLongest to ensure longer entities are matched first (e.g., &amp; instead of &lt;)
static XML_UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
        .expect("Failed to build XML unescaper")
});

/// Escape XML special characters for use in text and attribute values.
///
/// # Examples
///
/// ```
/// use quince::common::xml::escape_xml;
/// assert_eq!(escape_xml("A & B < C"), "A &amp; B &lt; C");
/// assert_eq!(escape_xml("<tag>\"hello\"</tag>"), "&lt;tag&gt;&quot;hello&quot;&lt;/tag&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Unescape the five predefined XML entities.
///
/// Unknown or malformed entities are left unchanged.
///
/// ```
/// use quince::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("&amp;lt;"), "&lt;");
/// ```
#[inline]
pub fn unescape_xml(s: &str) -> String {
    XML_UNESCAPER.replace_all(s, &["&", "<", ">", "\"", "'"])
}

/// Check that an XML fragment is well formed and fits inside a part.
///
/// The fragment may contain several sibling elements and may use namespace
/// prefixes that are declared elsewhere in the final part. Declarations,
/// doctypes, processing instructions, entities other than the predefined
/// five and character data outside any element are rejected. Returns a
/// description of the first problem found.
pub fn check_well_formed(fragment: &str) -> std::result::Result<(), String> {
    let mut reader = Reader::from_str(fragment);
    reader.config_mut().check_end_names = true;

    let mut depth: usize = 0;
    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
            },
            Ok(Event::Text(text)) => {
                if depth == 0 && !text.iter().all(u8::is_ascii_whitespace) {
                    return Err(format!("character data outside an element at position {position}"));
                }
            },
            Ok(Event::CData(_)) if depth == 0 => {
                return Err(format!("CDATA outside an element at position {position}"));
            },
            Ok(Event::GeneralRef(entity)) => {
                if depth == 0 {
                    return Err(format!("entity outside an element at position {position}"));
                }
                if !is_known_reference(&entity) {
                    return Err(format!(
                        "undefined entity &{}; at position {position}",
                        String::from_utf8_lossy(&entity)
                    ));
                }
            },
            Ok(Event::Decl(_)) => {
                return Err(format!("XML declaration at position {position}"));
            },
            Ok(Event::DocType(_)) => {
                return Err(format!("DOCTYPE at position {position}"));
            },
            Ok(Event::PI(_)) => {
                return Err(format!("processing instruction at position {position}"));
            },
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(e) => {
                return Err(format!(
                    "{} at position {}",
                    e,
                    reader.error_position()
                ));
            },
        }
    }

    if depth != 0 {
        return Err(format!("{depth} unclosed element(s)"));
    }
    Ok(())
}

/// One of the five predefined entities, or a decimal or hex character
/// reference naming a valid `char`.
fn is_known_reference(name: &[u8]) -> bool {
    match name {
        b"amp" | b"lt" | b"gt" | b"quot" | b"apos" => true,
        [b'#', b'x' | b'X', hex @ ..] => std::str::from_utf8(hex)
            .ok()
            .and_then(|h| u32::from_str_radix(h, 16).ok())
            .and_then(char::from_u32)
            .is_some(),
        [b'#', dec @ ..] => std::str::from_utf8(dec)
            .ok()
            .and_then(|d| d.parse::<u32>().ok())
            .and_then(char::from_u32)
            .is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_ampersand_once() {
        assert_eq!(escape_xml("A & B < C"), "A &amp; B &lt; C");
        assert_eq!(escape_xml("&amp;"), "&amp;amp;");
        assert_eq!(escape_xml("it's"), "it&apos;s");
    }

    #[test]
    fn test_well_formed_fragments() {
        assert!(check_well_formed("<w:r><w:t>x</w:t></w:r>").is_ok());
        assert!(check_well_formed("<a/><b>text</b>").is_ok());
        assert!(check_well_formed("  <a/>\n").is_ok());
        assert!(check_well_formed("<t>&amp; &lt; &#65; &#x263A;</t>").is_ok());
        assert!(check_well_formed("<a/><!-- note --><b/>").is_ok());
    }

    #[test]
    fn test_fragments_that_cannot_sit_in_a_part() {
        assert!(check_well_formed("plain text").is_err());
        assert!(check_well_formed("<a/>tail").is_err());
        assert!(check_well_formed("<t>&bogus;</t>").is_err());
        assert!(check_well_formed("&bogus;").is_err());
        assert!(check_well_formed("&amp;").is_err());
        assert!(check_well_formed("<t>&#xD800;</t>").is_err());
        assert!(check_well_formed("<?xml version=\"1.0\"?><a/>").is_err());
        assert!(check_well_formed("<!DOCTYPE a><a/>").is_err());
        assert!(check_well_formed("<?mso-application progid=\"Word\"?><a/>").is_err());
        assert!(check_well_formed("<![CDATA[x]]>").is_err());
    }

    #[test]
    fn test_malformed_fragments() {
        assert!(check_well_formed("<w:r><w:t>x</w:r>").is_err());
        assert!(check_well_formed("<a>").is_err());
        assert!(check_well_formed("</a>").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_escape_roundtrip(s in ".*") {
            prop_assert_eq!(unescape_xml(&escape_xml(&s)), s);
        }

        #[test]
        fn prop_escaped_has_no_raw_markup(s in ".*") {
            let escaped = escape_xml(&s);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
        }
    }
}
