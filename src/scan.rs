//! Byte-level scanning helpers for Flux source.
//!
//! All delimiters the parser cares about are ASCII, so scanning bytes and
//! slicing at delimiter positions never splits a UTF-8 sequence.
//!
//! Two brace matchers live here. [`find_matching_brace`] understands
//! expression syntax (strings, template literals, comments) and is used for
//! `{...}` attribute values. [`find_block_end`] works over markup: it counts
//! braces in text like the rest of the editor always has, but steps over
//! whole tags so quotes, `>` and braces inside attribute values cannot shift
//! the depth.

/// `<` immediately followed by an ASCII letter.
pub fn is_tag_start(bytes: &[u8], i: usize) -> bool {
    bytes.get(i) == Some(&b'<') && bytes.get(i + 1).is_some_and(|b| b.is_ascii_alphabetic())
}

fn is_closing_tag_start(bytes: &[u8], i: usize) -> bool {
    bytes.get(i) == Some(&b'<')
        && bytes.get(i + 1) == Some(&b'/')
        && bytes.get(i + 2).is_some_and(|b| b.is_ascii_alphabetic())
}

/// Skip a `'...'` or `"..."` literal starting at `start`.
/// Returns the index just past the closing quote.
pub fn skip_string(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = *bytes.get(start)?;
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            c if c == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Skip a template literal, including nested `${ ... }` substitutions.
fn skip_template_literal(src: &str, start: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return Some(i + 1),
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                i = find_matching_brace(src, i + 1)? + 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Index of the `}` closing the expression brace at `open`.
///
/// String literals, template literals and comments are skipped, so
/// `{() => alert("}")}` resolves to its final brace.
pub fn find_matching_brace(src: &str, open: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i)?;
                continue;
            }
            b'`' => {
                i = skip_template_literal(src, i)?;
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = src[i + 2..].find("*/").map(|p| i + 2 + p + 2)?;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index just past the `>` that ends the tag opened at `lt`.
///
/// Works for opening, self-closing and closing tags. Quoted attribute
/// values and `{expression}` values are stepped over whole.
pub fn scan_tag_end(src: &str, lt: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut i = lt + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = skip_string(bytes, i)?,
            b'{' => i = find_matching_brace(src, i)? + 1,
            b'>' => return Some(i + 1),
            // A fresh tag before this one closed: treat as malformed.
            b'<' => return None,
            _ => i += 1,
        }
    }
    None
}

/// Index of the `}` closing the block brace at `open`, scanning markup.
///
/// Tags are skipped whole; braces everywhere else are counted as-is.
pub fn find_block_end(src: &str, open: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        if is_tag_start(bytes, i) || is_closing_tag_start(bytes, i) {
            if let Some(end) = scan_tag_end(src, i) {
                i = end;
                continue;
            }
        }
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// True when byte `pos` is markup text rather than part of a tag. Tags are
/// stepped over the same way [`find_block_end`] does.
pub fn is_outside_tags(src: &str, pos: usize) -> bool {
    let bytes = src.as_bytes();
    let mut i = 0;
    while i < pos {
        if is_tag_start(bytes, i) || is_closing_tag_start(bytes, i) {
            match scan_tag_end(src, i) {
                Some(end) if end > pos => return false,
                Some(end) => {
                    i = end;
                    continue;
                }
                None => {}
            }
        }
        i += 1;
    }
    true
}

/// Decode the character references the generator emits.
/// Unknown references are left untouched.
pub fn decode_entities(text: &str) -> String {
    const ENTITIES: [(&str, char); 7] = [
        ("&amp;", '&'),
        ("&quot;", '"'),
        ("&#39;", '\''),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&#123;", '{'),
        ("&#125;", '}'),
    ];
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matching_brace() {
        assert_eq!(find_matching_brace("{hello}", 0), Some(6));
        assert_eq!(find_matching_brace("{a + {b}}", 0), Some(8));
        assert_eq!(find_matching_brace("{'string with { brace'}", 0), Some(22));
        assert_eq!(find_matching_brace(r#"{() => { alert("}") }}"#, 0), Some(21));
        assert_eq!(find_matching_brace("{`a ${b} }`}", 0), Some(11));
        assert_eq!(find_matching_brace("{a /* } */ }", 0), Some(11));
        assert_eq!(find_matching_brace("{unclosed", 0), None);
        assert_eq!(find_matching_brace("x", 0), None);
    }

    #[test]
    fn test_scan_tag_end_steps_over_attribute_values() {
        let src = r#"<Button onClick={() => { go("}>") }} label="a > b">"#;
        assert_eq!(scan_tag_end(src, 0), Some(src.len()));
        assert_eq!(scan_tag_end("<br/>", 0), Some(5));
        assert_eq!(scan_tag_end("</div >", 0), Some(7));
        assert_eq!(scan_tag_end("<div <span>", 0), None);
    }

    #[test]
    fn test_block_end_ignores_braces_inside_tags() {
        let src = r#"{ <Text content="}" /> }"#;
        assert_eq!(find_block_end(src, 0), Some(src.len() - 1));

        let src = "{ style { .a { color: red; } } <div></div> } trailing";
        assert_eq!(find_block_end(src, 0), src.find(" trailing").map(|p| p - 1));
    }

    #[test]
    fn test_block_end_tolerates_apostrophes_in_text() {
        let src = "{ <Text>Don't stop</Text> }";
        assert_eq!(find_block_end(src, 0), Some(src.len() - 1));
    }

    #[test]
    fn test_block_end_unbalanced() {
        assert_eq!(find_block_end("{ <div> { </div>", 0), None);
    }

    #[test]
    fn test_is_outside_tags() {
        let src = r#"<Input placeholder="style {x}" /> style { }"#;
        assert!(!is_outside_tags(src, src.find("style {x}").unwrap()));
        assert!(is_outside_tags(src, src.rfind("style {").unwrap()));
        assert!(is_outside_tags(src, 0));

        let src = "<Text>a</Text> b";
        assert!(is_outside_tags(src, src.find('a').unwrap()));
        assert!(!is_outside_tags(src, src.find("/Text").unwrap()));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &amp;amp;"), "a <b> &amp;");
        assert_eq!(decode_entities("&#123;x&#125; &quot;&#39;"), "{x} \"'");
        assert_eq!(decode_entities("AT&T &copy;"), "AT&T &copy;");
        assert_eq!(decode_entities("plain"), "plain");
    }
}
