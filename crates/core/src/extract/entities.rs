//! HTML entity decoding.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};

/// Character references as browsers read them, terminating `;` optional.
static CHAR_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+;?|#[xX][0-9a-fA-F]+;?|[^\t\n\f <&#;]{1,32};?)")
        .expect("character reference pattern is valid")
});

/// Named references that HTML accepts without a trailing `;`.
#[rustfmt::skip]
static LEGACY_ENTITIES: Lazy<HashMap<&'static str, char>> = Lazy::new(|| {
    [
        ("AElig", 'Æ'), ("AMP", '&'), ("Aacute", 'Á'), ("Acirc", 'Â'), ("Agrave", 'À'),
        ("Aring", 'Å'), ("Atilde", 'Ã'), ("Auml", 'Ä'), ("COPY", '©'), ("Ccedil", 'Ç'),
        ("ETH", 'Ð'), ("Eacute", 'É'), ("Ecirc", 'Ê'), ("Egrave", 'È'), ("Euml", 'Ë'),
        ("GT", '>'), ("Iacute", 'Í'), ("Icirc", 'Î'), ("Igrave", 'Ì'), ("Iuml", 'Ï'),
        ("LT", '<'), ("Ntilde", 'Ñ'), ("Oacute", 'Ó'), ("Ocirc", 'Ô'), ("Ograve", 'Ò'),
        ("Oslash", 'Ø'), ("Otilde", 'Õ'), ("Ouml", 'Ö'), ("QUOT", '"'), ("REG", '®'),
        ("THORN", 'Þ'), ("Uacute", 'Ú'), ("Ucirc", 'Û'), ("Ugrave", 'Ù'), ("Uuml", 'Ü'),
        ("Yacute", 'Ý'), ("aacute", 'á'), ("acirc", 'â'), ("acute", '´'), ("aelig", 'æ'),
        ("agrave", 'à'), ("amp", '&'), ("aring", 'å'), ("atilde", 'ã'), ("auml", 'ä'),
        ("brvbar", '¦'), ("ccedil", 'ç'), ("cedil", '¸'), ("cent", '¢'), ("copy", '©'),
        ("curren", '¤'), ("deg", '°'), ("divide", '÷'), ("eacute", 'é'), ("ecirc", 'ê'),
        ("egrave", 'è'), ("eth", 'ð'), ("euml", 'ë'), ("frac12", '½'), ("frac14", '¼'),
        ("frac34", '¾'), ("gt", '>'), ("iacute", 'í'), ("icirc", 'î'), ("iexcl", '¡'),
        ("igrave", 'ì'), ("iquest", '¿'), ("iuml", 'ï'), ("laquo", '«'), ("lt", '<'),
        ("macr", '¯'), ("micro", 'µ'), ("middot", '·'), ("nbsp", '\u{a0}'), ("not", '¬'),
        ("ntilde", 'ñ'), ("oacute", 'ó'), ("ocirc", 'ô'), ("ograve", 'ò'), ("ordf", 'ª'),
        ("ordm", 'º'), ("oslash", 'ø'), ("otilde", 'õ'), ("ouml", 'ö'), ("para", '¶'),
        ("plusmn", '±'), ("pound", '£'), ("quot", '"'), ("raquo", '»'), ("reg", '®'),
        ("sect", '§'), ("shy", '\u{ad}'), ("sup1", '¹'), ("sup2", '²'), ("sup3", '³'),
        ("szlig", 'ß'), ("thorn", 'þ'), ("times", '×'), ("uacute", 'ú'), ("ucirc", 'û'),
        ("ugrave", 'ù'), ("uml", '¨'), ("uuml", 'ü'), ("yacute", 'ý'), ("yen", '¥'),
        ("yuml", 'ÿ'),
    ]
    .into_iter()
    .collect()
});

/// Windows-1252 characters that numeric references in 0x80..=0x9F stand for.
#[rustfmt::skip]
const CP1252_C1: [Option<char>; 32] = [
    Some('€'), None, Some('‚'), Some('ƒ'), Some('„'), Some('…'), Some('†'), Some('‡'),
    Some('ˆ'), Some('‰'), Some('Š'), Some('‹'), Some('Œ'), None, Some('Ž'), None,
    None, Some('‘'), Some('’'), Some('“'), Some('”'), Some('•'), Some('–'), Some('\u{2014}'),
    Some('˜'), Some('™'), Some('š'), Some('›'), Some('œ'), None, Some('ž'), Some('Ÿ'),
];

/// Decode HTML entities until the text stops changing.
///
/// Decoding runs to a fixed point, so `decode_entities(decode_entities(s))`
/// equals `decode_entities(s)` at any escape depth. Every pass that changes
/// the text either removes an `&` or keeps the count and gets shorter, so
/// the loop ends.
pub fn decode_entities(text: &str) -> String {
    let mut current = text.to_string();

    loop {
        let decoded = decode_pass(&current);
        if decoded == current {
            return current;
        }
        current = decoded;
    }
}

fn decode_pass(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    CHAR_REF
        .replace_all(text, |caps: &Captures<'_>| {
            let reference = &caps[1];
            let resolved = match reference.strip_prefix('#') {
                Some(number) => Some(decode_numeric(number).to_string()),
                None => decode_named(&caps[0], reference),
            };
            resolved.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Legacy names first, then the full HTML5 table for `;`-terminated
/// references, then the longest legacy prefix.
fn decode_named(whole: &str, name: &str) -> Option<String> {
    if let Some(c) = LEGACY_ENTITIES.get(name.strip_suffix(';').unwrap_or(name)) {
        return Some(c.to_string());
    }

    if name.ends_with(';') {
        let decoded = html_escape::decode_html_entities(whole);
        if decoded != whole {
            return Some(decoded.into_owned());
        }
    }

    decode_legacy_prefix(name)
}

fn decode_numeric(reference: &str) -> char {
    let reference = reference.trim_end_matches(';');
    let parsed = match reference.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => reference.parse(),
    };

    match parsed {
        Ok(0) | Err(_) => char::REPLACEMENT_CHARACTER,
        Ok(code @ 0x80..=0x9F) => CP1252_C1[(code - 0x80) as usize]
            .or_else(|| char::from_u32(code))
            .unwrap_or(char::REPLACEMENT_CHARACTER),
        Ok(code) => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
    }
}

/// A legacy name running into following text: `eacutemon` is `é` + `mon`.
fn decode_legacy_prefix(name: &str) -> Option<String> {
    (1..name.len())
        .rev()
        .filter(|&end| name.is_char_boundary(end))
        .find_map(|end| {
            LEGACY_ENTITIES
                .get(&name[..end])
                .map(|c| format!("{}{}", c, &name[end..]))
        })
}
