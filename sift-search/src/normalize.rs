//! Text normalisation: flatten record attributes into searchable strings.
//!
//! Plain strings are used verbatim. Rich-text block trees are walked
//! depth-first and their text leaves joined with single spaces. Flattened
//! text is then clamped to the field's character limit.
//!
//! Transliteration produces a latinised, diacritic-free form for
//! cross-alphabet matching. Every output character remembers which source
//! character produced it, so matches found in transliterated text can be
//! highlighted in the original.

use serde_json::Value;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::FieldSpec;
use crate::error::NormalizeError;
use crate::types::Record;

/// One configured field of a record, flattened and truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedField {
    /// Attribute name.
    pub name: String,
    /// Searchable text.
    pub text: String,
    /// Additive weight from the field spec.
    pub weight: f64,
}

/// Transliterated concatenation of all fields of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    /// Latinised text, fields joined by single spaces.
    pub text: String,
    /// For each char of `text`: `(field index, char index in that field)`.
    /// Separators map to `None`.
    pub origins: Vec<Option<(usize, usize)>>,
}

impl Composite {
    /// Transliterate and join `fields`, tracking where each char came from.
    pub fn build(fields: &[NormalizedField]) -> Self {
        let mut text = String::new();
        let mut origins = Vec::new();
        for (field_idx, field) in fields.iter().enumerate() {
            if field_idx > 0 {
                text.push(' ');
                origins.push(None);
            }
            for (ch, char_idx) in transliterate_indexed(&field.text) {
                text.push(ch);
                origins.push(Some((field_idx, char_idx)));
            }
        }
        Self { text, origins }
    }
}

/// Ephemeral searchable view of a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    /// Flattened fields in field-spec order.
    pub fields: Vec<NormalizedField>,
    /// Present only when the collection transliterates.
    pub composite: Option<Composite>,
}

/// Flatten every configured field of `record`.
///
/// # Errors
///
/// Returns [`NormalizeError::MalformedRichText`] if a rich-text attribute
/// has an unexpected shape. Callers skip the record.
pub fn normalize_record(
    record: &Record,
    specs: &[FieldSpec],
    transliterate: bool,
) -> Result<NormalizedRecord, NormalizeError> {
    let fields = specs
        .iter()
        .map(|spec| {
            let flat = flatten_value(&spec.name, record.get(&spec.name))?;
            let text = match spec.character_limit {
                Some(limit) => truncate(&flat, limit).to_owned(),
                None => flat,
            };
            Ok(NormalizedField {
                name: spec.name.clone(),
                text,
                weight: spec.weight,
            })
        })
        .collect::<Result<Vec<_>, NormalizeError>>()?;

    let composite = transliterate.then(|| Composite::build(&fields));
    Ok(NormalizedRecord { fields, composite })
}

/// Flatten one attribute value into a plain string.
///
/// Missing and `null` values yield an empty string. Numbers and booleans
/// use their JSON text.
pub fn flatten_value(field: &str, value: Option<&Value>) -> Result<String, NormalizeError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(tree) => {
            let mut leaves = Vec::new();
            collect_leaves(field, tree, &mut leaves)?;
            Ok(leaves.join(" "))
        }
    }
}

fn collect_leaves<'a>(
    field: &str,
    node: &'a Value,
    leaves: &mut Vec<&'a str>,
) -> Result<(), NormalizeError> {
    match node {
        Value::Null => Ok(()),
        Value::Array(nodes) => nodes
            .iter()
            .try_for_each(|child| collect_leaves(field, child, leaves)),
        Value::Object(map) => {
            match map.get("text") {
                None | Some(Value::Null) => {}
                Some(Value::String(text)) if text.is_empty() => {}
                Some(Value::String(text)) => leaves.push(text),
                Some(_) => return Err(malformed(field, "text leaf is not a string")),
            }
            match map.get("children") {
                None | Some(Value::Null) => Ok(()),
                Some(children @ Value::Array(_)) => collect_leaves(field, children, leaves),
                Some(_) => Err(malformed(field, "children is not an array")),
            }
        }
        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
            Err(malformed(field, "expected a block node"))
        }
    }
}

fn malformed(field: &str, reason: &str) -> NormalizeError {
    NormalizeError::MalformedRichText {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
}

/// Clamp `text` to at most `limit` characters, never splitting a char.
pub fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Case-fold a single character to a single character.
///
/// Keeps a one-to-one mapping between source and folded characters, so
/// match positions stay valid indices into the original text.
pub fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Latinise `text`: lowercase, strip diacritics, map Cyrillic and Greek.
///
/// Pure and deterministic; `transliterate("Café") == "cafe"`.
pub fn transliterate(text: &str) -> String {
    transliterate_indexed(text).into_iter().map(|(c, _)| c).collect()
}

/// Like [`transliterate`], pairing each output char with its source char index.
pub fn transliterate_indexed(text: &str) -> Vec<(char, usize)> {
    let mut out = Vec::with_capacity(text.len());
    for (idx, ch) in text.chars().enumerate() {
        for decomposed in ch.to_lowercase().nfkd() {
            if is_combining_mark(decomposed) {
                continue;
            }
            match latin_for(decomposed) {
                Some(latin) => out.extend(latin.chars().map(|c| (c, idx))),
                None => out.push((decomposed, idx)),
            }
        }
    }
    out
}

fn latin_for(c: char) -> Option<&'static str> {
    let latin = match c {
        // Latin letters without a canonical decomposition.
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'ø' => "o",
        'đ' | 'ð' => "d",
        'ł' => "l",
        'þ' => "th",
        'ı' => "i",
        // Cyrillic (Russian, Ukrainian, Belarusian).
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'є' => "ye",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'і' => "i",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ў' => "w",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        // Greek.
        'α' => "a",
        'β' => "v",
        'γ' => "g",
        'δ' => "d",
        'ε' => "e",
        'ζ' => "z",
        'η' => "i",
        'θ' => "th",
        'ι' => "i",
        'κ' => "k",
        'λ' => "l",
        'μ' => "m",
        'ν' => "n",
        'ξ' => "x",
        'ο' => "o",
        'π' => "p",
        'ρ' => "r",
        'σ' | 'ς' => "s",
        'τ' => "t",
        'υ' => "y",
        'φ' => "f",
        'χ' => "ch",
        'ψ' => "ps",
        'ω' => "o",
        _ => return None,
    };
    Some(latin)
}
