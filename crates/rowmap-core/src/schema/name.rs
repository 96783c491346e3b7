use heck::{ToSnakeCase, ToUpperCamelCase};

/// A model or field name, split into words.
///
/// Words break on `_` and on camel-case boundaries, and keep their original
/// case so that case-sensitive matching stays possible.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Name {
    raw: String,
    pub parts: Vec<String>,
}

impl Name {
    pub fn new(src: &str) -> Name {
        Name {
            raw: src.to_string(),
            parts: split_words(src)
                .into_iter()
                .map(|(start, end)| src[start..end].to_string())
                .collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn snake_case(&self) -> String {
        self.raw.to_snake_case()
    }

    pub fn upper_camel_case(&self) -> String {
        self.raw.to_upper_camel_case()
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Byte spans of the words of `src`.
///
/// `_` separates words and is dropped. An upper-case letter following a
/// lower-case letter or digit starts a new word, as does the last capital of
/// an acronym followed by a lower-case letter (`HTTPServer` is `HTTP`,
/// `Server`).
pub(crate) fn split_words(src: &str) -> Vec<(usize, usize)> {
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let mut words = vec![];
    let mut start: Option<usize> = None;

    for (i, &(offset, ch)) in chars.iter().enumerate() {
        if ch == '_' {
            if let Some(s) = start.take() {
                words.push((s, offset));
            }
            continue;
        }

        if let Some(s) = start {
            let prev = chars[i - 1].1;
            let next = chars.get(i + 1).map(|(_, c)| *c);

            let boundary = ch.is_uppercase()
                && (prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next.is_some_and(|n| n.is_lowercase())));

            if boundary {
                words.push((s, offset));
                start = Some(offset);
            }
        } else {
            start = Some(offset);
        }
    }

    if let Some(s) = start {
        words.push((s, src.len()));
    }

    words
}
