//! Company code generation.
//!
//! `slugify` turns a display name into a lowercase, hyphen-separated,
//! URL-safe identifier: `"Apple Inc."` becomes `"apple-inc"`. It performs no
//! uniqueness check; two names that fold to the same slug collide at insert.

/// Derive a slug from an arbitrary display name.
///
/// ASCII letters and digits are kept (lowercased), common Latin diacritics are
/// folded to their base letter, and every other run of characters becomes a
/// single `-`. The result never starts or ends with `-` and may be empty.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.chars() {
        let folded = if ch.is_ascii_alphanumeric() {
            None
        } else if let Some(base) = fold_diacritic(ch) {
            Some(base)
        } else {
            pending_separator = true;
            continue;
        };

        if pending_separator && !out.is_empty() {
            out.push('-');
        }
        pending_separator = false;

        match folded {
            Some(base) => out.push_str(base),
            None => out.push(ch.to_ascii_lowercase()),
        }
    }

    out
}

fn fold_diacritic(ch: char) -> Option<&'static str> {
    let base = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "a",
        'æ' | 'Æ' => "ae",
        'ç' | 'Ç' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ñ' | 'Ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "o",
        'œ' | 'Œ' => "oe",
        'ß' => "ss",
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        _ => return None,
    };
    Some(base)
}
