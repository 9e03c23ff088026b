use crate::settings::SensitiveWords;

/// Format a float as a yuan amount with thousands separators: ¥1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-¥{with_commas}.{dec_part}")
    } else {
        format!("¥{with_commas}.{dec_part}")
    }
}

/// Replace configured sensitive words in displayed text. Display-layer only:
/// stored ledger values are never rewritten.
pub fn redact(text: &str, words: &SensitiveWords) -> String {
    let mut out = text.to_string();
    for (word, replacement) in words {
        out = out.replace(word.as_str(), replacement);
    }
    out
}
