//! Number formatting for rewritten words

/// Fixed-point text with trailing zeros removed: `10.500` -> `10.5`,
/// `10.000` -> `10`. Negative zero prints as `0`.
pub fn format_number(value: f64, places: u8) -> String {
    let text = format!("{:.*}", usize::from(places), value);
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}

/// Like [`format_number`] with an explicit sign: `+10`, `-2.5`
pub fn format_signed(value: f64, places: u8) -> String {
    let text = format_number(value, places);
    if text.starts_with('-') {
        text
    } else {
        format!("+{}", text)
    }
}

/// Strip leading zeros from a code number: `01` -> `1`, `05.1` -> `5.1`
pub fn compact_code(text: &str) -> String {
    let (int, frac) = match text.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (text, None),
    };
    let int = int.trim_start_matches('0');
    let int = if int.is_empty() { "0" } else { int };
    match frac {
        Some(frac) => format!("{}.{}", int, frac),
        None => int.to_string(),
    }
}

/// Trim trailing fractional zeros from value text, keeping the decimal
/// point when `keep_point` is set: `10.500` -> `10.5`, `10.000` -> `10.`
/// or `10`, `0.50` -> `.5`
pub fn compact_value(text: &str, keep_point: bool) -> String {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.strip_prefix('+').unwrap_or(text)),
    };
    let Some((int, frac)) = digits.split_once('.') else {
        let int = digits.trim_start_matches('0');
        let int = if int.is_empty() { "0" } else { int };
        let point = if keep_point { "." } else { "" };
        return format!("{}{}{}", sign, int, point);
    };

    let int = int.trim_start_matches('0');
    let frac = frac.trim_end_matches('0');
    let body = match (int.is_empty(), frac.is_empty()) {
        (true, true) => {
            if keep_point {
                "0.".to_string()
            } else {
                "0".to_string()
            }
        }
        (true, false) => format!(".{}", frac),
        (false, true) => {
            if keep_point {
                format!("{}.", int)
            } else {
                int.to_string()
            }
        }
        (false, false) => format!("{}.{}", int, frac),
    };
    if body == "0" || body == "0." {
        body
    } else {
        format!("{}{}", sign, body)
    }
}

/// Add a decimal point to integer value text: `10` -> `10.`
pub fn with_decimal_point(text: &str) -> String {
    if text.contains('.') {
        text.to_string()
    } else {
        format!("{}.", text)
    }
}
