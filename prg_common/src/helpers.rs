/// Reduces a payer tax id (CPF or CNPJ) to bare digits by stripping the usual
/// punctuation, e.g. `123.456.789-00` becomes `12345678900`.
pub fn normalize_tax_id(tax_id: &str) -> String {
    tax_id.chars().filter(|c| *c != '.' && *c != '-').collect()
}

/// Interprets an environment-style string as a boolean flag, falling back to
/// `default` when the value is absent or unrecognised.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => true,
        "0" | "false" | "no" | "n" | "off" => false,
        _ => default,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tax_id_punctuation_is_stripped() {
        assert_eq!(normalize_tax_id("123.456.789-00"), "12345678900");
        assert_eq!(normalize_tax_id("11.222.333/0001-81"), "11222333/000181");
        assert_eq!(normalize_tax_id("12345678900"), "12345678900");
        assert_eq!(normalize_tax_id(""), "");
    }

    #[test]
    fn boolean_flags() {
        assert!(parse_boolean_flag(Some("1".into()), false));
        assert!(parse_boolean_flag(Some("Yes".into()), false));
        assert!(!parse_boolean_flag(Some("off".into()), true));
        assert!(parse_boolean_flag(None, true));
        assert!(!parse_boolean_flag(Some("whatever".into()), false));
    }
}
