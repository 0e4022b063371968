/// Mask the middle of a sensitive value for logging, keeping the first and
/// last two characters: `supersecret` becomes `suxxxxxxxxxet`.
///
/// Values shorter than four characters are returned unchanged.
pub fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 4 {
        return value.to_string();
    }

    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}xxxxxxxxx{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_middle() {
        assert_eq!(mask_value("supersecret"), "suxxxxxxxxxet");
    }

    #[test]
    fn short_values_pass_through() {
        assert_eq!(mask_value(""), "");
        assert_eq!(mask_value("abc"), "abc");
        assert_eq!(mask_value("abcd"), "abxxxxxxxxxcd");
    }
}
