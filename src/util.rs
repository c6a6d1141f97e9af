//! Small helpers used only at logging call sites.
//!
//! The real masking utility is an external collaborator (spec.md §1); this
//! is a minimal stand-in so printer ids aren't logged in full.

/// Masks all but the first and last two characters of an id for logging.
pub fn mask_id(id: &str) -> String {
    let len = id.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }
    let chars: Vec<char> = id.chars().collect();
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[len - 2..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(len - 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_middle_of_long_id() {
        assert_eq!(mask_id("printer-0001"), "pr********01");
    }

    #[test]
    fn masks_short_id_entirely() {
        assert_eq!(mask_id("abcd"), "****");
        assert_eq!(mask_id("ab"), "**");
    }
}
