use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

/// Only common image extensions are accepted for avatars.
pub(crate) fn is_image_file_name(name: &str) -> bool {
    lazy_static! {
        static ref IMAGE_RE: Regex = Regex::new(r"(?i)\.(jpg|jpeg|png|gif)$").unwrap();
    }
    IMAGE_RE.is_match(name)
}

/// `<millis>-<original name>`, with any client-supplied directories dropped.
pub(crate) fn avatar_key(uploaded_at_millis: i128, original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("avatar");
    format!("{uploaded_at_millis}-{base}")
}

/// Emails are matched case-insensitively and without surrounding blanks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extensions_are_accepted_case_insensitively() {
        for name in ["me.jpg", "me.JPEG", "cat.png", "anim.Gif", "a.b.jpeg"] {
            assert!(is_image_file_name(name), "{name}");
        }
    }

    #[test]
    fn other_files_are_rejected() {
        for name in ["me.bmp", "script.js", "png", "me.png.exe", ""] {
            assert!(!is_image_file_name(name), "{name}");
        }
    }

    #[test]
    fn avatar_key_strips_directories() {
        assert_eq!(avatar_key(1700000000000, "me.png"), "1700000000000-me.png");
        assert_eq!(avatar_key(5, "../../etc/evil.png"), "5-evil.png");
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }
}
