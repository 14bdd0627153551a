/// Derives a URL slug: lowercase ASCII alphanumerics joined by single dashes.
pub fn derive_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Lowercased, trimmed form used for title comparisons.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_slug() {
        assert_eq!(derive_slug("Hello, World!"), "hello-world");
        assert_eq!(derive_slug("  --Rust   & Go: 2024 edition--  "), "rust-go-2024-edition");
        assert_eq!(derive_slug("Café au lait"), "caf-au-lait");
        assert_eq!(derive_slug("!!!"), "");
    }

    #[test]
    fn test_derive_slug_is_idempotent() {
        for title in ["The Future of AI", "a--b__c", "  10 Tips: Budget Travel  ", "x"] {
            let once = derive_slug(title);
            assert_eq!(derive_slug(&once), once);
            assert!(!once.starts_with('-') && !once.ends_with('-'));
            assert!(!once.contains("--"));
        }
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("a b  c\n\nd"), 4);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  padded  "), 1);
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  The Big IDEA "), "the big idea");
    }
}
