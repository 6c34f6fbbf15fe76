//! Redaction of configuration documents before they reach the log.

use std::sync::LazyLock;

use regex::Regex;

static PASSWORD_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^([ \t]*(?:-[ \t]+)?[\w.-]*password[\w.-]*[ \t]*:[ \t]*)\S.*$").expect("Invalid password regex")
});

const SECRETS_LINE: &str = "secrets:";
const HIDDEN_SECRETS: &str = "secrets: [HIDDEN]\n";

/// Collapse the top-level `secrets:` block to `secrets: [HIDDEN]`
pub fn hide_secrets(yaml: &str) -> String {
    if !yaml.lines().any(|line| line.starts_with(SECRETS_LINE)) {
        return yaml.to_string();
    }

    let mut hidden = String::with_capacity(yaml.len());
    let mut skipping = false;
    for line in yaml.split_inclusive('\n') {
        if line.starts_with(SECRETS_LINE) {
            hidden.push_str(HIDDEN_SECRETS);
            skipping = true;
            continue;
        }

        // block content is indented, a sequence item or blank
        if skipping && (line.starts_with([' ', '\t', '-']) || line.trim().is_empty()) {
            continue;
        }
        skipping = false;
        hidden.push_str(line);
    }
    hidden
}

/// Replace the value of every `*password*` key with `******`
pub fn mask_passwords(yaml: &str) -> String {
    PASSWORD_VALUE.replace_all(yaml, "${1}******").into_owned()
}

/// Both redactions, in the order they run before logging
pub fn redact(yaml: &str) -> String {
    mask_passwords(&hide_secrets(yaml))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hide_secrets() {
        let yaml = "secrets:\n  - name: secret1\n    value: abc123\n  - name: secret2\n    value: def456\n";
        assert_eq!(hide_secrets(yaml), "secrets: [HIDDEN]\n");
    }

    #[test]
    fn test_hide_secrets_keeps_other_keys() {
        let yaml = "metadata:\n  version: '2.5'\nsecrets:\n- name: s\n  value: abc\nhosts: []\n";
        assert_eq!(hide_secrets(yaml), "metadata:\n  version: '2.5'\nsecrets: [HIDDEN]\nhosts: []\n");
    }

    #[test]
    fn test_hide_secrets_no_secrets() {
        let yaml = "metadata:\n  version: '2.5'\nhosts:\n  - name: sut\n    mng_ip_address: 10.0.0.1\n";
        assert_eq!(hide_secrets(yaml), yaml);
    }

    #[test]
    fn test_mask_passwords() {
        let yaml = "connection_options:\n  username: root\n  password: abc\n  enable_password: \"x y\"\n";
        let masked = mask_passwords(yaml);
        assert!(!masked.contains("abc"));
        assert!(masked.contains("  password: ******"));
        assert!(masked.contains("  enable_password: ******"));
        assert!(masked.contains("username: root"));
    }

    #[test]
    fn test_mask_password_in_sequence() {
        assert_eq!(mask_passwords("- password: abc\n"), "- password: ******\n");
    }

    #[test]
    fn test_empty_password_untouched() {
        assert_eq!(mask_passwords("mng_password:\n"), "mng_password:\n");
    }
}
