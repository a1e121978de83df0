use std::sync::OnceLock;

fn annotation_re() -> &'static regex::Regex {
    static ANNOTATION_RE: OnceLock<regex::Regex> = OnceLock::new();
    ANNOTATION_RE.get_or_init(|| regex::Regex::new(r"^\(\d+\) ").expect("valid annotation regex"))
}

/// Drop a leading `(N) ` unread marker, if any.
pub fn strip_annotation(title: &str) -> &str {
    match annotation_re().find(title) {
        Some(m) => &title[m.end()..],
        None => title,
    }
}

/// Title to display for `unread` messages. The marker is only shown while
/// the window is in the background.
pub fn annotate(title: &str, unread: u64, focused: bool) -> String {
    let base = strip_annotation(title);
    if unread > 0 && !focused {
        format!("({unread}) {base}")
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfocused_with_unread_gets_prefix() {
        assert_eq!(annotate("Inbox", 3, false), "(3) Inbox");
    }

    #[test]
    fn existing_prefix_is_replaced_not_stacked() {
        assert_eq!(annotate("(3) Inbox", 7, false), "(7) Inbox");
    }

    #[test]
    fn zero_unread_clears_prefix() {
        assert_eq!(annotate("(3) Inbox", 0, false), "Inbox");
    }

    #[test]
    fn focused_window_never_shows_prefix() {
        assert_eq!(annotate("(3) Inbox", 5, true), "Inbox");
    }

    #[test]
    fn strip_only_touches_leading_marker() {
        assert_eq!(strip_annotation("Room (2) Inbox"), "Room (2) Inbox");
        assert_eq!(strip_annotation("(12) (2) Inbox"), "(2) Inbox");
        assert_eq!(strip_annotation("(x) Inbox"), "(x) Inbox");
        assert_eq!(strip_annotation("(4)Inbox"), "(4)Inbox");
    }
}
