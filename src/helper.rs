//! Small text helpers shared by the command-line front end.

/// First non-empty line of `content`, cut to `max_chars` characters.
pub fn content_preview(content: &str, max_chars: usize) -> String {
    let first_line = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

/// Template written to the temporary file opened in the user's editor.
pub fn editor_template(title: &str, existing: &str) -> String {
    let mut template = String::new();
    template.push_str("<!--\n");
    if !title.is_empty() {
        template.push_str(&format!("Note: {}\n", title));
    }
    template.push_str("Write your note content below. Markdown is supported.\n");
    template.push_str("Lines between <!-- and --> are ignored. Save and exit when done.\n");
    template.push_str("-->\n");
    template.push_str(existing);
    template
}

/// Strips the comment block written by [`editor_template`].
pub fn process_editor_content(content: &str) -> String {
    let mut in_comment = false;
    let mut kept = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if in_comment {
            if trimmed.ends_with("-->") {
                in_comment = false;
            }
            continue;
        }
        if trimmed.starts_with("<!--") {
            in_comment = !trimmed.ends_with("-->");
            continue;
        }
        kept.push(line);
    }

    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_takes_first_non_empty_line() {
        assert_eq!(content_preview("\n\n  hello world \nmore", 100), "hello world");
        assert_eq!(content_preview("", 10), "");
    }

    #[test]
    fn preview_cuts_on_char_boundaries() {
        assert_eq!(content_preview("héllo wörld", 4), "héll...");
    }

    #[test]
    fn editor_comments_are_removed() {
        let written = format!(
            "{}Buy milk\n<!-- inline note -->\nand eggs\n",
            editor_template("Groceries", "")
        );
        assert_eq!(process_editor_content(&written), "Buy milk\nand eggs");
    }

    #[test]
    fn existing_content_is_kept_after_template() {
        let written = editor_template("", "old body");
        assert_eq!(process_editor_content(&written), "old body");
    }
}
