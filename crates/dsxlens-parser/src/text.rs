//! Text normalization helpers shared by the extractors

use crate::patterns::{
    BLOCK_COMMENT, INDENTED_LINE_BREAK, PARAM_PLACEHOLDER, SPACE_RUN, SQL_VERB, WHERE_CLAUSE,
    WHITESPACE,
};

/// Collapse every whitespace run to one space and trim
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Normalize a select statement: drop block comments, collapse whitespace
pub fn normalize_select(sql: &str) -> String {
    let uncommented = BLOCK_COMMENT.replace_all(sql, " ");
    collapse_whitespace(&uncommented)
}

/// Normalize a script fragment while keeping its line structure
///
/// Space runs become one space and continuation lines lose their indentation.
pub fn normalize_script(sql: &str) -> String {
    let spaced = SPACE_RUN.replace_all(sql, " ");
    INDENTED_LINE_BREAK.replace_all(&spaced, "\n").trim().to_string()
}

/// Whether the text contains a recognizable SQL verb
pub fn contains_sql_verb(sql: &str) -> bool {
    SQL_VERB.is_match(sql)
}

/// Predicate text of every `WHERE` clause
pub fn where_clauses(sql: &str) -> Vec<String> {
    WHERE_CLAUSE
        .captures_iter(sql)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|clause| !clause.is_empty())
        .collect()
}

/// Replace `#...#` parameter placeholders with `marker`
pub fn redact_placeholders(text: &str, marker: &str) -> String {
    PARAM_PLACEHOLDER.replace_all(text, marker).into_owned()
}

/// Decode the five predefined XML entities
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Split a pipe-delimited list, keeping empty positions
pub fn split_pipe_list(list: &str) -> Vec<&str> {
    list.split('|').collect()
}

/// Whether a list position holds a usable value (not empty, not the `" "` placeholder)
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Last segment of a `/` or `\` separated path
pub fn last_path_segment(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path).trim()
}

/// Byte range `[pos - len, pos)` clamped to the document and to char boundaries
pub fn window_before(text: &str, pos: usize, len: usize) -> &str {
    let mut start = pos.saturating_sub(len);
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..pos]
}

/// Byte range `[pos, pos + len)` clamped to the document and to char boundaries
pub fn window_after(text: &str, pos: usize, len: usize) -> &str {
    let mut end = (pos + len).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[pos..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_normalization() {
        let sql = "/* extract */\nSELECT *\n   FROM CUSTOMERS\n  WHERE STATUS = 'A'";
        assert_eq!(normalize_select(sql), "SELECT * FROM CUSTOMERS WHERE STATUS = 'A'");
    }

    #[test]
    fn script_normalization_keeps_lines() {
        let sql = "DELETE   FROM T\n      WHERE X = 1\n\t AND Y = 2";
        assert_eq!(normalize_script(sql), "DELETE FROM T\nWHERE X = 1\nAND Y = 2");
    }

    #[test]
    fn where_clause_extraction() {
        assert_eq!(
            where_clauses("SELECT * FROM CUSTOMERS WHERE STATUS = 'A'"),
            vec!["STATUS = 'A'".to_string()]
        );
        assert_eq!(
            where_clauses("select a from t where a > 1 group by a having count(*) > 1"),
            vec!["a > 1".to_string()]
        );
        assert_eq!(
            where_clauses("SELECT * FROM A WHERE X = 1 ORDER BY X"),
            vec!["X = 1".to_string()]
        );
        assert!(where_clauses("SELECT * FROM A").is_empty());
    }

    #[test]
    fn sql_verbs() {
        assert!(contains_sql_verb("truncate table x; insert into x select 1"));
        assert!(!contains_sql_verb("-- nothing to do"));
        assert!(!contains_sql_verb("SELECTED_ROWS"));
    }

    #[test]
    fn placeholder_redaction() {
        assert_eq!(
            redact_placeholders("#DB.host#:1521/#DB.service#", "[REDACTED]"),
            "[REDACTED]:1521/[REDACTED]"
        );
        assert_eq!(redact_placeholders("DWPROD", "[REDACTED]"), "DWPROD");
    }

    #[test]
    fn entities() {
        assert_eq!(decode_entities("a &lt; b &amp;&amp; c"), "a < b && c");
    }

    #[test]
    fn pipe_lists_keep_positions() {
        assert_eq!(split_pipe_list("|a||b"), vec!["", "a", "", "b"]);
        assert!(!is_present(" "));
        assert!(is_present("a"));
    }

    #[test]
    fn paths() {
        assert_eq!(last_path_segment("/data/out/customers.ds"), "customers.ds");
        assert_eq!(last_path_segment("C:\\data\\x.ds"), "x.ds");
        assert_eq!(last_path_segment("plain.ds"), "plain.ds");
    }

    #[test]
    fn windows_respect_char_boundaries() {
        let text = "ééé-abc";
        assert_eq!(window_before(text, text.len(), 4), "-abc");
        assert_eq!(window_before(text, 6, 3), "é");
        assert_eq!(window_after(text, 0, 3), "é");
        assert_eq!(window_after(text, 6, 100), "-abc");
    }
}
