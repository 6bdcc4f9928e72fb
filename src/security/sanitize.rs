//! Strip injection payloads from free-text input before it reaches the
//! business rules. Parameterised SQL stays the real protection.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Keys whose values are never rewritten.
pub const EXEMPT_FIELDS: &[&str] = &[
    "password",
    "password_confirmation",
    "current_password",
    "new_password",
    "_token",
    "_method",
];

static CONTROL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").unwrap());

static SQL_LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)--.*$").unwrap());
static SQL_BLOCK_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static SEMICOLON_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r";+").unwrap());

static SQL_KEYWORDS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bUNION\s+SELECT\b",
        r"(?i)\bOR\s+1\s*=\s*1\b",
        r"(?i)\bDROP\s+TABLE\b",
        r"(?i)\bDROP\s+DATABASE\b",
        // only when a word follows the parenthesis
        r"(?i)\bEXEC\s*\(\b",
        r"(?i)\bEXECUTE\s*\(\b",
        r"(?i)\bSCRIPT\s*>",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static XSS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)<script\b[^>]*>.*?</script>",
        r"(?i)javascript:",
        r"(?i)vbscript:",
        r"(?i)data:text/html",
        r"(?i)\bon\w+\s*=",
        r"(?is)<iframe\b[^>]*>.*?</iframe>",
        r"(?is)<object\b[^>]*>.*?</object>",
        r"(?is)<embed\b[^>]*>",
        r#"(?i)<meta\b[^>]*http-equiv=["']?refresh["']?[^>]*>"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SHELL_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(cat|ls|rm|mv|cp|chmod|chown|curl|wget|nc|bash|sh|python|perl|ruby)\b")
        .unwrap()
});

const SHELL_SEPARATORS: &[&str] = &["&&", "||", "|", ";", "`", "$", "$(", "${"];

/// Clean one string value.
pub fn sanitize_str(value: &str) -> String {
    let value = value.replace('\0', "");
    let value = CONTROL_CHARS.replace_all(&value, "");
    let value = value.trim();

    let value = strip_sql(value);
    let value = strip_xss(&value);
    strip_shell(value)
}

fn strip_sql(value: &str) -> String {
    let mut out = SQL_LINE_COMMENT.replace_all(value, "").into_owned();
    out = SQL_BLOCK_COMMENT.replace_all(&out, "").into_owned();
    out = SEMICOLON_RUNS.replace_all(&out, ";").into_owned();
    for re in SQL_KEYWORDS.iter() {
        out = re.replace_all(&out, "").into_owned();
    }
    out
}

fn strip_xss(value: &str) -> String {
    let mut out = value.to_string();
    for re in XSS_PATTERNS.iter() {
        out = re.replace_all(&out, "").into_owned();
    }
    out
}

/// Separators go only when the text also names a shell command.
fn strip_shell(mut value: String) -> String {
    for sep in SHELL_SEPARATORS {
        if value.contains(sep) && SHELL_COMMAND.is_match(&value) {
            value = value.replace(sep, "");
        }
    }
    value
}

/// Walk a JSON document and sanitise every string, leaving exempt keys alone.
pub fn sanitize_value(value: &mut Value) {
    match value {
        Value::String(s) => *s = sanitize_str(s),
        Value::Array(items) => items.iter_mut().for_each(sanitize_value),
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if !EXEMPT_FIELDS.contains(&key.as_str()) {
                    sanitize_value(v);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn control_characters_and_padding_are_removed() {
        assert_eq!(sanitize_str("  Dinas\0 Kes\x07ehatan \n"), "Dinas Kesehatan");
        assert_eq!(sanitize_str("line1\nline2\tx"), "line1\nline2\tx");
    }

    #[test]
    fn sql_payloads_are_stripped() {
        assert_eq!(sanitize_str("admin' OR 1=1 -- x"), "admin'  ");
        assert_eq!(sanitize_str("a /* hidden */b"), "a b");
        assert_eq!(sanitize_str("1 UNION SELECT password"), "1  password");
        assert_eq!(sanitize_str("x;;;y"), "x;y");
    }

    #[test]
    fn exec_calls_need_an_argument() {
        assert_eq!(sanitize_str("EXEC(xp_cmdshell)"), "xp_cmdshell)");
        assert_eq!(sanitize_str("execute (sp_who)"), "sp_who)");
        assert_eq!(sanitize_str("exec( 1)"), "exec( 1)");
        assert_eq!(sanitize_str("Exec()"), "Exec()");
    }

    #[test]
    fn xss_payloads_are_stripped() {
        // the SQL pass already breaks bare script tags apart
        assert_eq!(sanitize_str("<script>alert(1)</script>Halo"), "<alert(1)</Halo");
        assert_eq!(sanitize_str("<iframe src=x></iframe>ok"), "ok");
        assert_eq!(sanitize_str("<a href=\"javascript:go()\">x</a>"), "<a href=\"go()\">x</a>");
        assert_eq!(sanitize_str("<img src=x onerror=alert(1)>"), "<img src=x alert(1)>");
    }

    #[test]
    fn shell_separators_only_go_with_commands() {
        assert_eq!(sanitize_str("PT Maju & Jaya | Cabang"), "PT Maju & Jaya | Cabang");
        assert_eq!(sanitize_str("x && rm -rf /"), "x  rm -rf /");
    }

    #[test]
    fn exempt_keys_keep_their_values() {
        let mut doc = json!({
            "name": "<script>x</script>Budi",
            "password": "p@ss;; -- word",
            "tags": ["ok", "javascript:void(0)"],
            "nested": { "note": "a /* b */ c" }
        });
        sanitize_value(&mut doc);
        assert!(!doc["name"].as_str().unwrap().contains("<script"));
        assert_eq!(doc["password"], "p@ss;; -- word");
        assert_eq!(doc["tags"][1], "void(0)");
        assert_eq!(doc["nested"]["note"], "a  c");
    }
}
