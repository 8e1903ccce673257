// Column comment metadata codec
//
// Hive has no place to store a caller's logical type or a default value, so both
// travel inside the native column comment as `ar_type=<type>[,ar_default=<literal>]`.
// The DDL generator writes this format and the schema reflector reads it back;
// both go through `ColumnComment` so the two sides cannot drift.

/// Comment key carrying the logical type
pub const TYPE_KEY: &str = "ar_type";
/// Comment key carrying the default literal
pub const DEFAULT_KEY: &str = "ar_default";

/// Decoded column comment metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnComment {
    pub logical_type: Option<String>,
    pub default: Option<String>,
}

impl ColumnComment {
    /// Encode as `ar_type=<type>[,ar_default=<literal>]`
    pub fn encode(&self) -> String {
        let mut pairs = Vec::with_capacity(2);
        if let Some(logical_type) = &self.logical_type {
            pairs.push(format!("{}={}", TYPE_KEY, escape(logical_type)));
        }
        if let Some(default) = &self.default {
            pairs.push(format!("{}={}", DEFAULT_KEY, escape(default)));
        }
        pairs.join(",")
    }

    /// Decode comment text.
    ///
    /// Unknown keys are ignored. Text that is not a comma-joined list of
    /// `key=value` pairs (including Hive's placeholder comments) decodes to
    /// empty metadata rather than an error.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let mut comment = ColumnComment::default();
        if text.is_empty() {
            return comment;
        }

        for pair in text.split(',') {
            let Some((key, value)) = pair.split_once('=') else {
                return ColumnComment::default();
            };
            let value = (!value.is_empty()).then(|| unescape(value));
            match key.trim() {
                TYPE_KEY => comment.logical_type = value,
                DEFAULT_KEY => comment.default = value,
                _ => {}
            }
        }

        comment
    }

    pub fn is_empty(&self) -> bool {
        self.logical_type.is_none() && self.default.is_none()
    }
}

impl std::fmt::Display for ColumnComment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Percent-encode everything but unreserved characters, so the value never
/// breaks the pair syntax, the SQL string literal or DESCRIBE's whitespace split
fn escape(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Decode percent escapes; text that does not decode to UTF-8 is kept as-is
fn unescape(value: &str) -> String {
    urlencoding::decode(value)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| value.to_string())
}
