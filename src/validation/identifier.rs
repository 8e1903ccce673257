use std::borrow::Cow;

/// Quote a Hive identifier with backticks when it is not a plain name.
///
/// Plain names (ASCII letters, digits and underscores, not starting with a
/// digit) are returned as-is, so generated statements read like hand-written
/// HiveQL and DESCRIBE reports the same name back.
pub fn quote_identifier(name: &str) -> Cow<'_, str> {
    if is_plain_identifier(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("`{}`", name.replace('`', "``")))
    }
}

/// Quote a possibly database-qualified table name (`db.table`)
pub fn quote_table_name(name: &str) -> Cow<'_, str> {
    match name.split_once('.') {
        Some((database, table)) if !database.is_empty() && !table.is_empty() => Cow::Owned(format!(
            "{}.{}",
            quote_identifier(database),
            quote_identifier(table)
        )),
        _ => quote_identifier(name),
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
