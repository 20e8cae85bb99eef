//! Table naming and partition value cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

/// Strips a surrounding function call: `to_date('2020-01-01')` -> `'2020-01-01'`.
static FUNCTION_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.*\((.*?)\)$").unwrap());

/// Derive a table name from a declared type name.
///
/// An underscore is inserted before each interior run of uppercase letters
/// and the result is lowercased: `PageView` -> `page_view`.
pub fn table_name(type_name: &str) -> String {
    let mut out = String::with_capacity(type_name.len() + 4);
    let mut prev_upper = false;
    for (i, ch) in type_name.chars().enumerate() {
        let upper = ch.is_ascii_uppercase();
        // The first character never belongs to a run.
        if upper && i > 0 && !prev_upper {
            out.push('_');
        }
        out.push(ch.to_ascii_lowercase());
        prev_upper = upper && i > 0;
    }
    out
}

/// Clean a partition value for use in paths and staging table names.
///
/// Unless `quoted`, single quotes are removed. Unless `dashed`, the
/// `{{ ds }}` / `{{ ts }}` macros are swapped for their no-dash variants.
pub fn cleanup_partition_value(value: &str, quoted: bool, dashed: bool) -> String {
    let mut cleaned = FUNCTION_CALL.replace(value, "$1").into_owned();
    if !quoted {
        cleaned = cleaned.replace('\'', "");
    }
    if !dashed {
        cleaned = cleaned
            .replace("{{ ds }}", "{{ ds_nodash }}")
            .replace("{{ ts }}", "{{ ts_nodash }}");
    }
    cleaned
}
