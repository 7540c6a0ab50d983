//! Stylesheet bundling, asset reference rewriting, and minification.

use std::collections::HashMap;

/// Concatenate stylesheet sources into a single bundle, in the order given.
pub fn bundle_styles(sources: &[String]) -> String {
    let mut bundle = String::new();
    for source in sources {
        bundle.push_str(source);
        if !source.ends_with('\n') {
            bundle.push('\n');
        }
    }
    bundle
}

/// Rewrite `url(...)` references whose file name matches a staged asset,
/// substituting the hashed output URL. References the pipeline did not
/// stage (data URIs, external hosts) are left untouched.
pub fn rewrite_asset_urls(css: &str, staged: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;

    while let Some(pos) = rest.find("url(") {
        let after = pos + "url(".len();
        out.push_str(&rest[..after]);
        rest = &rest[after..];

        let Some(end) = rest.find(')') else {
            break;
        };
        let reference = &rest[..end];

        match staged.get(reference_file_name(reference)) {
            Some(url) => out.push_str(url),
            None => out.push_str(reference),
        }
        out.push(')');
        rest = &rest[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Bare file name of a url() reference: quotes, directories, query, and
/// fragment stripped.
fn reference_file_name(reference: &str) -> &str {
    let trimmed = reference.trim().trim_matches(|c| c == '"' || c == '\'');
    let without_suffix = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
    without_suffix.rsplit('/').next().unwrap_or(without_suffix)
}

/// Minify CSS using lightningcss.
pub fn minify_css(css: &str) -> Result<String, String> {
    use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

    let stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| format!("CSS parse error: {}", e))?;

    let minified = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| format!("CSS minify error: {}", e))?;

    Ok(minified.code)
}
