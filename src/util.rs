/// `en` or `en-US` style tag.
pub(crate) fn language_tag(language: &str, variant: &str) -> String {
    if variant.is_empty() {
        language.to_string()
    } else {
        format!("{}-{}", language, variant)
    }
}

/// Masks the `/api/{key}/` path segment so URLs can be logged and put into
/// error messages.
pub(crate) fn redact_key(url: &str, key: &str) -> String {
    if key.is_empty() {
        return url.to_string();
    }
    url.replacen(&format!("/api/{key}/"), "/api/***/", 1)
}
