use std::collections::BTreeMap;

use super::DEFAULT_API_BASE;

pub const DEFAULT_TITLE: &str = "Feedback";

/// Turn a hyphenated attribute name into a camelCase parameter name.
///
/// Every `-` directly followed by an ASCII lowercase letter is dropped and the
/// letter uppercased: `api-base` becomes `apiBase`. Any other hyphen stays.
pub fn normalize_attribute(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '-' {
            if let Some(next) = chars.peek().copied().filter(char::is_ascii_lowercase) {
                out.push(next.to_ascii_uppercase());
                chars.next();
                continue;
            }
        }
        out.push(c);
    }

    out
}

/// An API base is usable when it is a relative reference or an `http(s)` URL.
/// Anything carrying another scheme (`javascript:`, `data:`, ...) is refused,
/// as is any whitespace or control character browsers would strip first.
pub fn is_safe_api_base(value: &str) -> bool {
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    let lower = value.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return true;
    }

    // A colon before the first path, query or fragment delimiter is a scheme.
    let head = value.split(['/', '?', '#']).next().unwrap_or_default();
    !head.contains(':')
}

/// Widget parameters derived from a host element's attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetProps {
    params: BTreeMap<String, String>,
}

impl WidgetProps {
    pub fn from_attributes<I, K, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params: BTreeMap<String, String> = attributes
            .into_iter()
            .map(|(name, value)| (normalize_attribute(name.as_ref()), value.into()))
            .collect();

        if params
            .get("apiBase")
            .is_none_or(|base| base.is_empty() || !is_safe_api_base(base))
        {
            params.insert("apiBase".to_string(), DEFAULT_API_BASE.to_string());
        }

        Self { params }
    }

    pub fn api_base(&self) -> &str {
        self.params
            .get("apiBase")
            .map(String::as_str)
            .unwrap_or(DEFAULT_API_BASE)
    }

    pub fn title(&self) -> &str {
        self.params
            .get("title")
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for WidgetProps {
    fn default() -> Self {
        Self::from_attributes(std::iter::empty::<(&str, &str)>())
    }
}
