//! Ordered query-string parameters.

use url::Url;

/// The query-string parameters of a collection request.
///
/// Keeps insertion order so the emitted URL is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Returns the first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Iterates over the parameters in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the parameter keys in emission order.
    pub fn keys(&self) -> Vec<&str> {
        self.pairs.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Appends the parameters to `url`'s query string, URL-encoded.
    pub fn apply_to(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            return;
        }
        url.query_pairs_mut().extend_pairs(self.iter());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_encodes() {
        let mut params = QueryParams::new();
        params.push("page", "1");
        params.push("filter[name]", "a&b c");

        let mut url = Url::parse("https://api.example.com/customers/").unwrap();
        params.apply_to(&mut url);

        assert_eq!(
            url.as_str(),
            "https://api.example.com/customers/?page=1&filter%5Bname%5D=a%26b+c"
        );
    }

    #[test]
    fn test_apply_empty_leaves_url_untouched() {
        let mut url = Url::parse("https://api.example.com/leads/").unwrap();
        QueryParams::new().apply_to(&mut url);
        assert_eq!(url.as_str(), "https://api.example.com/leads/");
    }

    #[test]
    fn test_get_and_contains() {
        let mut params = QueryParams::new();
        params.push("sort", "name");
        assert_eq!(params.get("sort"), Some("name"));
        assert!(!params.contains("order"));
        assert_eq!(params.len(), 1);
    }
}
