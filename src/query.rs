use crate::types::{QuoteError, Result};
use reqwest::Url;

/// Multi-valued query parameters.
///
/// Keys are emitted in sorted order, values for the same key in insertion
/// order. Adding a key twice sends it twice; some upstream flags rely on that.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value for `key`, keeping any earlier values
    pub fn add(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.to_string(), value.into()));
        self
    }

    /// All values recorded for `key`, in insertion order
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    fn sorted(&self) -> Vec<&(String, String)> {
        let mut sorted: Vec<&(String, String)> = self.pairs.iter().collect();
        // stable: equal keys keep insertion order
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        sorted
    }

    /// Attach the parameters to `base`, replacing any query it already has
    pub fn to_url(&self, base: &str) -> Result<Url> {
        let mut url = Url::parse(base)
            .map_err(|e| QuoteError::ConfigError(format!("Invalid base url {}: {}", base, e)))?;

        url.set_query(None);
        if !self.pairs.is_empty() {
            let mut serializer = url.query_pairs_mut();
            for (key, value) in self.sorted() {
                serializer.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_sorted_values_ordered() {
        let mut params = QueryParams::new();
        params
            .add("sellToken", "0xa")
            .add("skipValidation", "false")
            .add("buyToken", "0xb")
            .add("skipValidation", "true");

        let url = params.to_url("https://api.example.org/swap/v1/price").unwrap();
        assert_eq!(
            url.query(),
            Some("buyToken=0xb&sellToken=0xa&skipValidation=false&skipValidation=true")
        );
        assert_eq!(params.get_all("skipValidation"), vec!["false", "true"]);
    }

    #[test]
    fn test_values_are_form_encoded() {
        let mut params = QueryParams::new();
        params.add("referrer", "a b&c");

        let url = params.to_url("https://api.example.org/x").unwrap();
        assert_eq!(url.query(), Some("referrer=a+b%26c"));
    }

    #[test]
    fn test_empty_params_leave_no_query() {
        let url = QueryParams::new().to_url("https://api.example.org/137/tokens").unwrap();
        assert_eq!(url.as_str(), "https://api.example.org/137/tokens");
    }

    #[test]
    fn test_invalid_base() {
        let err = QueryParams::new().to_url("not a url").unwrap_err();
        assert!(matches!(err, QuoteError::ConfigError(_)));
    }
}
