/// Cache key layout
///
/// Every argument that changes the remote result is part of the key. The API
/// credential is not: any valid key yields the same data, so entries survive
/// credential changes and quota resets.
///
/// - `search`: search:{keyword}|{region or GLOBAL}
/// - `trending`: trending:{category_id}|{region}
/// - `videos`: videos:{id},{id},...
/// - `channels`: channels:{id},{id},...
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: &'static str,
    args: Vec<String>,
}

impl CacheKey {
    pub fn new(operation: &'static str, args: Vec<String>) -> Self {
        Self { operation, args }
    }

    pub fn search(keyword: &str, region: Option<&str>) -> Self {
        Self::new(
            "search",
            vec![keyword.to_string(), region.unwrap_or(crate::regions::GLOBAL).to_string()],
        )
    }

    pub fn trending(category_id: &str, region: &str) -> Self {
        Self::new("trending", vec![category_id.to_string(), region.to_string()])
    }

    /// Ordered batch of video ids; a different order is a different key
    pub fn videos(ids: &[String]) -> Self {
        Self::new("videos", vec![ids.join(",")])
    }

    pub fn channels(ids: &[String]) -> Self {
        Self::new("channels", vec![ids.join(",")])
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Flat string form for logs and string-keyed stores
    pub fn encode(&self) -> String {
        format!("{}:{}", self.operation, self.args.join("|"))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_key_encoding() {
        let key = CacheKey::search("minecraft", Some("KR"));
        assert_eq!(key.encode(), "search:minecraft|KR");

        let global = CacheKey::search("minecraft", None);
        assert_eq!(global.encode(), "search:minecraft|GLOBAL");
        assert_ne!(key, global);
    }

    #[test]
    fn test_trending_key_encoding() {
        let key = CacheKey::trending("10", "US");
        assert_eq!(key.operation(), "trending");
        assert_eq!(key.args(), ["10".to_string(), "US".to_string()]);
        assert_eq!(key.to_string(), "trending:10|US");
    }

    #[test]
    fn test_batch_keys_respect_order() {
        let ab = vec!["a".to_string(), "b".to_string()];
        let ba = vec!["b".to_string(), "a".to_string()];

        assert_eq!(CacheKey::videos(&ab).encode(), "videos:a,b");
        assert_ne!(CacheKey::videos(&ab), CacheKey::videos(&ba));
        assert_ne!(CacheKey::videos(&ab), CacheKey::channels(&ab));
    }
}
