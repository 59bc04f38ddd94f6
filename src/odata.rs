//! Minimal fluent OData query builder.
//!
//! Covers the `$select` / `$expand` / `$filter` / `$top` / `$orderby`
//! surface the page operations need; this is not a general OData
//! implementation.

/// Chainable OData query options, rendered to query-string pairs.
#[derive(Debug, Clone, Default)]
pub struct ODataQuery {
    select: Vec<String>,
    expand: Vec<String>,
    filter: Option<String>,
    top: Option<i32>,
    order_by: Option<String>,
}

impl ODataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add fields to `$select`.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Add navigation properties to `$expand`.
    pub fn expand<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expand.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Set `$filter`.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set `$top`.
    pub fn top(mut self, top: i32) -> Self {
        self.top = Some(top);
        self
    }

    /// Set `$orderby`.
    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Render to owned query pairs for the executor.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if !self.select.is_empty() {
            pairs.push(("$select".to_string(), self.select.join(",")));
        }
        if !self.expand.is_empty() {
            pairs.push(("$expand".to_string(), self.expand.join(",")));
        }
        if let Some(ref f) = self.filter {
            pairs.push(("$filter".to_string(), f.clone()));
        }
        if let Some(t) = self.top {
            pairs.push(("$top".to_string(), t.to_string()));
        }
        if let Some(ref o) = self.order_by {
            pairs.push(("$orderby".to_string(), o.clone()));
        }
        pairs
    }

    /// Render as a `?`-prefixed query string, or empty when no options
    /// are set. Used for URLs embedded inside a `$batch` body, where the
    /// query must be part of the request line.
    pub fn to_query_string(&self) -> String {
        let pairs = self.to_pairs();
        if pairs.is_empty() {
            return String::new();
        }
        let joined = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{}", joined)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query() {
        let q = ODataQuery::new();
        assert!(q.to_pairs().is_empty());
        assert_eq!(q.to_query_string(), "");
    }

    #[test]
    fn test_select_and_expand() {
        let q = ODataQuery::new()
            .select(["UniqueId", "ParentList/Id"])
            .expand(["ParentList"]);
        assert_eq!(
            q.to_query_string(),
            "?$select=UniqueId,ParentList/Id&$expand=ParentList"
        );
    }

    #[test]
    fn test_chained_selects_accumulate() {
        let q = ODataQuery::new().select(["Id"]).select(["Url"]);
        assert_eq!(q.to_query_string(), "?$select=Id,Url");
    }

    #[test]
    fn test_filter_top_orderby() {
        let q = ODataQuery::new()
            .filter("PromotedState eq 2")
            .top(5)
            .order_by("Modified desc");
        let pairs = q.to_pairs();
        assert_eq!(pairs[0], ("$filter".into(), "PromotedState eq 2".into()));
        assert_eq!(pairs[1], ("$top".into(), "5".into()));
        assert_eq!(pairs[2], ("$orderby".into(), "Modified desc".into()));
    }
}
