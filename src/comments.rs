//! Comments and likes on the list item behind a page.
//!
//! [`Commentable`] is the capability trait: anything that can name the
//! list item carrying its comment stream gets the full comment surface
//! through [`Comments`], which binds that item URL to an executor once
//! and exposes the per-comment operations.

use crate::client::HttpExecutor;
use crate::error::SharePointResult;
use crate::pages::ClientsidePage;
use crate::types::{CommentInfo, LikedByInformation};
use log::debug;
use serde_json::{json, Value};
use std::future::Future;

/// A resource whose comments live on a SharePoint list item.
pub trait Commentable {
    /// Absolute URL of the list item whose comment stream backs this
    /// resource.
    fn comment_item_url<E: HttpExecutor + Sync>(
        &self,
        executor: &E,
    ) -> impl Future<Output = SharePointResult<String>> + Send;
}

impl Commentable for ClientsidePage {
    fn comment_item_url<E: HttpExecutor + Sync>(
        &self,
        executor: &E,
    ) -> impl Future<Output = SharePointResult<String>> + Send {
        self.item_url(executor)
    }
}

/// Collection responses arrive as `{"value": [...]}` at the minimal
/// metadata level, or as a bare array from older endpoints.
fn unwrap_collection(v: Value) -> Value {
    match v {
        Value::Object(mut o) => o.remove("value").unwrap_or(Value::Array(Vec::new())),
        arr @ Value::Array(_) => arr,
        _ => Value::Array(Vec::new()),
    }
}

/// The comment surface of one commentable resource.
pub struct Comments<'a, E: HttpExecutor> {
    executor: &'a E,
    item_url: String,
}

impl<'a, E: HttpExecutor + Sync> Comments<'a, E> {
    /// Resolve the backing item once and bind to it.
    pub async fn for_resource<C: Commentable>(
        executor: &'a E,
        resource: &C,
    ) -> SharePointResult<Self> {
        let item_url = resource.comment_item_url(executor).await?;
        debug!("Comment stream bound to {}", item_url);
        Ok(Self { executor, item_url })
    }

    /// All top-level comments, newest first (server order).
    pub async fn list(&self) -> SharePointResult<Vec<CommentInfo>> {
        let v = self
            .executor
            .get(&format!("{}/Comments", self.item_url), &[])
            .await?;
        Ok(serde_json::from_value(unwrap_collection(v))?)
    }

    /// A single comment by id.
    pub async fn get(&self, id: &str) -> SharePointResult<CommentInfo> {
        let v = self
            .executor
            .get(&format!("{}/Comments({})", self.item_url, id), &[])
            .await?;
        Ok(serde_json::from_value(v)?)
    }

    /// Add a top-level comment.
    pub async fn add(&self, text: impl Into<String>) -> SharePointResult<CommentInfo> {
        let v = self
            .executor
            .post(
                &format!("{}/Comments", self.item_url),
                &json!({ "text": text.into() }),
            )
            .await?;
        Ok(serde_json::from_value(v)?)
    }

    /// Delete a comment by id.
    pub async fn delete(&self, id: &str) -> SharePointResult<()> {
        self.executor
            .delete(&format!("{}/Comments({})", self.item_url, id))
            .await?;
        Ok(())
    }

    /// Delete every comment on the item.
    pub async fn clear(&self) -> SharePointResult<()> {
        self.executor
            .post_empty(&format!("{}/Comments/DeleteAll", self.item_url))
            .await?;
        Ok(())
    }

    /// Replies to a comment.
    pub async fn replies(&self, id: &str) -> SharePointResult<Vec<CommentInfo>> {
        let v = self
            .executor
            .get(&format!("{}/Comments({})/replies", self.item_url, id), &[])
            .await?;
        Ok(serde_json::from_value(unwrap_collection(v))?)
    }

    /// Reply to a comment.
    pub async fn reply(&self, id: &str, text: impl Into<String>) -> SharePointResult<CommentInfo> {
        let v = self
            .executor
            .post(
                &format!("{}/Comments({})/replies", self.item_url, id),
                &json!({ "text": text.into() }),
            )
            .await?;
        Ok(serde_json::from_value(v)?)
    }

    /// Like a comment as the current user.
    pub async fn like(&self, id: &str) -> SharePointResult<()> {
        self.executor
            .post_empty(&format!("{}/Comments({})/like", self.item_url, id))
            .await?;
        Ok(())
    }

    /// Remove the current user's like from a comment.
    pub async fn unlike(&self, id: &str) -> SharePointResult<()> {
        self.executor
            .post_empty(&format!("{}/Comments({})/unlike", self.item_url, id))
            .await?;
        Ok(())
    }

    /// Like information for the item itself, likers expanded.
    pub async fn liked_by_information(&self) -> SharePointResult<LikedByInformation> {
        let v = self
            .executor
            .get(
                &format!("{}/likedByInformation", self.item_url),
                &[("$expand", "likedBy")],
            )
            .await?;
        Ok(serde_json::from_value(v)?)
    }
}

impl ClientsidePage {
    /// Turn commenting on for this page.
    pub async fn enable_comments<E: HttpExecutor + Sync>(
        &mut self,
        executor: &E,
    ) -> SharePointResult<()> {
        self.set_comments(executor, true).await
    }

    /// Turn commenting off for this page.
    pub async fn disable_comments<E: HttpExecutor + Sync>(
        &mut self,
        executor: &E,
    ) -> SharePointResult<()> {
        self.set_comments(executor, false).await
    }

    async fn set_comments<E: HttpExecutor + Sync>(
        &mut self,
        executor: &E,
        on: bool,
    ) -> SharePointResult<()> {
        let item = self.item_url(executor).await?;
        executor
            .post_empty(&format!("{}/SetCommentsDisabled({})", item, !on))
            .await?;
        self.comments_disabled = !on;
        Ok(())
    }

    /// Like the page as the current user.
    pub async fn like<E: HttpExecutor + Sync>(&self, executor: &E) -> SharePointResult<()> {
        let item = self.item_url(executor).await?;
        executor.post_empty(&format!("{}/like", item)).await?;
        Ok(())
    }

    /// Remove the current user's like from the page.
    pub async fn unlike<E: HttpExecutor + Sync>(&self, executor: &E) -> SharePointResult<()> {
        let item = self.item_url(executor).await?;
        executor.post_empty(&format!("{}/unlike", item)).await?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SharePointError;
    use crate::types::PageData;
    use std::sync::Mutex;

    struct MockExecutor {
        responses: Vec<(String, Value)>,
        calls: Mutex<Vec<String>>,
        bodies: Mutex<Vec<(String, Value)>>,
    }

    impl MockExecutor {
        fn new() -> Self {
            Self {
                responses: Vec::new(),
                calls: Mutex::new(Vec::new()),
                bodies: Mutex::new(Vec::new()),
            }
        }

        fn respond(mut self, fragment: &str, v: Value) -> Self {
            self.responses.push((fragment.into(), v));
            self
        }

        fn lookup(&self, path: &str) -> Value {
            for (fragment, v) in &self.responses {
                if path.contains(fragment.as_str()) {
                    return v.clone();
                }
            }
            Value::Null
        }

        fn record(&self, method: &str, path: &str) {
            self.calls.lock().unwrap().push(format!("{} {}", method, path));
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl HttpExecutor for MockExecutor {
        async fn get(&self, path: &str, _query: &[(&str, &str)]) -> SharePointResult<Value> {
            self.record("GET", path);
            Ok(self.lookup(path))
        }

        async fn post(&self, path: &str, body: &Value) -> SharePointResult<Value> {
            self.record("POST", path);
            self.bodies
                .lock()
                .unwrap()
                .push((path.to_string(), body.clone()));
            Ok(self.lookup(path))
        }

        async fn post_with_headers(
            &self,
            path: &str,
            body: &Value,
            _headers: &[(&str, &str)],
        ) -> SharePointResult<Value> {
            self.post(path, body).await
        }

        async fn post_empty(&self, path: &str) -> SharePointResult<Value> {
            self.record("POST", path);
            Ok(self.lookup(path))
        }

        async fn post_raw(
            &self,
            _path: &str,
            _body: String,
            _content_type: &str,
        ) -> SharePointResult<String> {
            Err(SharePointError::batch("not used here"))
        }

        async fn patch(&self, path: &str, _body: &Value) -> SharePointResult<Value> {
            self.record("PATCH", path);
            Ok(self.lookup(path))
        }

        async fn delete(&self, path: &str) -> SharePointResult<Value> {
            self.record("DELETE", path);
            Ok(self.lookup(path))
        }

        fn url(&self, path: &str) -> String {
            path.to_string()
        }
    }

    const LIST_URL: &str =
        "https://contoso.sharepoint.com/sites/dev/_api/Web/Lists(guid'aaa')";

    fn executor_with_item() -> MockExecutor {
        MockExecutor::new().respond(
            "EnsureClientRenderedSitePagesLibrary",
            json!({ "odata.id": LIST_URL }),
        )
    }

    fn saved_page() -> ClientsidePage {
        ClientsidePage::from_json(PageData {
            id: Some(4),
            canvas_content1: Some("[]".into()),
            layout_webparts_content: Some("[]".into()),
            ..PageData::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_comments_bind_to_item_url() {
        let executor = executor_with_item();
        let page = saved_page();
        let comments = Comments::for_resource(&executor, &page).await.unwrap();
        assert_eq!(comments.item_url, format!("{}/items(4)", LIST_URL));
    }

    #[tokio::test]
    async fn test_list_unwraps_value_envelope() {
        let executor = executor_with_item().respond(
            "items(4)/Comments",
            json!({ "value": [
                { "id": "1", "text": "first" },
                { "id": "2", "text": "second", "likeCount": 3 }
            ] }),
        );
        let page = saved_page();
        let comments = Comments::for_resource(&executor, &page).await.unwrap();

        let all = comments.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text, "first");
        assert_eq!(all[1].like_count, Some(3));
    }

    #[tokio::test]
    async fn test_add_posts_text_body() {
        let executor = executor_with_item()
            .respond("items(4)/Comments", json!({ "id": "9", "text": "nice page" }));
        let page = saved_page();
        let comments = Comments::for_resource(&executor, &page).await.unwrap();

        let added = comments.add("nice page").await.unwrap();
        assert_eq!(added.id, "9");

        let bodies = executor.bodies.lock().unwrap();
        let (path, body) = bodies.last().unwrap();
        assert!(path.ends_with("items(4)/Comments"));
        assert_eq!(body["text"], "nice page");
    }

    #[tokio::test]
    async fn test_like_unlike_and_delete_endpoints() {
        let executor = executor_with_item();
        let page = saved_page();
        let comments = Comments::for_resource(&executor, &page).await.unwrap();

        comments.like("7").await.unwrap();
        comments.unlike("7").await.unwrap();
        comments.delete("7").await.unwrap();
        comments.clear().await.unwrap();

        let calls = executor.calls();
        assert!(calls.iter().any(|c| c.ends_with("Comments(7)/like")));
        assert!(calls.iter().any(|c| c.ends_with("Comments(7)/unlike")));
        assert!(calls
            .iter()
            .any(|c| c.starts_with("DELETE") && c.ends_with("Comments(7)")));
        assert!(calls.iter().any(|c| c.ends_with("Comments/DeleteAll")));
    }

    #[tokio::test]
    async fn test_replies_roundtrip() {
        let executor = executor_with_item()
            .respond("Comments(3)/replies", json!({ "value": [ { "id": "4", "text": "agreed", "isReply": true } ] }));
        let page = saved_page();
        let comments = Comments::for_resource(&executor, &page).await.unwrap();

        let replies = comments.replies("3").await.unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].is_reply, Some(true));
    }

    #[tokio::test]
    async fn test_liked_by_information() {
        let executor = executor_with_item().respond(
            "likedByInformation",
            json!({
                "isLikedByCurrentUser": true,
                "likeCount": 2,
                "likedBy": [ { "name": "Pat" }, { "name": "Sam" } ]
            }),
        );
        let page = saved_page();
        let comments = Comments::for_resource(&executor, &page).await.unwrap();

        let info = comments.liked_by_information().await.unwrap();
        assert!(info.is_liked_by_current_user);
        assert_eq!(info.like_count, 2);
        assert_eq!(info.liked_by.len(), 2);
    }

    #[tokio::test]
    async fn test_disable_comments_flips_flag() {
        let executor = executor_with_item();
        let mut page = saved_page();
        assert!(!page.comments_disabled);

        page.disable_comments(&executor).await.unwrap();
        assert!(page.comments_disabled);
        assert!(executor
            .calls()
            .iter()
            .any(|c| c.ends_with("SetCommentsDisabled(true)")));

        page.enable_comments(&executor).await.unwrap();
        assert!(!page.comments_disabled);
        assert!(executor
            .calls()
            .iter()
            .any(|c| c.ends_with("SetCommentsDisabled(false)")));
    }

    #[tokio::test]
    async fn test_page_like_targets_item() {
        let executor = executor_with_item();
        let page = saved_page();

        page.like(&executor).await.unwrap();
        page.unlike(&executor).await.unwrap();

        let calls = executor.calls();
        assert!(calls.iter().any(|c| c.ends_with("items(4)/like")));
        assert!(calls.iter().any(|c| c.ends_with("items(4)/unlike")));
    }

    #[tokio::test]
    async fn test_comments_require_saved_page() {
        let executor = MockExecutor::new();
        let page = ClientsidePage::new();
        let err = Comments::for_resource(&executor, &page).await.err().unwrap();
        assert_eq!(err.code, crate::error::SharePointErrorCode::PageNotSaved);
    }
}
