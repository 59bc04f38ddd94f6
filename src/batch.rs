//! SharePoint `$batch` support.
//!
//! Queues N read / write operations against one web, sends them as a
//! single `multipart/mixed` POST to `_api/$batch`, and resolves each
//! queued operation's result in queue order. All queued results are
//! available before `execute` returns, so a caller can safely perform a
//! dependent write afterwards.
//!
//! Body construction and response parsing are pure functions so they
//! are testable without a network.

use crate::client::{HttpExecutor, ODATA_ACCEPT, ODATA_CONTENT_TYPE};
use crate::error::{SharePointError, SharePointResult};
use crate::odata::ODataQuery;
use log::debug;

/// A queued batch operation.
#[derive(Debug, Clone)]
enum BatchOp {
    Get { url: String },
    Post { url: String, body: serde_json::Value },
    Patch { url: String, body: serde_json::Value },
    Delete { url: String },
}

/// The response to one queued operation.
#[derive(Debug, Clone)]
pub struct BatchResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl BatchResponse {
    /// Convert to a result, surfacing non-2xx parts as transport errors.
    pub fn into_result(self) -> SharePointResult<serde_json::Value> {
        if self.status >= 400 {
            Err(SharePointError::from_rest_response(
                self.status,
                &self.body.to_string(),
            ))
        } else {
            Ok(self.body)
        }
    }
}

/// A batch of queued operations bound to an executor.
pub struct SPBatch<'a, E: HttpExecutor> {
    executor: &'a E,
    ops: Vec<BatchOp>,
}

impl<'a, E: HttpExecutor> SPBatch<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self {
            executor,
            ops: Vec::new(),
        }
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Queue a GET; returns the index its response will occupy.
    pub fn get(&mut self, path: &str, query: &ODataQuery) -> usize {
        let url = format!("{}{}", self.executor.url(path), query.to_query_string());
        self.ops.push(BatchOp::Get { url });
        self.ops.len() - 1
    }

    /// Queue a POST.
    pub fn post(&mut self, path: &str, body: serde_json::Value) -> usize {
        let url = self.executor.url(path);
        self.ops.push(BatchOp::Post { url, body });
        self.ops.len() - 1
    }

    /// Queue a PATCH (MERGE).
    pub fn patch(&mut self, path: &str, body: serde_json::Value) -> usize {
        let url = self.executor.url(path);
        self.ops.push(BatchOp::Patch { url, body });
        self.ops.len() - 1
    }

    /// Queue a DELETE.
    pub fn delete(&mut self, path: &str) -> usize {
        let url = self.executor.url(path);
        self.ops.push(BatchOp::Delete { url });
        self.ops.len() - 1
    }

    /// Execute the batch. Responses come back in queue order; a count
    /// mismatch with the queued operations is a malformed batch.
    pub async fn execute(self) -> SharePointResult<Vec<BatchResponse>> {
        if self.ops.is_empty() {
            return Ok(Vec::new());
        }

        let boundary = format!("batch_{}", uuid::Uuid::new_v4());
        let body = build_batch_body(&boundary, &self.ops);
        debug!("Executing batch of {} operation(s)", self.ops.len());

        let text = self
            .executor
            .post_raw(
                "_api/$batch",
                body,
                &format!("multipart/mixed; boundary={}", boundary),
            )
            .await?;

        let responses = parse_batch_response(&text)?;
        if responses.len() != self.ops.len() {
            return Err(SharePointError::batch(format!(
                "Expected {} batch responses, got {}",
                self.ops.len(),
                responses.len()
            )));
        }
        Ok(responses)
    }
}

/// Render the `multipart/mixed` request body. Reads are individual
/// parts; each write is wrapped in its own changeset.
fn build_batch_body(boundary: &str, ops: &[BatchOp]) -> String {
    let mut out = String::new();

    for op in ops {
        match op {
            BatchOp::Get { url } => {
                out.push_str(&format!("--{}\r\n", boundary));
                out.push_str("Content-Type: application/http\r\n");
                out.push_str("Content-Transfer-Encoding: binary\r\n\r\n");
                out.push_str(&format!("GET {} HTTP/1.1\r\n", url));
                out.push_str(&format!("Accept: {}\r\n\r\n\r\n", ODATA_ACCEPT));
            }
            BatchOp::Post { url, body }
            | BatchOp::Patch { url, body } => {
                let method = match op {
                    BatchOp::Patch { .. } => "MERGE",
                    _ => "POST",
                };
                let changeset = format!("changeset_{}", uuid::Uuid::new_v4());
                out.push_str(&format!("--{}\r\n", boundary));
                out.push_str(&format!(
                    "Content-Type: multipart/mixed; boundary={}\r\n\r\n",
                    changeset
                ));
                out.push_str(&format!("--{}\r\n", changeset));
                out.push_str("Content-Type: application/http\r\n");
                out.push_str("Content-Transfer-Encoding: binary\r\n\r\n");
                out.push_str(&format!("POST {} HTTP/1.1\r\n", url));
                if method == "MERGE" {
                    out.push_str("X-HTTP-Method: MERGE\r\n");
                    out.push_str("IF-MATCH: *\r\n");
                }
                out.push_str(&format!("Accept: {}\r\n", ODATA_ACCEPT));
                out.push_str(&format!("Content-Type: {}\r\n\r\n", ODATA_CONTENT_TYPE));
                out.push_str(&body.to_string());
                out.push_str("\r\n\r\n");
                out.push_str(&format!("--{}--\r\n", changeset));
            }
            BatchOp::Delete { url } => {
                let changeset = format!("changeset_{}", uuid::Uuid::new_v4());
                out.push_str(&format!("--{}\r\n", boundary));
                out.push_str(&format!(
                    "Content-Type: multipart/mixed; boundary={}\r\n\r\n",
                    changeset
                ));
                out.push_str(&format!("--{}\r\n", changeset));
                out.push_str("Content-Type: application/http\r\n");
                out.push_str("Content-Transfer-Encoding: binary\r\n\r\n");
                out.push_str(&format!("DELETE {} HTTP/1.1\r\n", url));
                out.push_str("IF-MATCH: *\r\n\r\n\r\n");
                out.push_str(&format!("--{}--\r\n", changeset));
            }
        }
    }

    out.push_str(&format!("--{}--\r\n", boundary));
    out
}

/// Parse a `$batch` response body into per-operation responses, in
/// order. Handles both top-level parts (reads) and changeset-nested
/// parts (writes) uniformly by scanning for embedded `HTTP/1.1` status
/// lines.
fn parse_batch_response(text: &str) -> SharePointResult<Vec<BatchResponse>> {
    let mut responses = Vec::new();
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        if !trimmed.starts_with("HTTP/1.1 ") {
            continue;
        }

        let status: u16 = trimmed
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                SharePointError::batch(format!("Unparseable status line: {}", trimmed))
            })?;

        // Skip the inner response headers.
        for header in lines.by_ref() {
            if header.trim().is_empty() {
                break;
            }
        }

        // Collect the body up to the next boundary marker.
        let mut body = String::new();
        while let Some(next) = lines.peek() {
            if next.trim_start().starts_with("--") {
                break;
            }
            body.push_str(lines.next().unwrap());
            body.push('\n');
        }

        let body = body.trim();
        let value = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(body).map_err(|e| {
                SharePointError::batch(format!("Malformed batch part body: {}", e))
            })?
        };

        responses.push(BatchResponse {
            status,
            body: value,
        });
    }

    if responses.is_empty() {
        return Err(SharePointError::batch("No responses found in batch body"));
    }

    Ok(responses)
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_body_reads() {
        let ops = vec![
            BatchOp::Get {
                url: "https://c.sharepoint.com/sites/dev/_api/site?$select=Id".into(),
            },
            BatchOp::Get {
                url: "https://c.sharepoint.com/sites/dev/_api/web?$select=Id,Url".into(),
            },
        ];
        let body = build_batch_body("batch_abc", &ops);

        assert!(body.contains("--batch_abc\r\n"));
        assert!(body.contains("GET https://c.sharepoint.com/sites/dev/_api/site?$select=Id HTTP/1.1"));
        assert!(body.contains("GET https://c.sharepoint.com/sites/dev/_api/web?$select=Id,Url HTTP/1.1"));
        assert!(body.ends_with("--batch_abc--\r\n"));
        // reads are not wrapped in changesets
        assert!(!body.contains("changeset_"));
    }

    #[test]
    fn test_build_body_write_uses_changeset() {
        let ops = vec![BatchOp::Post {
            url: "https://c.sharepoint.com/sites/dev/_api/lists".into(),
            body: json!({"Title": "x"}),
        }];
        let body = build_batch_body("batch_abc", &ops);
        assert!(body.contains("multipart/mixed; boundary=changeset_"));
        assert!(body.contains("POST https://c.sharepoint.com/sites/dev/_api/lists HTTP/1.1"));
        assert!(body.contains(r#"{"Title":"x"}"#));
    }

    #[test]
    fn test_build_body_merge_headers() {
        let ops = vec![BatchOp::Patch {
            url: "https://c.sharepoint.com/_api/lists/items(1)".into(),
            body: json!({}),
        }];
        let body = build_batch_body("batch_abc", &ops);
        assert!(body.contains("X-HTTP-Method: MERGE"));
        assert!(body.contains("IF-MATCH: *"));
    }

    #[test]
    fn test_parse_response_two_reads() {
        let text = concat!(
            "--batchresponse_xyz\r\n",
            "Content-Type: application/http\r\n",
            "Content-Transfer-Encoding: binary\r\n",
            "\r\n",
            "HTTP/1.1 200 OK\r\n",
            "Content-Type: application/json;odata=minimalmetadata\r\n",
            "\r\n",
            "{\"Id\":\"site-guid\"}\r\n",
            "--batchresponse_xyz\r\n",
            "Content-Type: application/http\r\n",
            "Content-Transfer-Encoding: binary\r\n",
            "\r\n",
            "HTTP/1.1 200 OK\r\n",
            "Content-Type: application/json;odata=minimalmetadata\r\n",
            "\r\n",
            "{\"Id\":\"web-guid\",\"Url\":\"https://c.sharepoint.com/sites/dev\"}\r\n",
            "--batchresponse_xyz--\r\n",
        );
        let parts = parse_batch_response(text).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].status, 200);
        assert_eq!(parts[0].body["Id"], "site-guid");
        assert_eq!(parts[1].body["Url"], "https://c.sharepoint.com/sites/dev");
    }

    #[test]
    fn test_parse_response_nested_changeset() {
        let text = concat!(
            "--batchresponse_xyz\r\n",
            "Content-Type: multipart/mixed; boundary=changesetresponse_1\r\n",
            "\r\n",
            "--changesetresponse_1\r\n",
            "Content-Type: application/http\r\n",
            "\r\n",
            "HTTP/1.1 204 No Content\r\n",
            "\r\n",
            "\r\n",
            "--changesetresponse_1--\r\n",
            "--batchresponse_xyz--\r\n",
        );
        let parts = parse_batch_response(text).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].status, 204);
        assert!(parts[0].body.is_null());
    }

    #[test]
    fn test_parse_response_error_part_surfaces_status() {
        let text = concat!(
            "--batchresponse_xyz\r\n",
            "Content-Type: application/http\r\n",
            "\r\n",
            "HTTP/1.1 404 Not Found\r\n",
            "\r\n",
            "{\"odata.error\":{\"code\":\"-1, FileNotFound\",\"message\":{\"value\":\"gone\"}}}\r\n",
            "--batchresponse_xyz--\r\n",
        );
        let parts = parse_batch_response(text).unwrap();
        assert_eq!(parts[0].status, 404);
        let err = parts[0].clone().into_result().unwrap_err();
        assert_eq!(err.status, Some(404));
        assert_eq!(err.message, "gone");
    }

    #[test]
    fn test_parse_response_empty_is_error() {
        let err = parse_batch_response("garbage with no parts").unwrap_err();
        assert!(err.message.contains("No responses"));
    }
}
