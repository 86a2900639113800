//! Request bodies and response parsing for the document APIs.
//!
//! API reference: https://docs.opensearch.org/latest/api-reference/document-apis/bulk/

use std::ops::Range;

use opensearch::http::request::JsonBody;
use serde_json::{json, Value};

use crate::errors::IndexError;
use catalog_indexer_shared::IndexDocument;

/// The bulk action a request carries for every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BulkAction {
    Index,
    Delete,
}

impl BulkAction {
    fn key(self) -> &'static str {
        match self {
            BulkAction::Index => "index",
            BulkAction::Delete => "delete",
        }
    }
}

/// A bulk request body together with the input positions it covers.
pub(crate) struct BulkRequest {
    pub body: Vec<JsonBody<Value>>,
    /// Position in the caller's slice of each item in `body`, in order.
    pub positions: Vec<usize>,
}

/// Split `len` inputs into consecutive ranges of at most `max` inputs.
pub(crate) fn bulk_chunks(len: usize, max: usize) -> Vec<Range<usize>> {
    let max = max.max(1);
    (0..len)
        .step_by(max)
        .map(|start| start..(start + max).min(len))
        .collect()
}

/// Build the NDJSON body for indexing `documents`.
///
/// `offset` is the position of `documents[0]` in the caller's slice. A
/// document that cannot be serialized is left out of the body and its
/// rejection is returned alongside its position.
pub(crate) fn build_bulk_request(
    documents: &[IndexDocument],
    offset: usize,
) -> (BulkRequest, Vec<(usize, IndexError)>) {
    let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
    let mut positions = Vec::with_capacity(documents.len());
    let mut rejected = Vec::new();

    for (i, doc) in documents.iter().enumerate() {
        match serde_json::to_value(doc) {
            Ok(source) => {
                body.push(json!({"index": {"_id": doc.id}}).into());
                body.push(source.into());
                positions.push(offset + i);
            }
            Err(e) => rejected.push((
                offset + i,
                IndexError::rejected(format!("Failed to serialize document {}: {}", doc.id, e)),
            )),
        }
    }

    (BulkRequest { body, positions }, rejected)
}

/// Build the NDJSON body for deleting `ids`. Delete actions carry no source line.
pub(crate) fn build_delete_request(ids: &[String], offset: usize) -> BulkRequest {
    let body = ids
        .iter()
        .map(|id| json!({"delete": {"_id": id}}).into())
        .collect();
    let positions = (offset..offset + ids.len()).collect();

    BulkRequest { body, positions }
}

/// Copy the item results of one bulk request into the caller's result slots.
pub(crate) fn attribute_results(
    results: &mut [Result<(), IndexError>],
    positions: &[usize],
    items: Vec<Result<(), IndexError>>,
) {
    for (&position, result) in positions.iter().zip(items) {
        results[position] = result;
    }
}

/// Turn a bulk response into one result per submitted item.
///
/// Items are matched to the request by position. An item missing from the
/// response leaves its state unknown, which is reported as a retryable
/// connection failure since both upserts and deletes can safely be repeated.
pub(crate) fn parse_bulk_items(
    response: &Value,
    expected: usize,
    action: BulkAction,
) -> Vec<Result<(), IndexError>> {
    let empty = Vec::new();
    let items = response
        .get("items")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    (0..expected)
        .map(|i| {
            let Some(result) = items.get(i).and_then(|item| item.get(action.key())) else {
                return Err(IndexError::connection(format!(
                    "Bulk response has no item at position {}",
                    i
                )));
            };
            parse_item(result, action)
        })
        .collect()
}

fn parse_item(result: &Value, action: BulkAction) -> Result<(), IndexError> {
    let status = result
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or(0);

    if let Some(error) = result.get("error") {
        let kind = error.get("type").and_then(Value::as_str).unwrap_or("unknown");
        let reason = error.get("reason").and_then(Value::as_str).unwrap_or("");
        return Err(IndexError::from_status(status, format!("{}: {}", kind, reason)));
    }

    // Deleting a document that is not indexed leaves the index as intended.
    if action == BulkAction::Delete && status == 404 {
        return Ok(());
    }

    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(IndexError::from_status(status, "bulk item failed"))
    }
}

/// Read the document out of a successful get response.
///
/// API reference: https://docs.opensearch.org/latest/api-reference/document-apis/get-documents/
pub(crate) fn parse_get_response(body: &Value, id: &str) -> Result<Option<IndexDocument>, IndexError> {
    if body.get("found").and_then(Value::as_bool) == Some(false) {
        return Ok(None);
    }

    let source = body
        .get("_source")
        .cloned()
        .ok_or_else(|| IndexError::rejected(format!("Document {} has no _source", id)))?;

    serde_json::from_value(source)
        .map(Some)
        .map_err(|e| IndexError::rejected(format!("Failed to parse document {}: {}", id, e)))
}
