/*
 * Responsibility
 * - Stand-in upstream: echo the request as it looks after the claim pipeline
 *   (method, target, headers) so propagated headers can be observed
 */
use std::collections::BTreeMap;

use axum::{
    Json,
    http::{HeaderMap, Method, Uri},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct InspectResponse {
    pub method: String,
    pub uri: String,
    pub headers: BTreeMap<String, String>,
}

pub async fn inspect(method: Method, uri: Uri, headers: HeaderMap) -> Json<InspectResponse> {
    let mut echoed: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match echoed.get_mut(name.as_str()) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                echoed.insert(name.as_str().to_string(), value.into_owned());
            }
        }
    }

    Json(InspectResponse {
        method: method.to_string(),
        uri: uri.to_string(),
        headers: echoed,
    })
}
