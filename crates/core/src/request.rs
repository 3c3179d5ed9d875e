//! Normalization of raw request bodies into a [`ReportPayload`].
//!
//! Two shapes are accepted: the current `{ meta, slides }` shape, and the
//! legacy flat shape where a single table is described by top-level `rows`
//! plus title fields.

use crate::error::{Error, Result};
use crate::types::{ReportMeta, ReportPayload, ReportRow, SlideSpec, TableSlide};
use serde::Deserialize;
use serde_json::Value;

/// The legacy single-table request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRequest {
    title: Option<String>,
    section_title: Option<String>,
    table_title: Option<String>,
    footer_title: Option<String>,
    footer_address: Option<String>,
    logo: Option<String>,
    rows: Vec<ReportRow>,
}

impl From<LegacyRequest> for ReportPayload {
    fn from(legacy: LegacyRequest) -> Self {
        let meta = ReportMeta {
            title: legacy.title,
            footer_title: legacy.footer_title,
            footer_address: legacy.footer_address,
            logo: legacy.logo,
        };
        let table = TableSlide {
            section_title: legacy.section_title,
            table_title: legacy.table_title,
            rows: legacy.rows,
        };
        ReportPayload::new(vec![SlideSpec::Table(table)]).with_meta(meta)
    }
}

/// Turn a request body into a report payload.
///
/// Returns [`Error::NoData`] when the body carries neither `slides` nor
/// `rows`, and [`Error::InvalidPayload`] when it does but the shape is wrong.
pub fn normalize_request(body: Value) -> Result<ReportPayload> {
    let has = |key: &str| body.get(key).is_some_and(|v| !v.is_null());

    if has("slides") {
        Ok(ReportPayload::deserialize(body)?)
    } else if has("rows") {
        log::debug!("Normalizing legacy rows-only request");
        Ok(LegacyRequest::deserialize(body)?.into())
    } else {
        Err(Error::NoData)
    }
}

/// Parse and normalize a JSON request body from text.
pub fn normalize_request_str(body: &str) -> Result<ReportPayload> {
    let value: Value = serde_json::from_str(body)?;
    normalize_request(value)
}
