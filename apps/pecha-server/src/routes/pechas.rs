//! Pecha component API routes: base texts and annotation layers

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::opf::LayerKind;
use crate::state::AppState;

/// Create the pechas router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:pecha_id/components", get(read_components))
        .route(
            "/:pecha_id/base/:base_name",
            get(read_base)
                .post(create_base)
                .put(update_base)
                .delete(delete_base),
        )
        .route("/:pecha_id/layers/:base_name", get(read_layers))
        .route(
            "/:pecha_id/layers/:base_name/:layer_name",
            get(read_layer)
                .post(write_layer)
                .put(write_layer)
                .delete(delete_layer),
        )
}

/// Body of base text requests
#[derive(Debug, Deserialize)]
pub struct BaseLayer {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

fn parse_layer(name: &str) -> Result<LayerKind> {
    name.parse().map_err(AppError::BadRequest)
}

async fn read_components(
    State(state): State<AppState>,
    Path(pecha_id): Path<String>,
) -> Result<Json<BTreeMap<String, Vec<LayerKind>>>> {
    Ok(Json(state.store().components(&pecha_id).await?))
}

async fn read_base(
    State(state): State<AppState>,
    Path((pecha_id, base_name)): Path<(String, String)>,
) -> Result<Json<String>> {
    Ok(Json(state.store().read_base(&pecha_id, &base_name).await?))
}

async fn create_base(
    State(state): State<AppState>,
    Path((pecha_id, base_name)): Path<(String, String)>,
    Json(base): Json<BaseLayer>,
) -> Result<(StatusCode, Json<SuccessResponse>)> {
    state
        .store()
        .write_base(&pecha_id, &base_name, &base.content)
        .await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse { success: true })))
}

// Rewriting a base would require realigning every layer's spans.
async fn update_base() -> Result<Json<SuccessResponse>> {
    Err(AppError::NotImplemented("Endpoint not functional yet".to_string()))
}

async fn delete_base() -> Result<Json<SuccessResponse>> {
    Err(AppError::NotImplemented("Endpoint not functional yet".to_string()))
}

async fn read_layers() -> Result<Json<Vec<serde_json::Value>>> {
    Err(AppError::NotImplemented("Endpoint not functional yet".to_string()))
}

async fn read_layer(
    State(state): State<AppState>,
    Path((pecha_id, base_name, layer_name)): Path<(String, String, String)>,
) -> Result<Json<serde_json::Value>> {
    let layer = parse_layer(&layer_name)?;
    Ok(Json(state.store().read_layer(&pecha_id, &base_name, layer).await?))
}

async fn write_layer(
    State(state): State<AppState>,
    Path((pecha_id, base_name, layer_name)): Path<(String, String, String)>,
    Json(content): Json<serde_json::Value>,
) -> Result<Json<SuccessResponse>> {
    let layer = parse_layer(&layer_name)?;
    state
        .store()
        .write_layer(&pecha_id, &base_name, layer, &content)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn delete_layer() -> Result<Json<SuccessResponse>> {
    Err(AppError::NotImplemented("Endpoint not functional yet".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support;
    use serde_json::json;

    fn seed_meta(root: &std::path::Path) {
        let opf = root.join("P000001/P000001.opf");
        std::fs::create_dir_all(&opf).unwrap();
        std::fs::write(opf.join("meta.yml"), "work_id: W1\nimg_grp_offset: 0\npref: I\n").unwrap();
    }

    #[tokio::test]
    async fn test_base_round_trip() {
        let (temp_dir, server) = test_support::server().await;
        seed_meta(temp_dir.path());

        let response = server
            .post("/api/v1/pechas/P000001/base/v001")
            .json(&json!({ "content": "ཀ་ཁ་ག་" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        assert!(response.json::<SuccessResponse>().success);

        let response = server.get("/api/v1/pechas/P000001/base/v001").await;
        response.assert_status_ok();
        assert_eq!(response.json::<String>(), "ཀ་ཁ་ག་");

        let missing = server.get("/api/v1/pechas/P000001/base/v002").await;
        missing.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_layer_round_trip_and_components() {
        let (temp_dir, server) = test_support::server().await;
        seed_meta(temp_dir.path());

        server
            .post("/api/v1/pechas/P000001/base/v001")
            .json(&json!({ "content": "ཀ་ཁ་" }))
            .await
            .assert_status(StatusCode::CREATED);

        let layer = json!({
            "annotation_type": "Pagination",
            "annotations": {
                "p1": { "page_index": "1a", "span": { "start": 0, "end": 3 } }
            }
        });
        let response = server
            .put("/api/v1/pechas/P000001/layers/v001/Pagination")
            .json(&layer)
            .await;
        response.assert_status_ok();

        let read: serde_json::Value = server
            .get("/api/v1/pechas/P000001/layers/v001/Pagination")
            .await
            .json();
        assert_eq!(read, layer);

        let components: BTreeMap<String, Vec<String>> =
            server.get("/api/v1/pechas/P000001/components").await.json();
        assert_eq!(components["v001"], vec!["Pagination".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_layer_is_rejected() {
        let (temp_dir, server) = test_support::server().await;
        seed_meta(temp_dir.path());

        let response = server.get("/api/v1/pechas/P000001/layers/v001/NotALayer").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsupported_operations() {
        let (_temp_dir, server) = test_support::server().await;

        server
            .put("/api/v1/pechas/P000001/base/v001")
            .json(&json!({ "content": "x" }))
            .await
            .assert_status(StatusCode::NOT_IMPLEMENTED);
        server
            .delete("/api/v1/pechas/P000001/base/v001")
            .await
            .assert_status(StatusCode::NOT_IMPLEMENTED);
        server
            .get("/api/v1/pechas/P000001/layers/v001")
            .await
            .assert_status(StatusCode::NOT_IMPLEMENTED);
        server
            .delete("/api/v1/pechas/P000001/layers/v001/Pagination")
            .await
            .assert_status(StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_components_of_missing_pecha() {
        let (_temp_dir, server) = test_support::server().await;
        server
            .get("/api/v1/pechas/P404404/components")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
