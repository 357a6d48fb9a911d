use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    config::CardConfig,
    generator::{
        card::{self, DisplayStrings},
        normalize, GenError,
    },
    AppState,
};

fn default_mobile() -> bool {
    true
}

/// Raw form values. Everything is optional; empty fields render nothing.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(default)]
pub struct CardRequest {
    pub name: String,
    pub role: String,
    pub area: String,
    pub country: String,
    pub area_code: String,
    pub number: String,
    pub mobile: bool,
}

impl Default for CardRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            role: String::new(),
            area: String::new(),
            country: String::new(),
            area_code: String::new(),
            number: String::new(),
            mobile: default_mobile(),
        }
    }
}

/// Pristine form state, as the Clear command restores it.
#[derive(Debug, Serialize, ToSchema)]
pub struct FormDefaults {
    pub name: String,
    pub role: String,
    pub area: String,
    pub country: String,
    pub area_code: String,
    pub number: String,
    pub mobile: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[utoipa::path(get, path = "/health", tag = "cardgen", responses((status=200, body=HealthResponse)))]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok".into() })
}

#[utoipa::path(
    get,
    path = "/layout",
    tag = "cardgen",
    responses((status=200, description="Static render configuration", body=CardConfig))
)]
pub async fn layout(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    Json(st.config.clone())
}

#[utoipa::path(
    get,
    path = "/defaults",
    tag = "cardgen",
    responses((status=200, description="Default form values", body=FormDefaults))
)]
pub async fn defaults(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    Json(FormDefaults {
        name: String::new(),
        role: String::new(),
        area: String::new(),
        country: st.config.default_country.clone(),
        area_code: String::new(),
        number: String::new(),
        mobile: default_mobile(),
    })
}

pub fn display_strings(cfg: &CardConfig, req: &CardRequest) -> DisplayStrings {
    DisplayStrings {
        name: normalize::display_name(&req.name),
        role_area: normalize::role_area_line(&req.role, &req.area),
        phone: normalize::phone_line(
            &req.country,
            &req.area_code,
            &req.number,
            req.mobile,
            &cfg.default_country,
        ),
    }
}

fn render_png(st: &AppState, req: &CardRequest) -> Result<Vec<u8>, GenError> {
    let text = display_strings(&st.config, req);
    let img = card::compose_card(&st.background, &st.fonts, &st.config, &text)?;
    card::encode_png(&img)
}

fn error_status(e: GenError) -> (StatusCode, String) {
    match e {
        GenError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        e => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn png_headers(disposition: String) -> [(HeaderName, String); 2] {
    [
        (header::CONTENT_TYPE, "image/png".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ]
}

#[utoipa::path(
    post,
    path = "/render",
    tag = "cardgen",
    request_body = CardRequest,
    responses(
        (status=200, description="Rendered card for viewing", content_type="image/png"),
        (status=400, description="Bad request"),
        (status=500, description="Internal error")
    )
)]
pub async fn render(
    State(st): State<Arc<AppState>>,
    Json(req): Json<CardRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let png = render_png(&st, &req).map_err(error_status)?;
    Ok((png_headers("inline".to_string()), png))
}

#[utoipa::path(
    post,
    path = "/download",
    tag = "cardgen",
    request_body = CardRequest,
    responses(
        (status=200, description="Rendered card as attachment", content_type="image/png"),
        (status=400, description="Bad request"),
        (status=500, description="Internal error")
    )
)]
pub async fn download(
    State(st): State<Arc<AppState>>,
    Json(req): Json<CardRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let png = render_png(&st, &req).map_err(error_status)?;
    let filename = normalize::export_file_name(&st.config.export_prefix, &req.name);
    let disposition = format!("attachment; filename=\"{filename}\"");
    Ok((png_headers(disposition), png))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_match_cleared_form() {
        let req = CardRequest::default();
        assert!(req.name.is_empty());
        assert!(req.mobile);
    }

    #[test]
    fn display_strings_skip_empty_fields() {
        let cfg = CardConfig::default();
        let req = CardRequest::default();
        let text = display_strings(&cfg, &req);
        assert_eq!(text, DisplayStrings::default());
    }

    #[test]
    fn display_strings_normalize_all_fields() {
        let cfg = CardConfig::default();
        let req = CardRequest {
            name: " José Pérez ".into(),
            role: "Gerente".into(),
            area: "Ventas".into(),
            country: "+54".into(),
            area_code: "261".into(),
            number: "5327691".into(),
            mobile: true,
        };
        let text = display_strings(&cfg, &req);
        assert_eq!(text.name, "JOSÉ PÉREZ");
        assert_eq!(text.role_area, "GERENTE | VENTAS");
        assert_eq!(text.phone, "TEL: +54 9 261 532 7691");
    }
}
