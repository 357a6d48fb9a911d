use utoipa::OpenApi;

use crate::{api, config};

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health,
        api::layout,
        api::defaults,
        api::render,
        api::download,
    ),
    components(
        schemas(
            api::CardRequest,
            api::FormDefaults,
            api::HealthResponse,
            config::CardConfig,
            config::Canvas,
            config::FontFace,
            config::FieldRegions,
            config::FieldStyles,
            config::FieldStyle,
            config::Region,
        )
    ),
    tags(
        (name = "cardgen", description = "cardgen Rust backend API")
    )
)]
pub struct ApiDoc;
