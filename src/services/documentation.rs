use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Card Room Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::rooms::hello,
        crate::routes::rooms::list_games,
        crate::routes::rooms::get_game,
        crate::routes::rooms::new_game,
        crate::routes::rooms::new_user,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::http::GamesListResponse,
            crate::dto::http::NewGameRequest,
            crate::dto::http::NewGameResponse,
            crate::dto::http::NewUserRequest,
            crate::dto::http::Numberish,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "room", description = "Room lifecycle and realtime entrypoints"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_schemas_are_part_of_the_document() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        for name in [
            "NewGameRequest",
            "NewUserRequest",
            "Numberish",
            "GamesListResponse",
            "NewGameResponse",
            "HealthResponse",
        ] {
            assert!(
                components.schemas.contains_key(name),
                "schema `{name}` missing from the OpenAPI document"
            );
        }
    }
}
