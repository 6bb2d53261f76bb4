// API layer - HTTP endpoints
pub mod assets;
pub mod auth;
pub mod health;
pub mod helpers;
pub mod users;

use std::sync::Arc;

use poem::{Endpoint, EndpointExt, Route};
use poem_openapi::OpenApiService;

pub use assets::AssetApi;
pub use auth::{AuthApi, BearerAuth};
pub use health::HealthApi;
pub use users::UserApi;

use crate::app_data::AppData;
use crate::coordinators::AuthCoordinator;

/// Compose the HTTP application: API under `/api`, Swagger UI under `/swagger`
pub fn build_routes(app_data: Arc<AppData>) -> impl Endpoint {
    let server_url = format!("http://{}/api", app_data.settings.server_address());

    let api_service = OpenApiService::new(
        (
            HealthApi::new(app_data.clock.clone()),
            AuthApi::new(Arc::new(AuthCoordinator::new(app_data.clone()))),
            UserApi::new(app_data.clone()),
            AssetApi::new(app_data),
        ),
        "Equipment Maintenance API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(server_url);

    let ui = api_service.swagger_ui();

    Route::new()
        .nest("/api", api_service)
        .nest("/swagger", ui)
        .with(poem::middleware::Tracing)
}
