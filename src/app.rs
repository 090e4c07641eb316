use std::time::Duration;

use axum::{
    extract::FromRef,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::TokenService;
use crate::config::ServerConfig;
use crate::database::{BandRepository, PlaylistRepository, UserRepository};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::require_auth;
use crate::services::AuthService;

/// Shared, cheaply clonable handles for every request
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth: AuthService,
    pub users: UserRepository,
    pub bands: BandRepository,
    pub playlists: PlaylistRepository,
}

impl AppState {
    pub fn new(pool: PgPool, tokens: TokenService) -> Self {
        let users = UserRepository::new(pool.clone());
        Self {
            auth: AuthService::new(users.clone(), tokens),
            users,
            bands: BandRepository::new(pool.clone()),
            playlists: PlaylistRepository::new(pool.clone()),
            pool,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for UserRepository {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

impl FromRef<AppState> for BandRepository {
    fn from_ref(state: &AppState) -> Self {
        state.bands.clone()
    }
}

impl FromRef<AppState> for PlaylistRepository {
    fn from_ref(state: &AppState) -> Self {
        state.playlists.clone()
    }
}

/// Full application router: public routes, gated `/api` routes, optional
/// static fallback, and the tracing/CORS/timeout stack.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let protected = Router::new()
        .merge(profile_routes())
        .merge(band_routes())
        .merge(playlist_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let app = Router::new().merge(public_routes()).merge(protected);

    let app = match server.static_dir.as_deref() {
        Some(dir) => {
            tracing::info!("Serving static files from {}", dir);
            app.fallback_service(ServeDir::new(dir))
        }
        None => app.fallback(not_found),
    };

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&server.cors_origins))
            .layer(TimeoutLayer::new(server.request_timeout())),
    )
    .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{auth, system};

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/logout", post(auth::logout_post))
}

fn profile_routes() -> Router<AppState> {
    use protected::profile;

    Router::new()
        .route(
            "/api/profile",
            get(profile::get_profile)
                .put(profile::update_profile)
                .delete(profile::delete_profile),
        )
        .route("/api/profile/password", put(profile::change_password))
}

fn band_routes() -> Router<AppState> {
    use protected::{bands, members};

    Router::new()
        .route("/api/bands", get(bands::list).post(bands::create))
        .route(
            "/api/bands/:band_id",
            get(bands::get).put(bands::update).delete(bands::delete),
        )
        .route(
            "/api/bands/:band_id/members",
            get(members::list).post(members::create),
        )
        .route(
            "/api/bands/:band_id/members/:member_id",
            get(members::get).put(members::update).delete(members::delete),
        )
}

fn playlist_routes() -> Router<AppState> {
    use protected::{playlists, songs};

    Router::new()
        .route(
            "/api/bands/:band_id/playlists",
            get(playlists::list).post(playlists::create),
        )
        .route(
            "/api/bands/:band_id/playlists/:playlist_id",
            get(playlists::get).put(playlists::update).delete(playlists::delete),
        )
        .route(
            "/api/bands/:band_id/playlists/:playlist_id/songs",
            get(songs::list).post(songs::create),
        )
        .route(
            "/api/bands/:band_id/playlists/:playlist_id/songs/:song_id",
            get(songs::get).put(songs::update).delete(songs::delete),
        )
        .route("/api/bands/:band_id/artists", get(playlists::artists))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(300))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
