use std::{sync::Arc, net::{SocketAddr, IpAddr, Ipv4Addr}, str::FromStr, time::Duration};
use clap::Parser;
use axum::{middleware::from_fn_with_state, routing::get, Router};
use handlebars::Handlebars;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use reqwest::Client;

pub mod models;
pub mod controllers;
pub mod entities;
pub mod errors;
pub mod services;
pub mod mappers;
pub mod middleware;

use controllers::{api, index};
use middleware::rate_limit::{self, RateLimiter};
use services::github_repo_service::{GitHubRepoService, GITHUB_GRAPHQL_URL};


// Command line interface
#[derive(Parser, Debug)]
#[clap(name="repo-language-card", about="Renders a GitHub user's language breakdown as an SVG card!")]
struct Opt {
    #[clap(short = 'l', long = "log", default_value = "info")]
    log_level: String,

    #[clap(short = 'a', long = "addr", default_value = "::1")]
    addr: String,

    #[clap(short = 'p', long = "port", env = "PORT", default_value = "3000")]
    port: u16,

    #[clap(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    #[clap(long = "graphql-url", default_value = GITHUB_GRAPHQL_URL)]
    graphql_url: String,

    /// Requests allowed per client and window on /api routes, 0 disables the limit
    #[clap(long = "api-rate-limit", default_value = "30")]
    api_rate_limit: u32,

    #[clap(long = "api-rate-window", default_value = "900")]
    api_rate_window_secs: u64,
}

pub struct AppState {
    registry: Handlebars<'static>,
    github_repo_service: GitHubRepoService,
}

fn register_templates() -> Result<Handlebars<'static>, handlebars::TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_template_string("languages", include_str!("templates/languages.hbs"))?;
    Ok(handlebars)
}

fn app(app_state: Arc<AppState>, limiter: Option<Arc<RateLimiter>>) -> Router {
    let mut api_routes: Router<Arc<AppState>> = Router::new()
        .route("/api/:username", get(api::get_user_repos));
    if let Some(limiter) = limiter {
        api_routes = api_routes.route_layer(from_fn_with_state(limiter, rate_limit::limit));
    }

    Router::new()
        .route("/:username", get(index::get_user_repos))
        .merge(api_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

#[tokio::main]
async fn main() {
    // Fetch console arguments
    let opt = Opt::parse();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", format!("{},hyper=info,mio=info", opt.log_level));
    }
    // Enable console logging
    tracing_subscriber::fmt::init();

    // Register templates
    let handlebars = register_templates().unwrap_or_else(|err| {
        panic!("Failed to register templates!\n{:?}", err);
    });

    // Setup services
    let github_repo_service = GitHubRepoService::with_graphql_url(
        Client::new(),
        opt.github_token,
        &opt.graphql_url,
    );

    let limiter = if opt.api_rate_limit > 0 {
        Some(Arc::new(RateLimiter::new(
            opt.api_rate_limit,
            Duration::from_secs(opt.api_rate_window_secs),
        )))
    } else {
        None
    };

    // Setup controller routes and inject app state
    let app_state = Arc::new(AppState {
        registry: handlebars,
        github_repo_service,
    });
    let router = app(app_state, limiter);

    let sock_addr = SocketAddr::from((
        IpAddr::from_str(opt.addr.as_str()).unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        opt.port
    ));
    log::info!("Now listening on http://{}", sock_addr);

    axum::Server::bind(&sock_addr)
        .serve(router.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .unwrap_or_else(|err| {
            panic!("Server stopped unexpectedly!\n{:?}", err);
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn state_for(server: &MockServer) -> Arc<AppState> {
        Arc::new(AppState {
            registry: register_templates().unwrap(),
            github_repo_service: GitHubRepoService::with_graphql_url(
                Client::new(),
                Some("test-token".into()),
                &format!("{}/graphql", server.uri()),
            ),
        })
    }

    async fn mount_user(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "user": { "repositories": {
                    "pageInfo": { "hasNextPage": false, "endCursor": null },
                    "nodes": [{
                        "id": "R_1",
                        "name": "repo1",
                        "url": "https://github.com/alice/repo1",
                        "primaryLanguage": { "name": "Rust", "color": "#dea584" },
                        "languages": { "edges": [
                            { "size": 900, "node": { "name": "Rust", "color": "#dea584" } },
                            { "size": 100, "node": { "name": "Shell", "color": null } }
                        ] }
                    }]
                } } }
            })))
            .mount(server)
            .await;
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn api_route_returns_json_envelope() {
        let server = MockServer::start().await;
        mount_user(&server).await;

        let response = app(state_for(&server).await, None)
            .oneshot(get("/api/alice"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["username"], json!("alice"));
        assert_eq!(body["repositories"][0]["full_name"], json!("alice/repo1"));
        assert_eq!(body["repositories"][0]["language"], json!("Rust"));
        assert_eq!(body["languageStats"][0]["name"], json!("Rust"));
        assert_eq!(body["languageStats"][1]["color"], json!(null));
    }

    #[tokio::test]
    async fn svg_route_renders_card() {
        let server = MockServer::start().await;
        mount_user(&server).await;

        let response = app(state_for(&server).await, None)
            .oneshot(get("/alice?allAffiliations=true"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/svg+xml");
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let svg = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("GitHub Repositories of alice"));
        assert!(svg.contains("Rust 90.00%"));
        assert!(svg.contains("Shell 10.00%"));
    }

    #[tokio::test]
    async fn unknown_user_is_404() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "user": null } })))
            .mount(&server)
            .await;

        let response = app(state_for(&server).await, None)
            .oneshot(get("/ghost"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "success": false, "error": { "message": "GitHub user not found" } }));
    }

    #[tokio::test]
    async fn api_route_is_rate_limited() {
        let server = MockServer::start().await;
        mount_user(&server).await;

        let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(900)));
        let router = app(state_for(&server).await, Some(limiter));

        let first = router.clone().oneshot(get("/api/alice")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router.clone().oneshot(get("/api/alice")).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key("retry-after"));

        // The SVG route is not limited
        let svg = router.oneshot(get("/alice")).await.unwrap();
        assert_eq!(svg.status(), StatusCode::OK);
    }
}
