use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{extract::State, http::StatusCode, routing, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::Mutex};
use tracing::{info, warn};
use url::Url;

pub const SEND_ROUTE: &str = "/api/v1.0/email/send";

/// Messages containing this marker are answered with a server error.
pub const FAILURE_MARKER: &str = "[simulate-failure]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParams {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Every message the mock server accepted, in order of arrival.
#[derive(Debug, Clone, Default)]
pub struct Mailbox(Arc<Mutex<Vec<TemplateParams>>>);

impl Mailbox {
    pub async fn messages(&self) -> Vec<TemplateParams> {
        self.0.lock().await.clone()
    }
}

struct AppState {
    credentials: Credentials,
    mailbox: Mailbox,
}

pub fn router(credentials: Credentials, mailbox: Mailbox) -> Router<()> {
    Router::new()
        .route(SEND_ROUTE, routing::post(send))
        .with_state(Arc::new(AppState {
            credentials,
            mailbox,
        }))
}

pub async fn start_server(host: IpAddr, port: u16, credentials: Credentials) -> anyhow::Result<()> {
    info!("Starting EmailJS testing server on {host}:{port}");
    info!("Send endpoint: http://{host}:{port}{SEND_ROUTE}");
    info!("Service ID: {:?}", credentials.service_id);
    info!("Template ID: {:?}", credentials.template_id);
    info!("Public key: {:?}", credentials.public_key);
    info!("Messages containing {FAILURE_MARKER:?} are rejected with status 500");

    let mailbox = Mailbox::default();
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))?;
    axum::serve(listener, router(credentials, mailbox.clone()))
        .await
        .context("Failed to start HTTP server")
}

/// Starts the server on a random local port in the background and returns
/// the send endpoint together with the mailbox.
pub async fn spawn(credentials: Credentials) -> anyhow::Result<(Url, Mailbox)> {
    let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
        .await
        .context("Failed to bind to a local port")?;
    let addr = listener.local_addr()?;

    let mailbox = Mailbox::default();
    let router = router(credentials, mailbox.clone());
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router).await {
            warn!("EmailJS testing server stopped: {err}");
        }
    });

    let endpoint = format!("http://{addr}{SEND_ROUTE}").parse()?;
    Ok((endpoint, mailbox))
}

#[derive(Deserialize)]
struct SendRequest {
    service_id: String,
    template_id: String,
    user_id: String,
    template_params: TemplateParams,
}

async fn send(
    state: State<Arc<AppState>>,
    Json(request): Json<SendRequest>,
) -> (StatusCode, &'static str) {
    let credentials = &state.credentials;
    if request.service_id != credentials.service_id {
        return (StatusCode::BAD_REQUEST, "The service ID is invalid");
    }
    if request.template_id != credentials.template_id {
        return (StatusCode::BAD_REQUEST, "The template ID not found");
    }
    if request.user_id != credentials.public_key {
        return (StatusCode::BAD_REQUEST, "The Public Key is invalid");
    }
    if request.template_params.message.contains(FAILURE_MARKER) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Simulated failure");
    }

    info!(
        name = %request.template_params.name,
        email = %request.template_params.email,
        "Received contact message"
    );
    state.mailbox.0.lock().await.push(request.template_params);

    (StatusCode::OK, "OK")
}
