use std::net::IpAddr;

use anyhow::Context;
use axum::Router;
use portfolio_core_contact_contracts::ContactService;
use tokio::net::TcpListener;

mod middlewares;
mod models;
mod routes;

/// The relay server. Holds the contact service, and with it the bot
/// credential, so browsers never see it.
#[derive(Debug, Clone)]
pub struct RestServer<Contact> {
    contact: Contact,
}

impl<Contact> RestServer<Contact>
where
    Contact: ContactService,
{
    pub fn new(contact: Contact) -> Self {
        Self { contact }
    }

    pub async fn serve(self, host: IpAddr, port: u16) -> anyhow::Result<()> {
        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("Failed to bind to {host}:{port}"))?;
        self.serve_on(listener).await
    }

    /// Serves on an already bound listener.
    pub async fn serve_on(self, listener: TcpListener) -> anyhow::Result<()> {
        let router = self.router();
        axum::serve(listener, router).await.map_err(Into::into)
    }

    fn router(self) -> Router<()> {
        let router = Router::new()
            .merge(routes::health::router())
            .merge(routes::contact::router(self.contact.into()));

        let router = middlewares::trace::add(router);
        middlewares::request_id::add(router)
    }
}
