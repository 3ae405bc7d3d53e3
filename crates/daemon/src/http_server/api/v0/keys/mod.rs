use axum::routing::{get, post};
use axum::Router;

pub mod download;
pub mod list;
pub mod publish;

pub use download::DownloadError;
pub use list::{ListRequest, ListResponse};
pub use publish::{PublishRequest, PublishResponse};

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", post(publish::handler))
        .route("/list", post(list::handler))
        .route("/:id/pem", get(download::handler))
        .with_state(state)
}
