use axum::routing::{get, post};
use axum::Router;

pub mod download;
pub mod get;
pub mod list;
pub mod upload;

pub use get::GetRequest;
pub use list::{ListRequest, ListResponse};
pub use upload::{UploadRequest, UploadResponse};

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", post(upload::handler))
        .route("/list", post(list::handler))
        .route("/:id", get(get::handler))
        .route("/:id/download", get(download::handler))
        .with_state(state)
}
