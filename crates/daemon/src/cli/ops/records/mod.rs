use clap::{Args, Subcommand};

pub mod download;
pub mod get;
pub mod list;
pub mod upload;

use crate::cli::op::Op;
use medseal_daemon::http_server::api::v0::records::{GetRequest, ListRequest, UploadRequest};

crate::command_enum! {
    (Upload, UploadRequest),
    (List, ListRequest),
    (Get, GetRequest),
    (Download, download::Download),
}

pub type RecordsCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Records {
    #[command(subcommand)]
    pub command: RecordsCommand,
}

#[async_trait::async_trait]
impl Op for Records {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

pub(crate) fn record_line(record: &medseal_daemon::database::Record) -> String {
    let sent = if *record.is_encrypted { "sent" } else { "-" };
    format!(
        "{} {} {} {} ({} bytes) {}",
        record.id,
        record.created_at,
        record.record_type,
        record.original_file_name,
        record.size_bytes,
        sent
    )
}
