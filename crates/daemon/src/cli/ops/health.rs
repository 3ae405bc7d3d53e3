use clap::Args;

use medseal_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

fn probe_line(name: &str, result: Result<Vec<u8>, impl std::fmt::Display>) -> String {
    match result {
        Ok(_) => format!("  {}: OK", name),
        Err(e) => format!("  {}: UNHEALTHY ({})", name, e),
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = std::convert::Infallible;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = vec!["Config:".to_string()];

        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:       {}", state.medseal_dir.display()));
                lines.push("  config.toml:     OK".to_string());
                lines.push("  db.sqlite:       OK".to_string());
                lines.push(match state.load_signing_key() {
                    Ok(_) => "  signing_key.pem: OK".to_string(),
                    Err(e) => format!("  signing_key.pem: {}", e),
                });
                lines.push(format!("  api_port:        {}", state.config.api_port));
                lines.push(format!(
                    "  auto_send:       {}",
                    state.config.auto_send_on_upload
                ));
            }
            Err(e) => lines.push(format!("  error: {}", e)),
        }

        lines.push(String::new());
        lines.push(format!("Daemon ({}):", ctx.client.base_url()));
        lines.push(probe_line(
            "livez ",
            ctx.client.get_bytes("/_status/livez").await,
        ));
        lines.push(probe_line(
            "readyz",
            ctx.client.get_bytes("/_status/readyz").await,
        ));

        Ok(lines.join("\n"))
    }
}
