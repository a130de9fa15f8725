use std::process;

use wppq::cli::{build_cli, handlers};

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    if let Err(err) = handlers::dispatch(&matches).await {
        let core = err.downcast_ref::<wppq_core::Error>();
        tracing::error!(error = %err, "Command failed");

        #[allow(clippy::print_stderr)]
        {
            eprintln!(
                "Error: {}",
                core.map_or_else(|| err.to_string(), wppq_core::Error::user_message)
            );
        }

        let code = core.map_or(1, wppq_core::Error::exit_code);
        #[allow(clippy::exit)]
        process::exit(code);
    }
}
