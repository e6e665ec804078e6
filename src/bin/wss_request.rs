//! Send a single request through a WSS.
//!
//! The WSS itself is configured from the environment (see `WssConfig::from_env`).
//!
//! ```sh
//! export WSS_URL='https://wss.example.org/wss'
//! export WSS_USERNAME=alice WSS_PASSWORD=s3cret
//!
//! # list the authentication methods and the secured service type
//! wss-request capabilities
//!
//! # tunnel a request, writing the response body to stdout
//! wss-request send HTTP_GET 'SERVICE=WMS&VERSION=1.1.1&REQUEST=GetCapabilities' \
//!     --facade-url http://example.org/wms > caps.xml
//! WSS_FACADE_URL=http://example.org/wfs wss-request send HTTP_POST "$(cat get-feature.xml)" > features.xml
//! ```

use std::io::Write;
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wss_accessor::{DcpType, WssClient, WssConfig};

#[derive(Parser, Debug)]
#[command(name = "wss-request")]
#[command(about = "Send a request through a Web Security Service")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the WSS capabilities as JSON
    Capabilities,

    /// Tunnel a request to the secured service and write the response to stdout
    Send {
        /// How the request is carried: HTTP_GET or HTTP_POST
        #[arg(value_parser = DcpType::from_str)]
        dcp_type: DcpType,

        /// Key-value query (HTTP_GET) or request document (HTTP_POST)
        request: String,

        /// Address of the secured service behind the WSS
        #[arg(long, env = "WSS_FACADE_URL")]
        facade_url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match WssConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!();
            eprintln!("  Set WSS_URL, and optionally WSS_USERNAME/WSS_PASSWORD,");
            eprintln!("  WSS_SESSION_ID or WSS_SAML for authentication.");
            return ExitCode::FAILURE;
        }
    };

    let client = match WssClient::from_config(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: failed to create client: {e}");
            return ExitCode::FAILURE;
        }
    };

    match args.command {
        Command::Capabilities => print_capabilities(&client).await,
        Command::Send {
            dcp_type,
            request,
            facade_url,
        } => send(&client, dcp_type, &request, &facade_url).await,
    }
}

async fn send(client: &WssClient, dcp_type: DcpType, request: &str, facade_url: &str) -> ExitCode {
    let result = client.do_service(dcp_type, request, facade_url).await;

    if let Err(e) = client.close_session().await {
        tracing::warn!(error = %e, "Closing the session failed");
    }

    match result {
        Ok(payload) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(payload.as_bytes()).and_then(|_| stdout.flush()) {
                eprintln!("Error: failed to write response: {e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn print_capabilities(client: &WssClient) -> ExitCode {
    let Some(capabilities) = client.capabilities().await else {
        eprintln!("Error: could not read the capabilities of the WSS");
        return ExitCode::FAILURE;
    };

    match serde_json::to_string_pretty(&capabilities) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
