//! `dqr`, the command-line client for the Dowell QR code generator API.
//!
//! Credentials come from flags or `DOWELL_QR_USERNAME`, `DOWELL_QR_USER_ID`
//! and `DOWELL_QR_API_KEY` (a `.env` file is honoured).

mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::error;

/// Dowell QR code CLI.
#[derive(Parser, Debug)]
#[command(name = "dqr", version, about = "Dowell QR code generator client")]
pub struct Cli {
    #[command(flatten)]
    pub identity: Identity,

    /// Print full API records as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct Identity {
    /// User name, recorded as the QR code creator.
    #[arg(long, env = "DOWELL_QR_USERNAME", global = true)]
    pub username: Option<String>,

    /// User id, used as the company id.
    #[arg(long, env = "DOWELL_QR_USER_ID", global = true)]
    pub user_id: Option<String>,

    /// Dowell API key.
    #[arg(long, env = "DOWELL_QR_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Fields shared by the generate commands.
#[derive(Args, Debug, Clone)]
pub struct QrStyle {
    /// Number of QR codes to create.
    #[arg(long, default_value_t = 1)]
    pub quantity: i64,

    /// Logo size.
    #[arg(long, default_value_t = 20)]
    pub logo_size: i64,

    /// QR code color as hex.
    #[arg(long, default_value = "#000000")]
    pub color: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Create the QR code already activated.
    #[arg(long)]
    pub active: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the API status.
    Status,

    /// Create QR codes for a link.
    Generate {
        /// Target URL.
        link: String,
        #[arg(long)]
        product_name: Option<String>,
        /// QR code type.
        #[arg(long = "type", default_value = "Link")]
        qrcode_type: String,
        /// Logo image file to embed.
        #[arg(long)]
        logo: Option<PathBuf>,
        #[command(flatten)]
        style: QrStyle,
    },

    /// Create QR codes that resolve to an image with a face.
    GenerateImage {
        /// Image file.
        image: PathBuf,
        /// Name to upload the image under.
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        style: QrStyle,
    },

    /// Update fields of a QR code.
    Update {
        qrcode_id: String,
        /// Field assignment such as `description=Spring sale`. Repeatable.
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Show a QR code.
    Get { qrcode_id: String },

    /// List all QR codes of the user.
    List,

    Activate { qrcode_id: String },

    Deactivate { qrcode_id: String },

    /// Download a QR code image.
    Download {
        url: String,
        /// Target directory.
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Count faces in an image.
    Faces {
        image: PathBuf,
        /// Save a copy with the faces outlined.
        #[arg(long)]
        markout: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Provider may already be installed by a dependency.
    let _ = rustls::crypto::ring::default_provider().install_default();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = commands::run(cli).await {
        error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "dqr",
            "--username",
            "alice",
            "--user-id",
            "u-1",
            "generate",
            "https://example.com",
            "--quantity",
            "3",
            "--active",
        ])
        .unwrap();

        assert_eq!(cli.identity.username.as_deref(), Some("alice"));
        match cli.command {
            Commands::Generate {
                link,
                qrcode_type,
                style,
                ..
            } => {
                assert_eq!(link, "https://example.com");
                assert_eq!(qrcode_type, "Link");
                assert_eq!(style.quantity, 3);
                assert!(style.active);
                assert_eq!(style.color, "#000000");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_update_requires_fields() {
        assert!(Cli::try_parse_from(["dqr", "update", "42"]).is_err());
        let cli = Cli::try_parse_from(["dqr", "--json", "update", "42", "--set", "is_active=true"]).unwrap();
        assert!(cli.json);
    }
}
