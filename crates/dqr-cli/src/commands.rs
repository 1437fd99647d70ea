//! Subcommand handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use dqr_client::{
    get_api_status, ClientConfig, Credentials, GenerateOptions, ImageQrClient, Payload, QrClient,
    QrCodeRecord,
};
use dqr_image::{FaceDetector, LogoImage};
use dqr_models::field::kind_of;
use dqr_models::{FieldKind, FieldValue, GeneratedQrCode, UPDATE_FIELDS};
use image::Rgb;
use tracing::info;

use crate::{Cli, Commands, Identity, QrStyle};

pub async fn run(cli: Cli) -> Result<()> {
    let json = cli.json;

    match cli.command {
        Commands::Status => {
            let status = get_api_status().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else if status.is_up() {
                println!("API is up ({})", status.status_code);
            } else {
                println!("API is unreachable ({}): {:?}", status.status_code, status.details.get("info"));
            }
        }

        Commands::Generate {
            link,
            product_name,
            qrcode_type,
            logo,
            style,
        } => {
            let client = connect(&cli.identity)?;
            let mut options = apply_style(GenerateOptions::new(link), &style).qrcode_type(qrcode_type);
            options.product_name = product_name;
            options.logo = logo;

            if json {
                print_records(&client.generate_qrcode_verbose(&options).await?)?;
            } else {
                print_generated(&client.generate_qrcode(&options).await?);
            }
            client.end_session();
        }

        Commands::GenerateImage { image, name, style } => {
            let client = ImageQrClient::new(connect(&cli.identity)?, face_detector()?);
            let options = apply_style(GenerateOptions::default(), &style);

            if json {
                let records = client
                    .generate_qrcode_verbose(image.as_path(), name.as_deref(), &options)
                    .await?;
                print_records(&records)?;
            } else {
                let generated = client
                    .generate_qrcode(image.as_path(), name.as_deref(), &options)
                    .await?;
                print_generated(&generated);
            }
        }

        Commands::Update { qrcode_id, fields } => {
            let client = connect(&cli.identity)?;
            let payload = parse_assignments(&fields)?;

            if json {
                print_record(&client.update_qrcode_verbose(&qrcode_id, payload).await?)?;
            } else {
                println!("{}", client.update_qrcode(&qrcode_id, payload).await?);
            }
        }

        Commands::Get { qrcode_id } => {
            let client = connect(&cli.identity)?;
            if json {
                print_record(&client.get_qrcode_record(&qrcode_id).await?)?;
            } else {
                println!("{}", client.get_qrcode(&qrcode_id).await?);
            }
        }

        Commands::List => {
            let client = connect(&cli.identity)?;
            let records = client.get_qrcodes().await?;
            if json {
                print_records(&records)?;
            } else {
                for record in &records {
                    println!(
                        "{}\t{}\t{}\t{}",
                        record.qrcode_id,
                        if record.is_active { "active" } else { "inactive" },
                        record.link.as_deref().unwrap_or("-"),
                        record.qrcode_image_url.as_deref().unwrap_or("-"),
                    );
                }
            }
        }

        Commands::Activate { qrcode_id } => {
            connect(&cli.identity)?.activate_qrcode(&qrcode_id).await?;
            println!("QR code {} activated", qrcode_id);
        }

        Commands::Deactivate { qrcode_id } => {
            connect(&cli.identity)?.deactivate_qrcode(&qrcode_id).await?;
            println!("QR code {} deactivated", qrcode_id);
        }

        Commands::Download { url, dir } => {
            let client = connect(&cli.identity)?;
            let written = client.download_qrcode(&url, &dir).await?;
            println!("{}", written.display());
        }

        Commands::Faces { image, markout } => {
            let detector = face_detector()?;
            count_faces(&image, markout.as_deref(), detector.as_ref())?;
        }
    }

    Ok(())
}

fn connect(identity: &Identity) -> Result<QrClient> {
    let username = identity
        .username
        .clone()
        .ok_or_else(|| anyhow!("--username or DOWELL_QR_USERNAME is required"))?;
    let user_id = identity
        .user_id
        .clone()
        .ok_or_else(|| anyhow!("--user-id or DOWELL_QR_USER_ID is required"))?;
    let api_key = identity.api_key.clone().filter(|key| !key.is_empty());

    let client = QrClient::new(
        Credentials::new(username, user_id, api_key),
        ClientConfig::from_env(),
    )?;
    info!("Using QR code API at {}", client.config().base_url);
    Ok(client)
}

fn apply_style(options: GenerateOptions, style: &QrStyle) -> GenerateOptions {
    options
        .quantity(style.quantity)
        .logo_size(style.logo_size)
        .color(style.color.clone())
        .description(style.description.clone())
        .active(style.active)
}

/// Parse `field=value` pairs, typing each value by the update field table.
/// Unknown fields are kept as text so the client reports them.
pub fn parse_assignments(assignments: &[String]) -> Result<Payload> {
    let mut payload = Payload::new();

    for assignment in assignments {
        let (field, raw) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected FIELD=VALUE, got `{}`", assignment))?;
        let field = field.trim();

        let value = match kind_of(UPDATE_FIELDS, field) {
            Some(FieldKind::Integer) => FieldValue::Integer(
                raw.trim()
                    .parse()
                    .with_context(|| format!("`{}` expects an integer", field))?,
            ),
            Some(FieldKind::Boolean) => FieldValue::Boolean(
                parse_bool(raw).ok_or_else(|| anyhow!("`{}` expects true or false", field))?,
            ),
            Some(FieldKind::Text) | None => FieldValue::Text(raw.to_string()),
        };
        payload.insert(field, value);
    }

    Ok(payload)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn count_faces(path: &Path, markout: Option<&Path>, detector: &dyn FaceDetector) -> Result<()> {
    let mut image = LogoImage::open(path)?;
    let faces = image.find_faces(detector, &Default::default())?;
    println!("{} face(s) found in {}", faces.len(), image.name());

    if let Some(target) = markout {
        image.markout_faces(&faces, Rgb([0, 255, 0]));
        let written = image.save(Some(target), 100)?;
        println!("{}", written.display());
    }
    Ok(())
}

#[cfg(feature = "opencv")]
fn face_detector() -> Result<Arc<dyn FaceDetector>> {
    Ok(Arc::new(dqr_image::HaarCascadeDetector::new()?))
}

#[cfg(not(feature = "opencv"))]
fn face_detector() -> Result<Arc<dyn FaceDetector>> {
    anyhow::bail!("face detection is unavailable: dqr was built without the `opencv` feature")
}

fn print_generated(generated: &[GeneratedQrCode]) {
    for qrcode in generated {
        println!("{}\t{}", qrcode.qrcode_id, qrcode.image_url);
    }
}

fn print_record(record: &QrCodeRecord) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

fn print_records(records: &[QrCodeRecord]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}
