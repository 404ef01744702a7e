use clap::Parser;
use hemoscan::core::{CapturedImage, ConfigProvider, Profile};
use hemoscan::utils::{logger, validation::Validate};
use hemoscan::{CaptureSession, CliConfig, GeminiClient, NoCamera, ScanApp, ScanError, SessionState, TomlConfig};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = CliConfig::parse();
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting hemoscan CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if cli.api_key.is_none() {
        cli.api_key = std::env::var("API_KEY").ok();
    }

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let outcome = match cli.config.clone() {
        Some(path) => {
            let mut file_config = match TomlConfig::from_file(&path).and_then(|config| {
                config.validate()?;
                Ok(config)
            }) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("❌ Failed to load config file {}: {}", path, e);
                    eprintln!("❌ {}", e.user_friendly_message());
                    eprintln!("💡 {}", e.recovery_suggestion());
                    std::process::exit(1);
                }
            };

            file_config.apply_flag_overrides(&cli);
            let camera_index = cli.camera_index.or(file_config.camera_index()).unwrap_or(0);

            let profile = build_profile(&cli, Some(&file_config));
            run(file_config, &cli, camera_index, profile).await
        }
        None => {
            let camera_index = cli.camera_index.unwrap_or(0);
            let profile = build_profile(&cli, None);
            run(cli.clone(), &cli, camera_index, profile).await
        }
    };

    if let Err(e) = outcome {
        tracing::error!("❌ Scan flow failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    tracing::info!("✅ hemoscan finished");
    Ok(())
}

async fn run<C: ConfigProvider>(
    config: C,
    cli: &CliConfig,
    camera_index: u32,
    profile: Profile,
) -> hemoscan::Result<()> {
    let profile_id = profile.id.clone();
    let profile_name = profile.name.clone();

    let mut session = SessionState::new();
    session.add_profile(profile)?;
    if cli.demo {
        session.seed_demo_history()?;
        tracing::info!("🧪 Seeded demo scan history");
    }

    let image = match &cli.image {
        Some(path) => {
            tracing::info!("📁 Using uploaded image: {}", path);
            let mut capture = CaptureSession::new(NoCamera, config.jpeg_quality());
            capture.upload(Path::new(path))?;
            capture.take_image().ok_or_else(no_image)?
        }
        None => grab_from_camera(camera_index, config.jpeg_quality())?,
    };

    let client = GeminiClient::new(config);
    let mut app = ScanApp::new(client, session);

    {
        let result = app.run_scan(image).await?;
        println!("✅ Scan complete!");
        println!(
            "🩸 Hemoglobin estimate: {:.1} g/dL ({})",
            result.hemoglobin, result.classification
        );
        println!("   Confidence: {:.0}%", result.confidence * 100.0);
        let features = &result.features;
        println!(
            "   Features: vascular {:.2} | colorimetric {:.2} | textural {:.2} | spectral {:.2}",
            features.vascular_visibility,
            features.colorimetric_index,
            features.textural_analysis,
            features.spectral_reflectance
        );
        if result.confidence == 0.0 {
            println!("⚠️ Analysis service unavailable, placeholder result (not diagnostic).");
        }
    }

    if let Some(summary) = app.session().trend_summary(&profile_id) {
        println!(
            "📈 Trends for {}: {} scan(s), avg {:.1} g/dL, latest {:.1} ({})",
            profile_name,
            summary.scan_count,
            summary.average_hemoglobin,
            summary.latest_hemoglobin,
            summary.latest_classification
        );
    }

    Ok(())
}

fn build_profile(cli: &CliConfig, file_config: Option<&TomlConfig>) -> Profile {
    if let Some(profile) = file_config.and_then(|config| config.profile.as_ref()) {
        Profile::new(
            profile.name.clone(),
            profile.age.unwrap_or(cli.profile_age),
            profile.gender.unwrap_or(cli.profile_gender),
            profile.avatar.clone().unwrap_or_else(|| "👤".to_string()),
        )
    } else {
        Profile::new(
            cli.profile_name.clone(),
            cli.profile_age,
            cli.profile_gender,
            "👤",
        )
    }
}

fn no_image() -> ScanError {
    ScanError::ProcessingError {
        message: "no image captured".to_string(),
    }
}

#[cfg(feature = "camera")]
fn grab_from_camera(camera_index: u32, jpeg_quality: u8) -> hemoscan::Result<CapturedImage> {
    use hemoscan::core::camera::DeviceCamera;

    tracing::info!("📷 Opening camera {}", camera_index);
    let mut capture = CaptureSession::new(DeviceCamera::new(camera_index), jpeg_quality);
    if let Err(e) = capture.start_camera() {
        eprintln!("❌ {}", e.user_message());
        eprintln!("💡 Retry, or fall back to --image <path>");
        return Err(e.into());
    }
    capture.capture_frame()?;
    capture.take_image().ok_or_else(no_image)
}

#[cfg(not(feature = "camera"))]
fn grab_from_camera(_camera_index: u32, _jpeg_quality: u8) -> hemoscan::Result<CapturedImage> {
    Err(ScanError::ConfigError {
        message: "this build has no camera backend; pass --image <path> or rebuild with --features camera"
            .to_string(),
    })
}
