pub mod config;
pub mod export;
pub mod preview;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use printcrop_core::{
    parse_size, CropRegion, EditorConfig, FitMode, ManualScheduler, SessionState,
    MAX_RASTER_PIXELS,
};
use tracing::{debug, info};

/// Session settings shared by every rendering command.
#[derive(Args, Debug, Default)]
pub struct EditArgs {
    /// Input image (JPEG or PNG)
    pub file: PathBuf,

    /// TOML configuration file (see `printcrop config`)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Paper size, e.g. "4x6" or "100mm x 150mm"
    #[arg(long)]
    pub paper: Option<String>,

    /// Print resolution in dots per inch
    #[arg(long)]
    pub dpi: Option<f64>,

    /// Screen height the canvas is fitted to, in pixels
    #[arg(long)]
    pub screen_height: Option<f64>,

    /// Crop preset name or size, e.g. "passport" or "35mm x 45mm"
    #[arg(long)]
    pub crop: Option<String>,

    /// Fill the canvas instead of fitting the whole image
    #[arg(long)]
    pub fill: bool,

    /// Zoom factor around the canvas center (2.0 = twice as large)
    #[arg(long)]
    pub zoom: Option<f64>,

    /// Pan in canvas pixels: "dx,dy"
    #[arg(long, allow_hyphen_values = true)]
    pub pan: Option<String>,

    /// Clarity (-100 to 100)
    #[arg(long, allow_hyphen_values = true)]
    pub clarity: Option<f64>,

    /// Brightness (-100 to 100)
    #[arg(long, allow_hyphen_values = true)]
    pub brightness: Option<f64>,

    /// Contrast (-100 to 100)
    #[arg(long, allow_hyphen_values = true)]
    pub contrast: Option<f64>,
}

pub fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = toml::from_str(&text)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

fn parse_pan(input: &str) -> Result<(f64, f64)> {
    let parts: Vec<f64> = input
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .context("Invalid pan format (expected 'dx,dy')")?;
    if parts.len() != 2 {
        bail!("Pan requires exactly 2 values: dx,dy");
    }
    Ok((parts[0], parts[1]))
}

/// Load the image and apply every setting, in the order a user would.
pub fn build_session(args: &EditArgs) -> Result<SessionState> {
    let mut config = load_config(args.config.as_deref())?;
    if args.fill {
        config.fit_mode = FitMode::Fill;
    }
    if let Some(height) = args.screen_height {
        config.available_screen_height_px = height;
    }
    let mut session = SessionState::new(&config);

    if let Some(ref paper) = args.paper {
        let (w, h) = parse_size(paper).with_context(|| format!("Invalid paper size '{paper}'"))?;
        session = session.set_paper(w, h);
        if (session.paper().width_in, session.paper().height_in) != (w, h) {
            bail!("Paper '{paper}' exceeds the {MAX_RASTER_PIXELS} pixel limit");
        }
    }
    if let Some(dpi) = args.dpi {
        if !(dpi.is_finite() && dpi > 0.0) {
            bail!("DPI must be positive, got {dpi}");
        }
        session = session.set_dpi(dpi);
        if session.paper().dpi != dpi {
            bail!("DPI {dpi} exceeds the {MAX_RASTER_PIXELS} pixel limit");
        }
    }
    if let Some(ref crop) = args.crop {
        let Some(region) = CropRegion::from_preset(crop) else {
            bail!("Unknown crop preset or size '{crop}'");
        };
        if !session.accepts_crop(&region) {
            bail!("Crop '{crop}' exceeds the {MAX_RASTER_PIXELS} pixel limit");
        }
        session = session.apply_crop_preset(crop);
    }

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    session = session
        .load_bytes(&bytes)
        .with_context(|| format!("Failed to decode {}", args.file.display()))?;
    info!(
        file = %args.file.display(),
        canvas = ?session.canvas_size(),
        crop = ?session.crop_rect(),
        "session ready"
    );

    if let Some(zoom) = args.zoom {
        let scale = session.transform().scale * zoom;
        session = session.set_scale(scale);
    }
    if let Some(ref pan) = args.pan {
        let (dx, dy) = parse_pan(pan)?;
        session = session.pan(dx, dy);
    }

    let mut scheduler = ManualScheduler::new();
    if let Some(clarity) = args.clarity {
        session = session.set_clarity_immediate(clarity, &mut scheduler);
    }
    if let Some(brightness) = args.brightness {
        session = session.set_brightness(brightness);
    }
    if let Some(contrast) = args.contrast {
        session = session.set_contrast(contrast);
    }

    Ok(session)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pan() {
        assert_eq!(parse_pan("10,-5").unwrap(), (10.0, -5.0));
        assert_eq!(parse_pan(" 1.5 , 2 ").unwrap(), (1.5, 2.0));
        assert!(parse_pan("10").is_err());
        assert!(parse_pan("a,b").is_err());
    }

    #[test]
    fn test_build_session_applies_settings() {
        let dir = tempfile::tempdir().unwrap();
        let file = test_support::write_png(dir.path(), 300, 300, [10, 20, 30]);
        let args = EditArgs {
            file,
            crop: Some("passport".into()),
            brightness: Some(15.0),
            clarity: Some(40.0),
            zoom: Some(2.0),
            ..Default::default()
        };

        let session = build_session(&args).unwrap();
        assert!(session.is_loaded());
        assert_eq!(session.crop().width_in, 1.38);
        assert_eq!(session.filter_parameters().clarity, 40.0);
        assert_eq!(session.brightness(), 15.0);
        // Fit on 600x900 gives 2.0, zoomed twice
        assert!((session.transform().scale - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_build_session_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let file = test_support::write_png(dir.path(), 4, 4, [0, 0, 0]);

        let bad_crop = EditArgs {
            file: file.clone(),
            crop: Some("huge".into()),
            ..Default::default()
        };
        assert!(build_session(&bad_crop).is_err());

        let bad_paper = EditArgs {
            file: file.clone(),
            paper: Some("0x6".into()),
            ..Default::default()
        };
        assert!(build_session(&bad_paper).is_err());

        let huge_crop = EditArgs {
            file: file.clone(),
            crop: Some("2000x2000".into()),
            ..Default::default()
        };
        let err = build_session(&huge_crop).unwrap_err();
        assert!(err.to_string().contains("pixel limit"), "{err}");

        let huge_paper = EditArgs {
            file: file.clone(),
            paper: Some("400x600".into()),
            ..Default::default()
        };
        assert!(build_session(&huge_paper).is_err());

        let missing = EditArgs {
            file: dir.path().join("missing.png"),
            ..Default::default()
        };
        assert!(build_session(&missing).is_err());
    }

    #[test]
    fn test_load_config_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printcrop.toml");
        std::fs::write(&path, "dpi = 600.0\nfit_mode = \"fill\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.dpi, 600.0);
        assert_eq!(config.fit_mode, FitMode::Fill);
        assert_eq!(config.paper, EditorConfig::default().paper);

        std::fs::write(&path, "dpi = \"lots\"").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
