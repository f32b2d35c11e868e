use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use printcrop_core::{encode_jpeg, encode_png, CropExport};
use tracing::{debug, info};

use super::{build_session, EditArgs};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Png,
    Jpeg,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Jpeg => "jpg",
        }
    }

    /// Guess from a file extension.
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Format::Png),
            "jpg" | "jpeg" => Some(Format::Jpeg),
            _ => None,
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub edit: EditArgs,

    /// Output file; defaults to crop_{w}x{h}_px.{ext} in the current directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format; inferred from the output extension when omitted
    #[arg(long, value_enum)]
    pub format: Option<Format>,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = 95)]
    pub quality: u8,
}

fn encode(export: &CropExport, format: Format, quality: u8) -> Result<Vec<u8>> {
    let bytes = match format {
        Format::Png => encode_png(export)?,
        Format::Jpeg => encode_jpeg(export, quality)?,
    };
    Ok(bytes)
}

pub fn run(args: &ExportArgs) -> Result<()> {
    let session = build_session(&args.edit)?;
    let export = session.request_export()?;

    let format = match (args.format, args.output.as_deref()) {
        (Some(format), _) => format,
        (None, Some(path)) => match Format::from_path(path) {
            Some(format) => format,
            None => bail!("Cannot infer format from {}; pass --format", path.display()),
        },
        (None, None) => Format::default(),
    };
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(export.suggested_filename(format.extension())));

    debug!(?format, quality = args.quality, "encoding crop");
    let bytes = encode(&export, format, args.quality)?;
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "crop written");

    let crop = session.crop();
    println!(
        "Exported {}x{} px crop ({:.2}in x {:.2}in) to {}",
        export.width,
        export.height,
        crop.width_in,
        crop.height_in,
        path.display()
    );
    Ok(())
}
