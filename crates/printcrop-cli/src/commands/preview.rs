use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use printcrop_core::{encode_png, CropExport, FilterWorker, Raster, SessionState};
use tracing::{debug, info, warn};

use super::{build_session, EditArgs};

#[derive(Args, Debug)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub edit: EditArgs,

    /// Output PNG file
    #[arg(short, long, default_value = "preview.png")]
    pub output: PathBuf,
}

/// Render the preview, running the filter pass on the worker pool.
fn render(session: &SessionState) -> Raster {
    let params = session.filter_parameters();
    let canvas = session.render_canvas();
    if params.is_identity() {
        return session.finish_preview(canvas);
    }

    let mut worker = FilterWorker::new();
    let generation = worker.submit(canvas, params);
    debug!(generation, ?params, "filter pass submitted");
    match worker.wait_latest() {
        Some(result) => session.finish_preview(result.raster),
        None => {
            warn!(generation, "background filter failed, rendering inline");
            session.render_preview()
        }
    }
}

pub fn run(args: &PreviewArgs) -> Result<()> {
    let session = build_session(&args.edit)?;
    let raster = render(&session);

    let png = encode_png(&CropExport::from_raster(&raster))?;
    std::fs::write(&args.output, png)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!(path = %args.output.display(), "preview written");

    let t = session.transform();
    println!(
        "Preview {}x{} (scale {:.3}, offset {:.1},{:.1}) written to {}",
        raster.width,
        raster.height,
        t.scale,
        t.offset_x,
        t.offset_y,
        args.output.display()
    );
    Ok(())
}
