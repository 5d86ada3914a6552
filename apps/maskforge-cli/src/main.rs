use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;

use maskforge_core::compose::pads::DcPadKind;
use maskforge_core::{with_document, Document, LayoutKind, Point, ShapeCollection};
use maskforge_io::{export_dxf, export_gds, load_glyph_table, JobConfig};
use maskforge_render::{save_svg, SvgOptions};

/// Build a photomask layout and write it out as DXF, GDS-II and SVG.
#[derive(Parser)]
#[command(version, about)]
pub struct Args {
    /// Layout to build: alignment_mark, coplanar_1 .. coplanar_4 or coplanar_2_magnet.
    ///
    /// Overrides the job file's layout.
    layout: Option<LayoutKind>,

    /// JSON job file with parameters, layers and outputs.
    #[arg(short, long)]
    job: Option<PathBuf>,

    /// Document and library name.
    #[arg(short, long)]
    name: Option<String>,

    /// Bottom-left of the first probe pad, as `x,y` in µm.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    origin: Option<Point>,

    /// Attach DC bias pads: offset_left, offset_right, stub or wedge.
    #[arg(long)]
    dc_pad: Option<DcPadKind>,

    /// Glyph table (JSON) for labels.
    #[arg(long)]
    glyphs: Option<PathBuf>,

    #[arg(long)]
    dxf: Option<PathBuf>,

    #[arg(long)]
    gds: Option<PathBuf>,

    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write the named shape collection as JSON.
    #[arg(long)]
    shapes: Option<PathBuf>,

    /// Add to an existing DXF file instead of starting a new one.
    #[arg(long)]
    append: bool,

    /// List the available layouts and exit.
    #[arg(long)]
    list: bool,

    /// Log every committed polyline.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{}`", s))?;
    let coord = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("bad coordinate `{}`: {}", v, e));
    Ok(Point::new(coord(x)?, coord(y)?))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if args.list {
        for kind in LayoutKind::ALL {
            println!("{}", kind);
        }
        return Ok(());
    }

    let job = job_from_args(&args)?;
    run(&job)
}

/// Merge the job file (if any) with the command line flags.
fn job_from_args(args: &Args) -> anyhow::Result<JobConfig> {
    let mut job = match (&args.job, args.layout) {
        (Some(path), _) => {
            JobConfig::load(path).with_context(|| format!("Failed to load job file {}", path.display()))?
        }
        (None, Some(kind)) => JobConfig::new(&kind.to_string(), kind),
        (None, None) => bail!("Give a layout name or a job file (see --list)"),
    };

    if let Some(kind) = args.layout {
        job.layout = kind;
    }
    if let Some(name) = &args.name {
        job.name = name.clone();
    }
    if let Some(origin) = args.origin {
        job.params.origin = origin;
    }
    if args.dc_pad.is_some() {
        job.params.dc_pad = args.dc_pad;
    }
    if args.glyphs.is_some() {
        job.glyphs = args.glyphs.clone();
    }
    if args.append {
        job.reset = false;
    }
    let outputs = &mut job.outputs;
    for (flag, slot) in [
        (&args.dxf, &mut outputs.dxf),
        (&args.gds, &mut outputs.gds),
        (&args.svg, &mut outputs.svg),
        (&args.shapes, &mut outputs.shapes),
    ] {
        if flag.is_some() {
            *slot = flag.clone();
        }
    }
    if job.outputs.is_empty() {
        job.outputs.dxf = Some(PathBuf::from(format!("{}.dxf", job.name)));
    }
    Ok(job)
}

fn run(job: &JobConfig) -> anyhow::Result<()> {
    let glyphs = job
        .glyphs
        .as_deref()
        .map(load_glyph_table)
        .transpose()
        .context("Failed to load glyph table")?;

    let mut doc = Document::new(&job.name);
    for spec in &job.layers {
        spec.apply(&mut doc.layer_stack);
    }
    // The document starts empty; keeping it lets the layer table above survive.
    let shapes: ShapeCollection = with_document(&mut doc, false, |d| {
        d.layout(job.layout, &job.params, glyphs.as_ref())
    })
    .with_context(|| format!("Failed to build layout {}", job.layout))?;

    let outputs = &job.outputs;
    if let Some(path) = &outputs.dxf {
        create_parent(path)?;
        export_dxf(&doc, path, job.reset).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    if let Some(path) = &outputs.gds {
        create_parent(path)?;
        export_gds(&doc, path).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    if let Some(path) = &outputs.svg {
        create_parent(path)?;
        save_svg(&doc, path, &SvgOptions::default()).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    if let Some(path) = &outputs.shapes {
        create_parent(path)?;
        fs::write(path, shapes.to_json()?).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    log::info!(
        "{}: {} polylines on {} layers, {} named components",
        job.name,
        doc.len(),
        doc.layer_stack.layer_count(),
        shapes.len()
    );
    Ok(())
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("10,-2.5").unwrap(), Point::new(10.0, -2.5));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,1").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from(["maskforge", "coplanar_2", "--dc-pad", "stub", "--origin", "-5,7", "--gds", "out.gds"]);
        let job = job_from_args(&args).unwrap();
        assert_eq!(job.layout, LayoutKind::Coplanar2);
        assert_eq!(job.name, "coplanar_2");
        assert_eq!(job.params.coplanar.long_straight_length, 1000.0);
        assert_eq!(job.params.dc_pad, Some(DcPadKind::Stub));
        assert_eq!(job.params.origin, Point::new(-5.0, 7.0));
        assert_eq!(job.outputs.gds, Some(PathBuf::from("out.gds")));
        assert!(job.outputs.dxf.is_none());
        assert!(job.reset);
    }

    #[test]
    fn test_default_output_is_dxf() {
        let args = Args::parse_from(["maskforge", "alignment_mark", "--append"]);
        let job = job_from_args(&args).unwrap();
        assert_eq!(job.outputs.dxf, Some(PathBuf::from("alignment_mark.dxf")));
        assert!(!job.reset);
    }

    #[test]
    fn test_layout_or_job_required() {
        let args = Args::parse_from(["maskforge"]);
        assert!(job_from_args(&args).is_err());
    }

    #[test]
    fn test_run_writes_every_output() {
        let dir = std::env::temp_dir().join(format!("maskforge-cli-{}", std::process::id()));
        let mut job = JobConfig::new("chip", LayoutKind::Coplanar3);
        job.outputs.dxf = Some(dir.join("chip.dxf"));
        job.outputs.gds = Some(dir.join("chip.gds"));
        job.outputs.svg = Some(dir.join("chip.svg"));
        job.outputs.shapes = Some(dir.join("chip.json"));
        run(&job).unwrap();
        for ext in ["dxf", "gds", "svg", "json"] {
            assert!(dir.join(format!("chip.{}", ext)).exists(), "missing {}", ext);
        }
        let _ = fs::remove_dir_all(&dir);
    }
}
