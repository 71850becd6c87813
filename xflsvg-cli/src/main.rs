use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use xflsvg::{
    BatchOpts, Document, FrameIndex, FrameRange, Project, ProjectSource, Renderer, RendererOpts,
    TimelineKind,
};

#[derive(Parser, Debug)]
#[command(name = "xflsvg", version, about = "Convert Adobe Animate XFL to SVG.")]
struct Cli {
    /// Directory of an unzipped XFL project (or a project JSON file).
    project: PathBuf,

    /// Timeline to render (scene or symbol).
    #[arg(required_unless_present_any = ["print_scenes", "print_symbols"])]
    timeline: Option<String>,

    /// Output directory.
    #[arg(required_unless_present_any = ["print_scenes", "print_symbols"])]
    output_dir: Option<PathBuf>,

    /// Timeline type (default: scene if a scene has that name, else symbol).
    #[arg(long, value_enum)]
    timeline_type: Option<TimelineType>,

    /// First frame to render, 1-based.
    #[arg(long, default_value_t = 1, value_name = "FRAME")]
    first_frame: u32,

    /// Last frame to render, 1-based (default: last frame of the timeline).
    #[arg(long, value_name = "FRAME")]
    last_frame: Option<u32>,

    /// Output width (default: stage width).
    #[arg(long)]
    width: Option<f64>,

    /// Output height (default: stage height).
    #[arg(long)]
    height: Option<f64>,

    /// Background color (default: stage color).
    #[arg(long, value_name = "COLOR")]
    background: Option<String>,

    /// Disable the background.
    #[arg(long, default_value_t = false)]
    no_background: bool,

    /// Center the output in the viewport.
    #[arg(long, default_value_t = false)]
    center: bool,

    /// Write PNG files instead of SVG.
    #[arg(long, default_value_t = false)]
    png: bool,

    /// Render frames in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Print scene names and exit.
    #[arg(long, default_value_t = false)]
    print_scenes: bool,

    /// Print symbol names and exit.
    #[arg(long, default_value_t = false)]
    print_symbols: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TimelineType {
    Scene,
    Symbol,
}

impl From<TimelineType> for TimelineKind {
    fn from(t: TimelineType) -> Self {
        match t {
            TimelineType::Scene => TimelineKind::Scene,
            TimelineType::Symbol => TimelineKind::Symbol,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project = load_project(&cli.project)?;

    if cli.print_scenes || cli.print_symbols {
        if cli.print_scenes {
            println!("Scenes:");
            for name in project.scene_names() {
                println!("  {name}");
            }
        }
        if cli.print_symbols {
            println!("Symbols:");
            for name in project.symbol_names() {
                println!("  {name}");
            }
        }
        return Ok(());
    }

    let timeline = cli.timeline.clone().context("missing timeline argument")?;
    let output_dir = cli
        .output_dir
        .clone()
        .context("missing output directory argument")?;
    cmd_render(&cli, &project, &timeline, &output_dir)
}

fn load_project(path: &Path) -> anyhow::Result<Project> {
    if path.extension().is_some_and(|e| e == "json") {
        let file =
            std::fs::File::open(path).with_context(|| format!("open '{}'", path.display()))?;
        return Ok(Project::from_json_reader(std::io::BufReader::new(file))?);
    }
    Ok(xflsvg::read_xfl_dir(path)?)
}

fn cmd_render(cli: &Cli, project: &Project, timeline: &str, output_dir: &Path) -> anyhow::Result<()> {
    let kind = resolve_kind(project, timeline, cli.timeline_type)?;
    let stage = project.stage();
    let width = cli.width.unwrap_or(stage.width);
    let height = cli.height.unwrap_or(stage.height);

    // Frames are 1-based on the command line and 0-based internally.
    let available = project.timeline(timeline, kind)?.len_frames();
    let last = match cli.last_frame {
        Some(last) if last > available => {
            anyhow::bail!("last frame of {timeline} is {available}");
        }
        Some(last) => last,
        None => available,
    };
    if cli.first_frame < 1 {
        anyhow::bail!("first frame can't be less than 1");
    }
    if cli.first_frame > last {
        anyhow::bail!("first frame can't be greater than last frame");
    }
    let range = FrameRange::new(FrameIndex(cli.first_frame - 1), FrameIndex(last))?;
    let digits = frame_digits(last);

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir '{}'", output_dir.display()))?;

    let background = (!cli.no_background)
        .then(|| cli.background.clone().unwrap_or_else(|| stage.background.clone()));
    let finish = |doc: Document| -> Document {
        let doc = if cli.center { doc.centered() } else { doc };
        match &background {
            Some(color) => doc.with_background(color),
            None => doc,
        }
    };

    if cli.parallel {
        let opts = BatchOpts {
            threads: cli.threads,
            renderer: RendererOpts::from_env(),
        };
        let frames =
            xflsvg::render_frames_parallel(project, timeline, kind, range, width, height, &opts)?;
        for frame in frames {
            write_frame(cli, output_dir, timeline, frame.frame, digits, finish(frame.document))?;
        }
    } else {
        let mut renderer = Renderer::with_opts(project, RendererOpts::from_env());
        for frame in range.iter() {
            let doc = renderer
                .render(timeline, frame, width, height, kind)
                .with_context(|| format!("render {timeline} frame {}", frame.0 + 1))?;
            write_frame(cli, output_dir, timeline, frame, digits, finish(doc))?;
        }
    }

    Ok(())
}

fn resolve_kind(
    project: &Project,
    timeline: &str,
    requested: Option<TimelineType>,
) -> anyhow::Result<TimelineKind> {
    let is_scene = project.scene_names().iter().any(|s| s == timeline);
    let is_symbol = project.symbol_names().iter().any(|s| s == timeline);
    if !is_scene && !is_symbol {
        anyhow::bail!("timeline does not exist: {timeline}");
    }
    Ok(match requested {
        Some(t) => t.into(),
        None if is_scene => TimelineKind::Scene,
        None => TimelineKind::Symbol,
    })
}

fn write_frame(
    cli: &Cli,
    output_dir: &Path,
    timeline: &str,
    frame: FrameIndex,
    digits: usize,
    doc: Document,
) -> anyhow::Result<()> {
    let ext = if cli.png { "png" } else { "svg" };
    let suffix = format!("_{:0digits$}.{ext}", frame.0 + 1);
    let out = output_dir.join(sanitize_filename(timeline, &suffix));

    if cli.png {
        let width = doc.width().ceil().max(1.0) as u32;
        let height = doc.height().ceil().max(1.0) as u32;
        let img = xflsvg::rasterize(&doc, width, height)?;
        image::save_buffer_with_format(
            &out,
            &img.to_straight_rgba(),
            img.width,
            img.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", out.display()))?;
    } else {
        std::fs::write(&out, doc.to_svg_string())
            .with_context(|| format!("write svg '{}'", out.display()))?;
    }
    tracing::debug!(path = %out.display(), "wrote frame");
    Ok(())
}

/// Zero padding for frame numbers: at least three digits, so shortening a range overwrites
/// the same files.
fn frame_digits(last: u32) -> usize {
    last.to_string().len().max(3)
}

/// File name for `name` followed by `extension`, safe on common filesystems.
///
/// Control characters are dropped, `\/:*?"<>|` become `_`, names that would start with `-` or
/// `.` (after any leading underscores) get an extra `_`, and the result is capped at 255 UTF-8
/// bytes including the extension.
fn sanitize_filename(name: &str, extension: &str) -> String {
    const MAX_BYTES: usize = 255;

    let mut out: String = name
        .chars()
        .filter(|c| !c.is_ascii_control())
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    if matches!(out.trim_start_matches('_').chars().next(), Some('-' | '.')) {
        out.insert(0, '_');
    }

    let max = MAX_BYTES.saturating_sub(extension.len());
    if out.len() > max {
        let mut cut = max;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
    }
    out.push_str(extension);
    out
}

#[cfg(test)]
#[path = "../tests/unit/main.rs"]
mod tests;
