use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use dsnap_overlay::asset::FileAssetLoader;
use dsnap_overlay::capture::{self, CaptureMode};
use dsnap_overlay::config::SelectionStyle;
use dsnap_overlay::draw;
use dsnap_overlay::input::{LocalHost, MouseButton, ToolKind};
use dsnap_overlay::scene::PointerEvent;
use dsnap_overlay::{Config, Overlay};
use kurbo::Point;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Pointer drag given on the command line as `x0,y0,x1,y1`.
#[derive(Debug, Clone, Copy)]
struct Drag {
    from: Point,
    to: Point,
}

fn parse_numbers<const N: usize>(value: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {} comma-separated numbers, got '{}'", N, value));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("'{}' is not a number", part))?;
    }
    Ok(out)
}

fn parse_drag(value: &str) -> Result<Drag, String> {
    let [x0, y0, x1, y1] = parse_numbers::<4>(value)?;
    Ok(Drag {
        from: Point::new(x0, y0),
        to: Point::new(x1, y1),
    })
}

fn parse_point(value: &str) -> Result<Point, String> {
    let [x, y] = parse_numbers::<2>(value)?;
    Ok(Point::new(x, y))
}

#[derive(Parser, Debug)]
#[command(name = "dsnap-overlay")]
#[command(version, about = "Screenshot annotation overlay (headless host)")]
struct Cli {
    /// Screenshot to annotate (path or file:// URI)
    #[arg(long, short = 'i', value_name = "FILE", conflicts_with = "capture")]
    image: Option<String>,

    /// Capture the screen through xdg-desktop-portal instead of reading a file
    #[arg(long, action = ArgAction::SetTrue)]
    capture: bool,

    /// Viewport width
    #[arg(long, default_value_t = 1920.0)]
    width: f64,

    /// Viewport height
    #[arg(long, default_value_t = 1080.0)]
    height: f64,

    /// Use the mask-style selection regardless of the config file
    #[arg(long, action = ArgAction::SetTrue)]
    mask: bool,

    /// Selection drag
    #[arg(long, value_name = "X0,Y0,X1,Y1", value_parser = parse_drag)]
    select: Option<Drag>,

    /// Rectangle annotation drag (repeatable)
    #[arg(long = "rect", value_name = "X0,Y0,X1,Y1", value_parser = parse_drag)]
    rects: Vec<Drag>,

    /// Arrow annotation drag (repeatable)
    #[arg(long = "arrow", value_name = "X0,Y0,X1,Y1", value_parser = parse_drag)]
    arrows: Vec<Drag>,

    /// Print the magnifier state at this point as JSON
    #[arg(long, value_name = "X,Y", value_parser = parse_point)]
    magnify: Option<Point>,

    /// Config file (defaults to ~/.config/dsnap/overlay.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output PNG (defaults to a timestamped name in the current directory)
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,
}

fn replay(overlay: &mut Overlay<LocalHost>, drag: Drag) -> Result<()> {
    overlay.handle_pointer(PointerEvent::down(drag.from, MouseButton::Left))?;
    overlay.handle_pointer(PointerEvent::moved(drag.to))?;
    overlay.handle_pointer(PointerEvent::up(drag.to, MouseButton::Left))?;
    Ok(())
}

fn default_output() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y-%m-%d_%H%M%S");
    PathBuf::from(format!("dsnap-overlay_{}.png", stamp))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.image.is_none() && !cli.capture {
        bail!("no screenshot given: pass --image FILE or --capture");
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if cli.mask {
        config.selection.style = SelectionStyle::Mask;
    }

    let mut overlay = Overlay::new(config, cli.width, cli.height, LocalHost::new())
        .context("Failed to start overlay session")?;

    match &cli.image {
        Some(image) => {
            overlay
                .load_background_asset(image, &FileAssetLoader)
                .await
                .with_context(|| format!("Failed to load {}", image))?;
        }
        None => {
            let asset = capture::capture_screen(CaptureMode::FullScreen)
                .await
                .context("Screen capture failed")?;
            overlay.attach_background(asset)?;
        }
    }

    if let Some(drag) = cli.select {
        replay(&mut overlay, drag)?;
    }

    if !cli.rects.is_empty() {
        overlay.switch_to(ToolKind::Rectangle)?;
        for drag in &cli.rects {
            replay(&mut overlay, *drag)?;
        }
    }

    if !cli.arrows.is_empty() {
        overlay.switch_to(ToolKind::Arrow)?;
        for drag in &cli.arrows {
            replay(&mut overlay, *drag)?;
        }
    }

    if let Some(point) = cli.magnify {
        overlay.switch_to(ToolKind::Magnifier)?;
        overlay.handle_pointer(PointerEvent::moved(point))?;
        for frame in overlay.host_mut().take_frames() {
            overlay.handle_frame(frame)?;
        }
        println!("{}", overlay.magnifier().state().to_json()?);
    }

    // Leave the session on its selection tool so the output shows its handles
    overlay.switch_to(overlay.selection_tool())?;

    if let Some(bounds) = overlay.selection_bounds() {
        println!(
            "selection: {},{} {}x{}",
            bounds.x0,
            bounds.y0,
            bounds.width(),
            bounds.height()
        );
    }

    let output = cli.output.unwrap_or_else(default_output);
    let file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    draw::write_png(overlay.scene(), &mut writer)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    writer.flush()?;
    println!("saved: {}", output.display());

    overlay.dispose();
    Ok(())
}
