use anyhow::{Context, bail};
use clap::Parser;
use image::GrayImage;
use opencv::{
    core::{Mat, Point, Scalar},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::path::PathBuf;
use std::sync::Arc;
use tag_pilot::{
    ArucoTagDetector, CommandStore, DecisionEngine, FileStore, Frame, MemoryStore, PilotConfig,
    SteeringPipeline, TagFamily,
};
use tag_pilot_tracker::Guides;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const WINDOW_NAME: &str = "AprilTag Webcam Tracker";

/// Track an AprilTag on a live camera feed and show the steering decision
#[derive(Parser, Debug)]
#[command(name = "tag_pilot_tracker", version, about)]
struct Args {
    /// Camera index to open (0 is usually the default webcam)
    #[arg(long, env = "TP_CAMERA_INDEX", default_value_t = 0)]
    camera_index: i32,

    /// Dead-zone half-width as a fraction of half the frame width
    #[arg(long, env = "TP_TOLERANCE", default_value_t = 0.15)]
    tolerance: f64,

    /// Also publish decisions to this last-command record
    #[arg(long, env = "TP_STORE")]
    store: Option<PathBuf>,

    /// AprilTag family to detect
    #[arg(long, env = "TP_TAG_FAMILY", default_value = "36h11")]
    tag_family: TagFamily,

    /// Log decisions instead of opening a window
    #[arg(long)]
    headless: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- 1. Configuration ---
    let args = Args::parse();
    let config = PilotConfig {
        tolerance: args.tolerance,
        camera_index: args.camera_index,
        tag_family: args.tag_family,
        ..PilotConfig::default()
    };
    config.validate().context("invalid configuration")?;

    // --- 2. Pipeline ---
    let store: Arc<dyn CommandStore> = match &args.store {
        Some(path) => Arc::new(
            FileStore::open(path).with_context(|| format!("failed to open store at {}", path.display()))?,
        ),
        None => Arc::new(MemoryStore::open()),
    };
    let detector = ArucoTagDetector::new(config.tag_family).context("failed to build AprilTag detector")?;
    let pipeline = SteeringPipeline::new(DecisionEngine::new(config.tolerance)?, Arc::new(detector), store);

    // --- 3. Camera ---
    let mut cap = VideoCapture::new(config.camera_index, videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        bail!("could not open camera {}", config.camera_index);
    }
    info!(camera = config.camera_index, headless = args.headless, "tracking started, press 'q' to quit");

    // --- 4. Main Loop ---
    let mut frame = Mat::default();
    let mut gray = Mat::default();
    let mut last_action = None;
    loop {
        if !cap.read(&mut frame)? || frame.empty() {
            warn!("failed to grab frame");
            break;
        }

        // --- 5. Grayscale Conversion & Steering ---
        imgproc::cvt_color(&frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;
        let gray_image = GrayImage::from_raw(gray.cols() as u32, gray.rows() as u32, gray.data_bytes()?.to_vec())
            .context("grayscale frame has an unexpected layout")?;
        let frame_in = Frame::from_gray(gray_image)?;
        let report = pipeline.process_frame(&frame_in)?;

        if last_action != Some(report.action) {
            info!(action = %report.action, offset = ?report.offset, "steering changed");
            last_action = Some(report.action);
        }
        if args.headless {
            continue;
        }

        // --- 6. Visualization ---
        let guides = Guides::new(frame_in.geometry(), config.tolerance, &report);
        draw_guides(&mut frame, &guides)?;
        highgui::imshow(WINDOW_NAME, &frame)?;
        if highgui::wait_key(1)? & 0xFF == 'q' as i32 {
            break;
        }
    }

    // --- 7. Cleanup ---
    cap.release()?;
    if !args.headless {
        highgui::destroy_all_windows()?;
    }
    info!("tracking stopped");
    Ok(())
}

/// Paints the steering overlay onto a BGR frame.
fn draw_guides(frame: &mut Mat, guides: &Guides) -> opencv::Result<()> {
    let green = Scalar::new(0.0, 255.0, 0.0, 0.0);
    let yellow = Scalar::new(0.0, 255.0, 255.0, 0.0);
    let blue = Scalar::new(255.0, 0.0, 0.0, 0.0);
    let red = Scalar::new(0.0, 0.0, 255.0, 0.0);

    for &(x, y) in &guides.marker_corners {
        imgproc::circle(frame, Point::new(x, y), 4, green, -1, imgproc::LINE_8, 0)?;
    }
    if let Some((x, y)) = guides.marker_center {
        imgproc::circle(frame, Point::new(x, y), 6, yellow, -1, imgproc::LINE_8, 0)?;
    }

    let vertical = |frame: &mut Mat, x: i32, color: Scalar, thickness: i32| {
        imgproc::line(
            frame,
            Point::new(x, 0),
            Point::new(x, guides.height),
            color,
            thickness,
            imgproc::LINE_8,
            0,
        )
    };
    vertical(frame, guides.center_x, blue, 2)?;
    vertical(frame, guides.left_bound_x, red, 1)?;
    vertical(frame, guides.right_bound_x, red, 1)?;

    imgproc::put_text(
        frame,
        &guides.caption,
        Point::new(10, 30),
        imgproc::FONT_HERSHEY_SIMPLEX,
        1.0,
        yellow,
        2,
        imgproc::LINE_8,
        false,
    )?;
    Ok(())
}
