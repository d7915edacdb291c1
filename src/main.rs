#![warn(unused_extern_crates)]
use anyhow::{Error, Result};
use clap::{Args, Parser, Subcommand};
use image::{DynamicImage, RgbaImage};
use percept::classify::classify_sentiment;
use percept::inference::Recording;
use percept::overlay::Overlay;
use percept::pipeline::Pipeline;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, info, span};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CmdArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Label the emotion of every face in an image
    Emotion(ImageArgs),
    /// Label the posture of the body in an image
    Pose(ImageArgs),
    /// Print the text recognized in an image
    Text(ImageArgs),
    /// Label the sentiment of a text
    Sentiment(SentimentArgs),
}

#[derive(Args, Debug)]
struct ImageArgs {
    /// Recorded inference output for the image
    #[arg(long, value_name = "FILE")]
    inference: PathBuf,

    /// Image the inference ran on
    #[arg(short, long, value_name = "FILE")]
    image: PathBuf,

    /// Write the annotated image to this path
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Font for captions and emotion glyphs. Nothing textual is drawn without one
    #[arg(long, value_name = "FILE", requires = "output")]
    font: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SentimentArgs {
    /// Text to label
    #[arg(requires = "inference")]
    text: Option<String>,

    /// Recorded sentiment scores
    #[arg(long, value_name = "FILE", requires = "text")]
    inference: Option<PathBuf>,

    /// Label a raw score instead of a text
    #[arg(long, allow_negative_numbers = true, conflicts_with_all = ["text", "inference"])]
    score: Option<f64>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::from_default_env();
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_env_filter(filter)
        .init();

    let args = CmdArgs::parse();
    debug!("{args:?}");

    match args.command {
        Command::Emotion(args) => emotion(args),
        Command::Pose(args) => pose(args),
        Command::Text(args) => text(args),
        Command::Sentiment(args) => sentiment(args),
    }
}

struct Screen {
    pipeline: Pipeline<Recording>,
    img: DynamicImage,
    overlay: Overlay,
}

fn load(args: &ImageArgs) -> Result<Screen> {
    let span = span!(Level::DEBUG, "load");
    let _guard = span.enter();

    let pipeline = Pipeline::new(Recording::load(&args.inference)?);
    let img = image::open(&args.image)?;
    let overlay = match &args.font {
        Some(font) => Overlay::with_font(font)?,
        None => Overlay::new(),
    };

    Ok(Screen {
        pipeline,
        img,
        overlay,
    })
}

fn emotion(args: ImageArgs) -> Result<()> {
    let screen = load(&args)?;
    let faces = screen.pipeline.faces(&screen.img.to_rgb8())?;

    if faces.is_empty() {
        println!("No faces detected");
    }
    for (idx, face) in faces.iter().enumerate() {
        println!("Face {idx}: {} {}", face.emotion.emoji(), face.emotion);
    }

    if let Some(output) = &args.output {
        let mut img = screen.img.to_rgba8();
        screen.overlay.draw_faces(&mut img, &faces);
        save(&img, output)?;
    }

    Ok(())
}

fn pose(args: ImageArgs) -> Result<()> {
    let screen = load(&args)?;
    let pose = screen.pipeline.pose(&screen.img.to_rgb8())?;

    println!("Action: {}", pose.action);
    println!("Confidence: {:.2}", pose.confidence);

    if let Some(output) = &args.output {
        let mut img = screen.img.to_rgba8();
        screen.overlay.draw_pose(&mut img, &pose);
        save(&img, output)?;
    }

    Ok(())
}

fn text(args: ImageArgs) -> Result<()> {
    let screen = load(&args)?;
    let text = screen.pipeline.text(&screen.img.to_rgb8())?;

    if text.text.is_empty() {
        println!("No text recognized");
    } else {
        println!("{}", text.text);
    }

    if let Some(output) = &args.output {
        let mut img = screen.img.to_rgba8();
        screen.overlay.draw_text(&mut img, &text);
        save(&img, output)?;
    }

    Ok(())
}

fn sentiment(args: SentimentArgs) -> Result<()> {
    let label = match (args.score, args.text, args.inference) {
        (Some(score), _, _) => classify_sentiment(score),
        (None, Some(text), Some(inference)) => {
            Pipeline::new(Recording::load(inference)?).sentiment(&text)
        }
        _ => return Err(Error::msg("Pass either --score or a text with --inference")),
    };

    println!("Sentiment: {label}");
    Ok(())
}

fn save(img: &RgbaImage, path: &Path) -> Result<()> {
    img.save(path)?;
    info!("Result at {path:?}");
    Ok(())
}
