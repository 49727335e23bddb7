use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use teestudio::{
    AssetFetcher, Compositor, ContainerSize, DesignDescriptor, DesignState, MockupVariant, Side,
    encode_png,
};

#[derive(Parser, Debug)]
#[command(name = "teestudio", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a design descriptor onto mockup images and write PNG previews.
    Preview(PreviewArgs),
    /// Parse a design descriptor and check its invariants.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input design descriptor JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Front mockup base image (URL or file path).
    #[arg(long)]
    front_image: Option<String>,

    /// Back mockup base image (URL or file path).
    #[arg(long)]
    back_image: Option<String>,

    /// API base URL for resolving backend media paths.
    /// Without it, relative paths are read as local files.
    #[arg(long)]
    api_base: Option<String>,

    /// Output directory for preview PNGs.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input design descriptor JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Preview(args) => cmd_preview(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn read_descriptor(path: &PathBuf) -> anyhow::Result<DesignDescriptor> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read descriptor '{}'", path.display()))?;
    Ok(DesignDescriptor::from_json(&json)?)
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let descriptor = read_descriptor(&args.in_path)?;
    descriptor.validate()?;

    let fetcher = match &args.api_base {
        Some(base) => AssetFetcher::new(base.clone())?,
        None => AssetFetcher::offline()?,
    };

    let compositor = Compositor::default();
    let canvas = compositor.canvas();
    // Replay at canvas resolution: normalized placements map 1:1 onto pixels.
    let container = ContainerSize::new(f64::from(canvas.width), f64::from(canvas.height))?;

    let variant = MockupVariant {
        id: descriptor.mockup_variant_id,
        mockup_type: 0,
        mockup_type_slug: Some(descriptor.mockup_type.clone()),
        size: descriptor.variant.size.clone(),
        color_name: descriptor.variant.color.clone(),
        color_hex: None,
        front_image: args.front_image.clone(),
        back_image: args.back_image.clone(),
        thumbnail: None,
        price_modifier: 0.0,
        effective_price: 0.0,
        stock: 0,
    };

    let mut design = DesignState::new();
    for side in Side::ALL {
        *design.side_mut(side) = descriptor.side(side).to_side_state(container);
    }

    let frames = compositor.composite_design(&fetcher, &variant, &design, container);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    for side in Side::ALL {
        match frames.get(side) {
            Some(frame) => {
                let out = args.out_dir.join(format!("preview_{side}.png"));
                let png = encode_png(frame)?;
                std::fs::write(&out, png)
                    .with_context(|| format!("write png '{}'", out.display()))?;
                eprintln!("wrote {}", out.display());
            }
            None => eprintln!("{side}: no output (missing base image or failed asset load)"),
        }
    }

    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let descriptor = read_descriptor(&args.in_path)?;
    descriptor.validate()?;
    eprintln!("{} is valid", args.in_path.display());
    Ok(())
}
