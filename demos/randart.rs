use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use clap::{Arg, ArgAction, Command};
use rand::Rng;
use randart::*;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("Randart")
        .about("Random art from randomly generated expressions of X and Y")
        .version("0.1")
        .arg(
            Arg::new("depth")
                .short('d')
                .long("depth")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(u32))
                .help("Maximum depth of the expressions (random 0-4 when not set)")
        )
        .arg(
            Arg::new("width")
                .short('w')
                .long("width")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(u32))
                .default_value("301")
                .help("Width in pixels")
        )
        .arg(
            Arg::new("height")
                .short('H')
                .long("height")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(u32))
                .default_value("301")
                .help("Height in pixels")
        )
        .arg(
            Arg::new("color")
                .short('c')
                .long("color")
                .action(ArgAction::SetTrue)
                .help("Generate one expression per color channel")
        )
        .arg(
            Arg::new("extended")
                .short('e')
                .long("extended")
                .action(ArgAction::SetTrue)
                .help("Also use `abs` and power")
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(u64))
                .help("Seed for repeating an image")
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(usize))
                .help("Number of worker threads")
        )
        .arg(
            Arg::new("single")
                .long("single")
                .action(ArgAction::SetTrue)
                .help("Render on one thread, logging progress every 10 rows")
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Output file `*.pgm`, `*.ppm` or `*.png`")
        )
        .arg(
            Arg::new("trees")
                .long("trees")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Also store the expressions to this file")
        )
        .get_matches();

    let mut settings = Settings::default();
    settings.width = *matches.get_one::<u32>("width").context("missing width")?;
    settings.height = *matches.get_one::<u32>("height").context("missing height")?;
    settings.seed = matches.get_one::<u64>("seed").copied();
    if matches.get_flag("color") {settings.channels = Channels::Rgb};
    let mut rng = settings.rng();
    settings.gen.max_depth = match matches.get_one::<u32>("depth") {
        Some(&depth) => depth,
        None => rng.random_range(0..5),
    };
    if matches.get_flag("extended") {settings.gen = settings.gen.extended()};
    let method = if matches.get_flag("single") {
        RenderMethod::Single {report: Report::Row(10)}
    } else {
        RenderMethod::Parallel {threads: matches.get_one::<usize>("threads").copied()}
    };

    eprintln!("{}", if settings.channels == Channels::Gray {
        "Making equation..."
    } else {
        "Making equations..."
    });
    let art = render::gen_art(&settings, &mut rng)?;
    let texts = art.texts();
    for text in &texts {println!("{}", text)}

    eprintln!("Making picture...");
    let raster = render::render(&art, method)?;

    let out = match matches.get_one::<PathBuf>("output") {
        Some(out) => out.clone(),
        None => default_file_name(&settings, &texts[0]),
    };
    match out.extension().and_then(|e| e.to_str()) {
        Some("pgm") | Some("ppm") | Some("pnm") => pnm::save(&out, &raster, &texts)?,
        _ => raster.save(&out)?,
    }
    eprintln!("Saved {}", out.display());

    if let Some(file) = matches.get_one::<PathBuf>("trees") {
        save(file, &art)?;
    }
    Ok(())
}

/// Names the file after the time, color mode, size and start of the first expression.
fn default_file_name(settings: &Settings, first: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let mode = match settings.channels {
        Channels::Gray => "grayscale",
        Channels::Rgb => "color",
    };
    let beginning: String = first.chars()
        .take(10)
        .map(|c| if c.is_ascii_alphanumeric() {c} else {'_'})
        .collect();
    PathBuf::from(format!(
        "{}-{}-width{}-height{}-beg-of-equation{}.{}",
        nanos, mode, settings.width, settings.height, beginning,
        pnm::extension(settings.channels)
    ))
}
