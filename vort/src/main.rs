//! Rotate the upright glyphs of a font for vertical text.
//!
//! Reads a font, turns every glyph that is drawn upright in vertical text a
//! quarter turn (after applying the font's own vertical alternates), and
//! writes the result.

use std::path::PathBuf;

use clap::Parser;
use vort::{
    convert, error::Error, font::Font, orientation::OrientationTable, rename_for_output,
    transform::PivotMode, ConvertOptions,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The input font file.
    input: PathBuf,

    /// The output font file.
    output: PathBuf,

    /// Replace halfwidth glyphs with fullwidth, making Latin letters and
    /// punctuation upright.
    #[arg(long)]
    half_to_full: bool,

    /// Only apply vertical substitutions to characters marked T, Tu or Tr in
    /// the vertical orientation table.
    #[arg(long)]
    only_sub_table: bool,

    /// Do not round glyph points in the output font.
    #[arg(long)]
    no_round: bool,

    /// The center of rotation.
    #[arg(long, value_enum, default_value_t)]
    rotation_center: RotationCenter,

    /// A vertical orientation table to use instead of the built in one.
    #[arg(long)]
    orientation_table: Option<PathBuf>,

    /// Do not append "Rotated" to the font names.
    #[arg(long)]
    keep_names: bool,

    /// Increase logging (-v for progress, -vv for every glyph).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Where glyphs are turned about.
#[derive(clap::ValueEnum, Copy, Clone, Default, Debug)]
enum RotationCenter {
    /// (em / 2, em / 2 - descent)
    #[default]
    Halfemdesc,
    /// (em / 2, em / 2)
    Halfem,
    /// The center of the bounding box of all rotated glyphs.
    Bb,
}

impl From<RotationCenter> for PivotMode {
    fn from(src: RotationCenter) -> PivotMode {
        match src {
            RotationCenter::Halfemdesc => PivotMode::HalfEmMinusDescent,
            RotationCenter::Halfem => PivotMode::HalfEm,
            RotationCenter::Bb => PivotMode::BoundingBox,
        }
    }
}

impl Args {
    fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            half_to_full: self.half_to_full,
            only_sub_table: self.only_sub_table,
            round: !self.no_round,
            rotation_center: self.rotation_center.into(),
        }
    }
}

fn main() {
    let args = Args::parse();

    env_logger::init_from_env(env_logger::Env::default().filter_or(
        env_logger::DEFAULT_FILTER_ENV,
        match args.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        },
    ));

    if let Err(e) = run(&args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Error> {
    // the table is read first, so a bad table never leaves a partial output
    let table = match &args.orientation_table {
        Some(path) => OrientationTable::load(path)?,
        None => OrientationTable::bundled()?,
    };
    let mut font = Font::load(&args.input)?;
    if !args.keep_names {
        rename_for_output(&mut font);
    }

    let report = convert(&mut font, &table, &args.convert_options())?;
    log::info!(
        "substituted {} glyphs, rotated {}, folded {}",
        report.substituted,
        report.rotated,
        report.folded
    );
    font.save(&args.output)
}
