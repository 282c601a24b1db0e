//! Generate a vertical orientation table from Unicode data.
//!
//! Reads `VerticalOrientation.txt` from the Unicode character database and
//! writes every code point range with its class in the compact form read by
//! `vort --orientation-table`. Code points the data file does not list get
//! the defaults it documents.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use clap::Parser;
use vort::{error::Error, orientation::OrientationTable};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The Unicode VerticalOrientation.txt file.
    input: PathBuf,

    /// Where to write the table; standard output if not given.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "warn"),
    );

    if let Err(e) = run(&args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let table = generate(&args.input)?;
    log::info!("{} ranges", table.len());
    let compact = table.to_compact_string();
    match &args.output {
        Some(path) => std::fs::write(path, compact).map_err(|e| Error::io(path, e)),
        None => std::io::stdout()
            .lock()
            .write_all(compact.as_bytes())
            .map_err(|e| Error::io("<stdout>", e)),
    }
}

fn generate(path: &Path) -> Result<OrientationTable, Error> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(OrientationTable::from_unicode_data(&text)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use vort::orientation::OrientationClass;

    use super::*;

    #[test]
    fn missing_input_is_an_io_error() {
        let result = generate(Path::new("does/not/exist/VerticalOrientation.txt"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn output_can_be_read_back() {
        let table = OrientationTable::from_unicode_data(
            "# VerticalOrientation-15.1.0.txt\n\
             00A7          ; U  # Po       SECTION SIGN\n\
             3001..3002    ; Tu # Po   [2] IDEOGRAPHIC COMMA..IDEOGRAPHIC FULL STOP\n",
        )
        .unwrap();
        let compact = table.to_compact_string();
        assert!(compact.starts_with("0 a6 R\na7 a7 U\n"));
        let reread = OrientationTable::parse(&compact).unwrap();
        assert_eq!(reread, table);
        assert_eq!(
            reread.lookup(0x3001),
            OrientationClass::TransformedFallbackUpright
        );
    }
}
