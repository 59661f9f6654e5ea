//! CLI library for testing purposes

pub mod logging;

use std::path::Path;

use clap::{ArgGroup, Parser};
use i18n_atlas::{Error, Layout, combine, replace_underscores, split};

#[derive(Parser, Debug)]
#[command(author, version, about = "Split or combine translations.", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["split", "combine"])))]
pub struct Args {
    /// Split translations into separate files for each module and language.
    #[arg(long)]
    pub split: bool,

    /// Combine the default-language translations from all modules into a single file.
    #[arg(long)]
    pub combine: bool,

    /// Replace underscores with "-r" in language directories (only with --split).
    #[arg(long, requires = "split")]
    pub replace_underscore: bool,
}

/// What a run does, derived from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Combine,
    Split { replace_underscore: bool },
}

impl Args {
    pub fn mode(&self) -> Mode {
        if self.split {
            Mode::Split {
                replace_underscore: self.replace_underscore,
            }
        } else {
            Mode::Combine
        }
    }
}

/// Runs `mode` against the project at `root`, printing a summary to stdout.
pub fn run(mode: Mode, root: &Path) -> Result<(), Error> {
    let layout = Layout::load(root)?;
    match mode {
        Mode::Combine => {
            let report = combine(root, &layout)?;
            println!(
                "✅ Combined {} entries from {} modules into {}",
                report.total_entries(),
                report.modules.len(),
                report.output.display()
            );
        }
        Mode::Split { replace_underscore } => {
            if replace_underscore {
                for rename in replace_underscores(root, &layout)? {
                    println!(
                        "Renamed {} to {}",
                        rename.from.display(),
                        rename.to.display()
                    );
                }
            }
            let report = split(root, &layout)?;
            for language in &report.languages {
                println!(
                    "{}: {} module files",
                    language.language_dir,
                    language.files.len()
                );
            }
            println!(
                "✅ Split {} languages into {} files",
                report.languages.len(),
                report.total_files()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("i18n-atlas").chain(args.iter().copied()))
    }

    #[test]
    fn test_combine_mode() {
        assert_eq!(parse(&["--combine"]).unwrap().mode(), Mode::Combine);
    }

    #[test]
    fn test_split_modes() {
        assert_eq!(
            parse(&["--split"]).unwrap().mode(),
            Mode::Split {
                replace_underscore: false
            }
        );
        assert_eq!(
            parse(&["--split", "--replace-underscore"]).unwrap().mode(),
            Mode::Split {
                replace_underscore: true
            }
        );
    }

    #[test]
    fn test_mode_is_required() {
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_modes_are_exclusive() {
        assert!(parse(&["--split", "--combine"]).is_err());
    }

    #[test]
    fn test_replace_underscore_requires_split() {
        assert!(parse(&["--combine", "--replace-underscore"]).is_err());
        assert!(parse(&["--replace-underscore"]).is_err());
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(parse(&["--split", "--dry-run"]).is_err());
    }
}
