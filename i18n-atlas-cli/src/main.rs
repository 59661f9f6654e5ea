use clap::Parser;
use i18n_atlas_cli::{Args, logging::setup_logger, run};

fn main() {
    let args = Args::parse();
    setup_logger();

    let root = match std::env::current_dir() {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error: cannot determine the project root: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(args.mode(), &root) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
