#![forbid(unsafe_code)]

//! Beau Chat binary entry point.

use beau_chat::app::AppModel;
use beau_chat::{cli, logging};
use beau_runtime::{Program, ProgramConfig};

fn main() {
    let opts = cli::Opts::parse();

    if let Err(e) = logging::init(opts.log_file.as_deref(), opts.log_json) {
        eprintln!("Failed to initialize: {e}");
        std::process::exit(1);
    }

    let model = AppModel::from_opts(&opts);
    let config = ProgramConfig::default().with_mouse(opts.mouse);
    match Program::new(model, config) {
        Ok(mut program) => {
            if let Err(e) = program.run() {
                eprintln!("Runtime error: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    }
}
