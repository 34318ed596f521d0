use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Open the first JSON file of a base64-encoded zip archive in a viewer.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Base64-encoded zip archive
    input: String,

    /// Application to open the JSON file with instead of the default handler
    #[arg(short, long, env = "JSONPEEK_APP")]
    app: Option<String>,

    /// Directory to create the temporary workspace in
    #[arg(long, env = "JSONPEEK_TEMP_DIR")]
    temp_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let config = jsonpeek::Config {
        temp_root: args.temp_dir,
    };
    let launcher = jsonpeek::SystemLauncher::new(args.app);

    match jsonpeek::run(&args.input, &config, &launcher) {
        Ok(outcome) => {
            println!("{outcome}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", jsonpeek::chain(&err));
            ExitCode::FAILURE
        }
    }
}
