#![forbid(unsafe_code)]

use std::process::ExitCode;

use fguard_harness::cli::Opts;
use fguard_harness::logging::init_logging;
use fguard_harness::{EXIT_ERROR, run};

fn main() -> ExitCode {
    let opts = match Opts::from_env() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_ERROR as u8);
        }
    };
    init_logging(opts.log_json);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run(&opts, &mut out) {
        Ok(status) => ExitCode::from(status as u8),
        Err(e) => {
            tracing::error!(error = %e, "harness failed");
            eprintln!("error: {e}");
            ExitCode::from(EXIT_ERROR as u8)
        }
    }
}
