use std::process::ExitCode;

fn main() -> ExitCode {
    match dist_conformance::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("gof: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
