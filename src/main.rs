use std::process::ExitCode;

fn main() -> ExitCode {
    readmegen::cli::run()
}
