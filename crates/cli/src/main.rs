use std::process::ExitCode;

fn main() -> ExitCode {
    fertiwise_cli::run()
}
