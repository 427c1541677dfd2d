use std::process::ExitCode;

fn main() -> ExitCode {
    match resale_flat_price::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
