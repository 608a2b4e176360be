use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match medi_intake::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("medi-intake: {e}");
            ExitCode::FAILURE
        }
    }
}
