use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    gbx_io::infra::logging::init();
    gbx_io::cli::run().await
}
