//! `nodecull` binary entrypoint.

#[tokio::main]
async fn main() {
    let exit_code = nodecull_cli::run().await;
    std::process::exit(exit_code);
}
