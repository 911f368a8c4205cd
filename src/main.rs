//! linkvault main entrypoint.

use linkvault::errors::AppError;
use linkvault::run;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        if !matches!(e, AppError::Reported) {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}
