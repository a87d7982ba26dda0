use std::process::ExitCode;

use docx2chapters::app::run;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    run().await
}
