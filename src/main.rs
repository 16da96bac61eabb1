fn main() {
    if let Err(e) = priorauth_lib::run() {
        tracing::error!(error = ?e, "claim review failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
