#[tokio::main]
async fn main() {
    if let Err(err) = coaching_server::start_server().await {
        eprintln!("coaching-server failed: {err}");
        std::process::exit(1);
    }
}
