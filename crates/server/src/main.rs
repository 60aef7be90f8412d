#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vizon_server::start().await
}
