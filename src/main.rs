#[tokio::main]
async fn main() -> anyhow::Result<()> {
    plategate::run().await
}
