#[tokio::main]
async fn main() -> anyhow::Result<()> {
    event_scale_lib::run().await
}
