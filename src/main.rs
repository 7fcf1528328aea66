#[tokio::main]
async fn main() -> anyhow::Result<()> {
    macro_indicator_engine_lib::run().await
}
