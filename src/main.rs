#[tokio::main]
async fn main() -> anyhow::Result<()> {
    program_dashboard_lib::run().await
}
