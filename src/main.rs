#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    vid_rs::VidRsConfiguration::build_default()?
        .install_tracing()?
        .install_metrics()?
        .run()
        .await
}
