use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::{connect, OutputFormat};
use crate::services::DemoService;

#[derive(Subcommand)]
pub enum DemoCommands {
    #[command(about = "Rebuild the demo collection from the seed users")]
    Reset,

    #[command(about = "Delete every demo card")]
    Remove,
}

pub async fn handle(cmd: DemoCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (config, pool) = connect().await?;
    let demo = DemoService::new(pool, config.demo);

    match cmd {
        DemoCommands::Reset => {
            let reset = demo.reset_demo_collection().await?;
            output_success(
                &output_format,
                &format!(
                    "Demo collection reset: {} removed, {} copied",
                    reset.removed_cards, reset.copied_cards
                ),
                Some(serde_json::to_value(&reset)?),
            )
        }
        DemoCommands::Remove => {
            let removed = demo.remove_demo_collection().await?;
            output_success(
                &output_format,
                &format!("Removed {} demo cards", removed),
                Some(json!({ "deletedCount": removed })),
            )
        }
    }
}
