use anyhow::Result;
use spark_core::models::{NewAreaData, UpdateAreaData};
use spark_core::repository::Repository;

use crate::cli::AreaSubcommand;
use crate::util::resolve_area;
use crate::views::table::display_areas;

pub async fn handle_area(repo: &impl Repository, command: AreaSubcommand) -> Result<()> {
    match command {
        AreaSubcommand::Add { name, order } => {
            let area = repo
                .add_area(NewAreaData {
                    name,
                    sort_order: order,
                })
                .await?;
            println!("Created area: '{}'", area.name);
        }
        AreaSubcommand::List => {
            let areas = repo.list_areas().await?;
            display_areas(&areas);
        }
        AreaSubcommand::Rename { name, new_name } => {
            let area = resolve_area(repo, &name).await?;
            let area = repo
                .update_area(
                    area.id,
                    UpdateAreaData {
                        name: Some(new_name),
                        ..Default::default()
                    },
                )
                .await?;
            println!("Renamed area '{}' to '{}'", name, area.name);
        }
        AreaSubcommand::Archive { name } => {
            let area = resolve_area(repo, &name).await?;
            repo.archive_area(area.id).await?;
            println!("Archived area: '{}'", area.name);
        }
    }
    Ok(())
}
