//! Lists workouts and prints the first one in detail.
//!
//! ```text
//! KINESTEX_API_KEY=... KINESTEX_COMPANY=... cargo run -p core-service --example browse_content
//! ```

use anyhow::{Context, Result};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::{BodyPart, KinestexService, ListFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(LoggingConfig::default().with_format(LogFormat::Compact))
        .context("failed to initialize logging")?;

    let api_key = std::env::var("KINESTEX_API_KEY").context("KINESTEX_API_KEY is not set")?;
    let company = std::env::var("KINESTEX_COMPANY").context("KINESTEX_COMPANY is not set")?;
    let service = KinestexService::from_credentials(api_key, company, "demo-user")?;

    let page = service
        .fetch_workouts(
            ListFilter::new()
                .category("Fitness")
                .body_parts([BodyPart::Abs, BodyPart::Glutes])
                .limit(5),
        )
        .await?;

    println!("{} workouts (next cursor: '{}')", page.workouts.len(), page.last_doc_id);
    for workout in &page.workouts {
        println!("- {} [{}]", workout.title, workout.id);
    }

    if let Some(first) = page.workouts.first() {
        let workout = service.fetch_workout(&first.id, None).await?;
        for exercise in &workout.sequence {
            println!(
                "  {} (rest before: {}s)",
                exercise.title, exercise.rest_duration
            );
        }
    }

    Ok(())
}
