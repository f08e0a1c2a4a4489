use adserver_primitives::{
    config::DEVELOPMENT_CONFIG,
    target_context::Gender,
    test_util::{broad_context, image_content, targeted_content},
    util::logging::new_logger,
    Campaign, Content, ContentFormat, ContentPayload, Money, TargetContext,
};
use delivery_engine::{Engine, MemoryGateway};
use slog::info;

mod app;
mod routes;

use app::{Application, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = new_logger("delivery-serve");
    let config = Config::from_env()?;

    let gateway = MemoryGateway::new();
    seed_demo_inventory(&gateway)?;

    info!(logger, "Demo inventory seeded");

    let engine = Engine::new(gateway, &DEVELOPMENT_CONFIG, logger.clone());

    Application::new(engine, logger, config).run().await
}

/// A small pool of campaigns and contents to play against, in the spirit of
/// the dummy fixtures used by the tests.
fn seed_demo_inventory(gateway: &MemoryGateway) -> anyhow::Result<()> {
    let hats = Campaign::new(Some("Winter hats".to_string()));
    gateway.insert_campaign(hats.clone());

    gateway.insert_content(image_content(hats.id, ContentFormat::Leaderboard, 4, 100));
    gateway.insert_content(image_content(hats.id, ContentFormat::Skyscraper, 40, 50));

    // targeted at women, priced above the broad leaderboard
    gateway.insert_content(targeted_content(
        hats.id,
        ContentFormat::Leaderboard,
        TargetContext {
            gender: [Gender::Female].into_iter().collect(),
            ..broad_context()
        },
        8,
        100,
    ));

    let sleds = Campaign::new(Some("Dog sleds".to_string()));
    gateway.insert_campaign(sleds.clone());

    gateway.insert_content(Content::new(
        sleds.id,
        ContentFormat::MobileBanner,
        broad_context(),
        Money::from_minor(2),
        200,
        ContentPayload::Text {
            body: "Mush! Sleds at half price.".to_string(),
        },
    )?);

    Ok(())
}
