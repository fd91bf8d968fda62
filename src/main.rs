use anyhow::Context;
use narrator::kernel::reactor::Reactor;
use narrator::outputs::text::ConsoleSink;
use narrator::world::file::JsonFileWorld;
use narrator::world::source::{EntityRecord, EntitySource, Position, StaticWorld};
use narrator::NarratorConfig;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Stand-in level used when no world file is configured
fn demo_world() -> StaticWorld {
    let mut world = StaticWorld::new();
    world.spawn(EntityRecord::new("SkyLight_0", "SkyLight", Position::new(0.0, 0.0, 500.0)));
    world.spawn(EntityRecord::new("PlayerStart_0", "PlayerStart", Position::new(-300.0, 0.0, 92.0)));
    world.spawn(EntityRecord::new("Floor", "StaticMeshActor", Position::new(0.0, 0.0, 0.0)));
    world.spawn(EntityRecord::new("Cube_1", "StaticMeshActor", Position::new(450.0, -120.5, 50.0)));
    world.spawn(EntityRecord::new(
        "BP_FirstPersonCharacter_C_0",
        "BP_FirstPersonCharacter_C",
        Position::new(-300.0, 0.0, 92.0),
    ));
    world.possess("BP_FirstPersonCharacter_C_0");
    world
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let config = NarratorConfig::from_env().context("invalid narrator configuration")?;
    tracing::info!("Narrator Booting... endpoint={}", config.endpoint);

    let source: Box<dyn EntitySource> = match &config.world_file {
        Some(path) => {
            tracing::info!("Reading world from {:?}", path);
            Box::new(JsonFileWorld::new(path))
        }
        None => {
            tracing::info!("No world file configured, using demo world");
            Box::new(demo_world())
        }
    };

    let mut reactor = Reactor::new(&config, Box::new(ConsoleSink))
        .context("failed to build completion client")?;

    tracing::info!("Narrator Active. Press Ctrl+C to stop.");
    reactor
        .run(source.as_ref(), config.tick_interval, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    let stats = reactor.telemetry.snapshot();
    tracing::info!(
        "Session: {} ticks ({} changed), {} requests, {} applied, {} discarded",
        stats.tick_stats.total,
        stats.tick_stats.changed,
        stats.request_stats.dispatched,
        stats.request_stats.applied,
        stats.request_stats.discarded,
    );

    Ok(())
}
