use tracing_subscriber::{FmtSubscriber, EnvFilter};
use tokio::io::{AsyncBufReadExt, BufReader};
use narrator::kernel::reactor::Reactor;
use narrator::outputs::text::ConsoleSink;
use narrator::world::command::WorldCommand;
use narrator::world::source::StaticWorld;
use narrator::NarratorConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let _ = dotenvy::dotenv();
    let config = NarratorConfig::from_env()?;

    tracing::info!("Starting live world session against {}", config.endpoint);

    // 2. Setup Reactor + empty world
    let mut world = StaticWorld::new();
    let mut reactor = Reactor::new(&config, Box::new(ConsoleSink))?;
    reactor.initialize(&world);

    // 3. Each stdin edit is followed by exactly one tick
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    println!("Commands: spawn <name> <type> <x> <y> <z> | move <name> <x> <y> <z> | despawn <name> | possess <name> | release | tick");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() { continue; }

                match line.parse::<WorldCommand>() {
                    Ok(command) => {
                        if !command.apply(&mut world) {
                            tracing::warn!("No entity matched '{}'", line.trim());
                        }
                        let report = reactor.tick_step(&world);
                        tracing::info!(
                            "Tick {}: changed={} dispatched={:?}",
                            report.tick.frame, report.changed, report.dispatched
                        );
                    }
                    Err(e) => println!("{}", e),
                }
            }
            Some(delivery) = reactor.receiver.recv() => {
                reactor.apply_completion(delivery);
            }
        }
    }

    // Let in-flight requests land before exiting
    while reactor.in_flight() > 0 {
        match tokio::time::timeout(std::time::Duration::from_secs(5), reactor.apply_next()).await {
            Ok(Some(_)) => {}
            _ => break,
        }
    }

    Ok(())
}
