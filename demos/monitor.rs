//! Ground station monitor
//!
//! Binds the telemetry link, logs every decoded record and the link's online/lost
//! transitions, and optionally sends one telecommand at startup.
//!
//! ```text
//! RUST_LOG=groundlink=debug cargo run --example monitor -- [remote_addr] [id identifier value]
//! ```

use anyhow::Context;
use futures::StreamExt;
use groundlink::{
    Command, Groundlink, LinkConfig, LinkEvent, Telemetry, Topic, UpdateRate,
    connection::LINK_LOST_AFTER,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = LinkConfig::default();
    if let Some(remote) = args.first() {
        config.remote_addr = remote.parse().context("remote address must be ip:port")?;
    }

    let connection = Groundlink::bind(config).await.context("binding telemetry link")?;
    info!(local = ?connection.local_addr(), "Monitoring telemetry");
    let _monitor = connection.spawn_link_monitor(LINK_LOST_AFTER);

    if let [_, id, identifier, value] = args.as_slice() {
        let command = Command::new(id.parse()?, identifier.parse()?, value.parse()?);
        connection.send_command(Topic::TELECOMMAND, command).await?;
    }

    let mut events = connection
        .events()
        .filter_map(|event| async move {
            match event {
                LinkEvent::Status(line) => Some(line),
                LinkEvent::DataReady { .. } => None,
            }
        })
        .boxed();
    let mut telemetry = connection.telemetry(UpdateRate::Native);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(line) = events.next() => info!("{}", line),
            Some(record) = telemetry.next() => match record {
                Telemetry::Electrical(power) => info!(
                    voltage = power.battery_voltage,
                    current = power.battery_current,
                    power = power.battery_power(),
                    "Electrical"
                ),
                other => info!(topic = %other.topic(), record = ?other, "Telemetry"),
            },
        }
    }

    info!(metrics = ?connection.metrics(), "Shutting down");
    Ok(())
}
