use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde_json::json;

use statehost::logging::init_tracing;
use statehost::{
    consumer, Action, ActionTableDraft, ComponentWrapper, Factory, FactoryOptions, Mapping, Value,
};

/// Mounts a counter component and drives it through dispatched actions.
#[derive(Debug, Parser)]
#[command(name = "statehost", version, about)]
struct Cli {
    /// Amount added by each INCR dispatch.
    #[arg(long, default_value_t = 1)]
    value: i64,

    /// Number of INCR dispatches.
    #[arg(long, default_value_t = 1)]
    times: u32,

    /// Share one dispatcher across mounts.
    #[arg(long)]
    singleton: bool,

    /// TOML file with factory options.
    #[arg(long)]
    options: Option<PathBuf>,
}

fn build_counter(options: FactoryOptions) -> anyhow::Result<ComponentWrapper> {
    let actions = ActionTableDraft::new().on(
        "INCR",
        Action::from_async(|ctx| async move {
            let step = ctx.props("value").await?.as_i64().unwrap_or(1);
            let count = ctx.state("count").await?.as_i64().unwrap_or(0);
            ctx.set_state(Mapping::new().with("count", count + step))
                .await?;
            ctx.state("count").await
        }),
    );

    let view = consumer(|props| {
        Value::from(json!({
            "count": props.state("count").to_json(),
            "step": props.prop("value").to_json(),
        }))
    });

    Factory::build(
        Mapping::new().with("count", 0),
        actions,
        Some(view),
        options,
    )
    .context("failed to build counter component")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut options = match &cli.options {
        Some(path) => FactoryOptions::load_from(path)?,
        None => FactoryOptions::default(),
    };
    options.singleton |= cli.singleton;

    let component = build_counter(options)?;
    let mounted = component.mount(Mapping::new().with("value", cli.value))?;

    for _ in 0..cli.times {
        mounted.dispatch("INCR", ()).await?;
    }

    println!("{}", serde_json::to_string_pretty(&mounted.rendered())?);
    mounted.unmount();
    Ok(())
}
