use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use std::sync::Arc;
use webmap::{
    layers::factory::AdapterFactory,
    ngw::{
        mixin::ResourceAdapterFactory, resource_of, NgwAdapterType, NgwKit, NgwKitOptions,
        NgwLayerOptions, ResourceDef, ResourceId,
    },
    LayerEvent, WebMap, WebMapBuilder,
};

#[derive(Parser, Debug)]
#[command(
    name = "webmap-inspect",
    version,
    about = "Resolve NextGIS Web resources into webmap layers",
    arg_required_else_help = true
)]
struct Cli {
    /// NextGIS Web instance, e.g. https://demo.nextgis.com
    #[arg(long, value_name = "URL")]
    url: String,
    #[arg(long)]
    login: Option<String>,
    #[arg(long, requires = "login")]
    password: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the adapter a resource resolves to
    Resolve {
        resource: ResourceId,
        /// IMAGE, TILE or GEOJSON
        #[arg(long, value_parser = parse_adapter)]
        adapter: Option<NgwAdapterType>,
    },
    /// Add a resource to a headless map and print the registry
    Add {
        resource: ResourceId,
        #[arg(long, value_parser = parse_adapter)]
        adapter: Option<NgwAdapterType>,
    },
    /// Open a web map and print its materialized layers
    Open { resource: ResourceId },
}

fn parse_adapter(value: &str) -> std::result::Result<NgwAdapterType, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    webmap::init_logging();
    let cli = Cli::parse();

    let mut options = NgwKitOptions::new(&cli.url);
    if let Some(login) = &cli.login {
        options = options.with_auth(login, cli.password.as_deref().unwrap_or_default());
    }

    match cli.command {
        Command::Resolve { resource, adapter } => {
            let kit = NgwKit::new(options).context("failed to set up the connector")?;
            let map = WebMapBuilder::new().build();
            let factory = kit
                .resolve(&map, layer_options(resource, adapter))
                .await
                .ok_or_else(|| anyhow!("resource {} has nothing to render", resource))?;
            log::debug!("resource {} resolved to {}", resource, factory.kind());
            print_factory(resource, &factory);
        }
        Command::Add { resource, adapter } => {
            let kit = NgwKit::new(options).context("failed to set up the connector")?;
            let map = WebMapBuilder::new().build_and_create().await?;
            let events = record_events(&map);

            let layer = kit
                .add_ngw_layer(&map, layer_options(resource, adapter), Default::default())
                .await?
                .ok_or_else(|| anyhow!("resource {} has nothing to render", resource))?;
            log::debug!("resource {} added as layer {}", resource, layer.id());
            map.show_layer(&layer);
            print_registry(&map, &events);
        }
        Command::Open { resource } => {
            let kit = NgwKit::new(options.with_resource(ResourceDef::Id(resource)))
                .context("failed to set up the connector")?;
            let map = WebMapBuilder::new()
                .with_starter_kit(Arc::new(kit))
                .build();
            let events = record_events(&map);
            map.create().await?;
            log::info!("web map {} opened with {} layers", resource, map.get_layers().len());
            print_registry(&map, &events);
        }
    }
    Ok(())
}

fn layer_options(resource: ResourceId, adapter: Option<NgwAdapterType>) -> NgwLayerOptions {
    NgwLayerOptions {
        resource_id: resource,
        adapter,
        id: None,
    }
}

fn record_events(map: &WebMap) -> Arc<Mutex<Vec<String>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    map.events().lifecycle.on(move |event: &LayerEvent| {
        sink.lock()
            .push(format!("{} {}", event.name(), event.layer().id()));
    });
    log
}

fn print_factory(resource: ResourceId, factory: &AdapterFactory) {
    let bound = factory
        .as_any()
        .downcast_ref::<ResourceAdapterFactory>()
        .and_then(|f| f.binding().item.clone());
    match bound {
        Some(item) => println!("{} -> {} ({})", resource, factory.kind(), item),
        None => println!("{} -> {} (metadata unavailable)", resource, factory.kind()),
    }
}

fn print_registry(map: &WebMap, events: &Mutex<Vec<String>>) {
    println!("layers:");
    let mut layers: Vec<_> = map
        .get_layers()
        .into_iter()
        .filter_map(|id| map.get_layer(id))
        .collect();
    layers.sort_by_key(|layer| layer.order());

    for layer in layers {
        let resource = resource_of(&layer)
            .and_then(|r| r.resource_id())
            .map(|id| format!(" resource {}", id))
            .unwrap_or_default();
        println!(
            "  {:<12} {:<12} order {:<3} {}{}",
            layer.id(),
            layer.kind().to_string(),
            layer.order(),
            if layer.is_visible() { "visible" } else { "hidden" },
            resource
        );
    }

    println!("events:");
    for event in events.lock().iter() {
        println!("  {}", event);
    }
}
