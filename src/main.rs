//! Headless demo: scripts one editing session and logs what happens.

use scenekit::settings::{default_config_path, Config};
use scenekit::{
    init_logging, AppEvent, AssetLibrary, EditorSettings, EditorState, ElementKind, ElementPatch,
    EventBus, EventFilter, HandleKind, MemoryAssetStore, PointerEvent, RuntimeUrls, SceneStore,
    ToolId,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

fn load_config() -> anyhow::Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => Ok(Config::load_from_file(&PathBuf::from(path))?),
        None => match default_config_path() {
            Ok(path) => Ok(Config::load_or_default(&path)?),
            Err(_) => Ok(Config::default()),
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_logging(&config.logging.level)?;
    tracing::info!(
        "SceneKit {} (built {})",
        scenekit::VERSION,
        scenekit::BUILD_DATE
    );

    let bus = Arc::new(EventBus::new());
    bus.subscribe(EventFilter::All, |event: AppEvent| {
        tracing::debug!("event: {}", event.description());
    });

    // Tally events per category on a separate task until the bus goes away.
    let mut events = bus.receiver();
    let tally = tokio::spawn(async move {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        loop {
            match events.recv().await {
                Ok(event) => *counts.entry(event.category().to_string()).or_default() += 1,
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("Event tally missed {} events", missed)
                }
                Err(RecvError::Closed) => break,
            }
        }
        counts
    });

    let mut editor = EditorState::with_event_bus(EditorSettings::from(&config), bus.clone());

    // Draw a rectangle and an ellipse.
    editor.set_tool(ToolId::Draw(ElementKind::Rectangle));
    editor.pointer_down(PointerEvent::at(40.0, 40.0));
    editor.pointer_move(PointerEvent::at(100.0, 80.0));
    editor.pointer_up(PointerEvent::at(140.0, 100.0));

    editor.set_tool(ToolId::Draw(ElementKind::Ellipse));
    editor.pointer_down(PointerEvent::at(200.0, 60.0));
    editor.pointer_up(PointerEvent::at(260.0, 120.0));

    // Marquee both.
    editor.pointer_down(PointerEvent::at(0.0, 0.0));
    editor.pointer_move(PointerEvent::at(150.0, 150.0));
    editor.pointer_up(PointerEvent::at(300.0, 300.0));
    tracing::info!("Selected {} elements", editor.selection().len());

    // Rotate the group a quarter turn through the rotate handle.
    if let Some(bounds) = editor.selection_bounds() {
        let center = bounds.center();
        let radius = center.y - bounds.y + 30.0;
        editor.on_handle_pointer_down(
            HandleKind::Rotate,
            PointerEvent::at(center.x, center.y - radius),
        );
        editor.pointer_move(PointerEvent::at(center.x + radius, center.y - radius));
        editor.pointer_up(PointerEvent::at(center.x + radius, center.y + 1.0));
    }
    for element in editor.scene().elements() {
        tracing::info!(
            "{} {} rotated to {:.1} degrees",
            element.kind,
            element.id,
            element.geometry.rotation.to_degrees()
        );
    }

    editor.undo();
    tracing::info!(
        "After undo: redo available = {:?}",
        editor.history().redo_description()
    );
    editor.redo();

    // Images resolve through the asset cache.
    let (library, registry) = AssetLibrary::with_object_urls(
        Arc::new(MemoryAssetStore::new()),
        &config.assets.url_scheme,
        Some(bus.clone()),
    );
    let library = library.with_key_prefix(config.assets.key_prefix.clone());
    let key = library.import(b"\x89PNG demo".to_vec()).await?;
    editor.create_element(
        ElementKind::Image,
        320.0,
        40.0,
        ElementPatch::new().with_asset_key(key.clone()),
    );
    let mut urls = RuntimeUrls::new();
    let report = urls.sync(editor.scene_mut(), &library).await;
    tracing::info!(
        "Hydrated {} image(s); {} live URL(s)",
        report.hydrated,
        registry.live_count()
    );

    tracing::info!("Scene:\n{}", serde_json::to_string_pretty(editor.scene())?);

    // Deleting the image gives its reference back; undo resolves it again.
    editor.delete_selected();
    let report = urls.sync(editor.scene_mut(), &library).await;
    tracing::info!(
        "Deleted image: released {}, {} live URL(s)",
        report.released,
        registry.live_count()
    );
    editor.undo();
    let report = urls.sync(editor.scene_mut(), &library).await;
    tracing::info!(
        "Undo delete: hydrated {}, {} live URL(s)",
        report.hydrated,
        registry.live_count()
    );

    urls.release_all(editor.scene_mut(), &library);
    tracing::info!(
        "Released runtime URLs; {} live, {} revoked",
        registry.live_count(),
        registry.revoked_count()
    );

    drop(editor);
    drop(library);
    drop(bus);
    for (category, count) in tally.await? {
        tracing::info!("{} events: {}", category, count);
    }

    Ok(())
}
