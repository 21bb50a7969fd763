//! Composition flags shared by `render` and `upload`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use birthcard_common::clock::{Clock, SystemClock};
use birthcard_common::config::AppConfig;
use birthcard_common::error::BirthcardResult;
use birthcard_composition_model::gender::Gender;
use birthcard_composition_model::layer::{LayerField, LayerKind, Layout, PhotoLayout};
use birthcard_composition_model::record::SourceRecord;
use birthcard_render_engine::{CompositingEngine, DirTemplateSource, EngineOptions, TextPainters};

#[derive(Args, Debug, Clone, Default)]
pub struct ComposeArgs {
    /// Template to use: boy or girl (defaults to the record's, else boy)
    #[arg(long)]
    pub gender: Option<Gender>,

    /// Cast line text
    #[arg(long)]
    pub caption: Option<String>,

    /// Date as YYYY-MM-DD (empty string hides it)
    #[arg(long)]
    pub date: Option<String>,

    /// Time as HH:MM (empty string hides it)
    #[arg(long)]
    pub time: Option<String>,

    /// Photo to place in the circular frame
    #[arg(long)]
    pub photo: Option<PathBuf>,

    /// Layout JSON file (see `birthcard layout`)
    #[arg(long)]
    pub layout: Option<PathBuf>,

    /// Layer edit as layer.field=value, e.g. photo.zoom=150 or cast.color=#FF0000
    #[arg(long = "set", value_name = "LAYER.FIELD=VALUE")]
    pub set: Vec<String>,
}

/// Re-apply a layout's photo position, zoom, and pan.
///
/// Installing a photo resets its placement, so this runs after `set_photo`
/// to honour the placement given in a layout file.
pub fn restore_photo_placement(
    engine: &mut CompositingEngine,
    placement: &PhotoLayout,
) -> BirthcardResult<()> {
    let fields = [
        LayerField::X(placement.position.x),
        LayerField::Y(placement.position.y),
        LayerField::Zoom(placement.zoom_percent),
        LayerField::PanX(placement.pan.x),
        LayerField::PanY(placement.pan.y),
    ];
    for field in fields {
        engine.set_layer_field(LayerKind::Photo, field)?;
    }
    Ok(())
}

/// Parse one `layer.field=value` edit.
pub fn parse_edit(raw: &str) -> anyhow::Result<(LayerKind, LayerField)> {
    let (target, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Edit '{raw}' is not of the form layer.field=value"))?;
    let (layer, field) = target
        .split_once('.')
        .ok_or_else(|| anyhow::anyhow!("Edit '{raw}' is missing a layer name"))?;
    let layer: LayerKind = layer.parse().map_err(anyhow::Error::msg)?;
    let field = LayerField::parse(layer, field, value).map_err(anyhow::Error::msg)?;
    Ok((layer, field))
}

impl ComposeArgs {
    pub fn load_layout(&self) -> anyhow::Result<Layout> {
        match &self.layout {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("Failed to read layout {}: {e}", path.display()))?;
                serde_json::from_str(&json)
                    .map_err(|e| anyhow::anyhow!("Invalid layout {}: {e}", path.display()))
            }
            None => Ok(Layout::default()),
        }
    }

    pub fn edits(&self) -> anyhow::Result<Vec<(LayerKind, LayerField)>> {
        self.set.iter().map(|raw| parse_edit(raw)).collect()
    }

    /// Open an engine, apply every flag, and render once.
    pub async fn open_engine(
        &self,
        config: &AppConfig,
        record: Option<SourceRecord>,
    ) -> anyhow::Result<CompositingEngine> {
        let edits = self.edits()?;
        let layout = self.load_layout()?;
        let options = EngineOptions {
            layout,
            painters: TextPainters::from_config(&config.fonts)?,
            auto_render: false,
        };
        let templates = Arc::new(DirTemplateSource::from_config(&config.templates));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let mut engine = CompositingEngine::open(templates, clock, record, options).await?;

        if let Some(gender) = self.gender {
            engine.set_gender(gender).await?;
        }
        if let Some(caption) = &self.caption {
            engine.set_caption(caption.as_str());
        }
        if let Some(date) = &self.date {
            engine.set_date(date.as_str());
        }
        if let Some(time) = &self.time {
            engine.set_time(time.as_str());
        }
        if let Some(path) = &self.photo {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read photo {}: {e}", path.display()))?;
            engine.set_photo(bytes).await?;
            restore_photo_placement(&mut engine, &layout.photo)?;
        }
        // Applied after the photo so placement edits are not reset by it.
        for (layer, field) in edits {
            engine.set_layer_field(layer, field)?;
        }

        let (width, height) = engine.render().dimensions();
        tracing::info!(
            width,
            height,
            gender = %engine.state().gender,
            "Rendered announcement"
        );
        Ok(engine)
    }
}
