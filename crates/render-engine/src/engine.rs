//! The announcement generator session.
//!
//! A [`CompositingEngine`] lives for as long as the generator is open. It
//! exclusively owns the composition state, the decoded template and photo,
//! and the last rendered raster. Parameter changes go through `&mut self`,
//! so they are serialized and can never overlap a render or an upload.
//!
//! Images are decoded to completion before they are installed: a failed
//! decode leaves the state, the installed images, and the last raster
//! exactly as they were.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use birthcard_common::clock::Clock;
use birthcard_common::error::{BirthcardError, BirthcardResult};
use birthcard_composition_model::gender::Gender;
use birthcard_composition_model::layer::{LayerField, LayerKind, Layout};
use birthcard_composition_model::record::SourceRecord;
use birthcard_composition_model::state::CompositionState;

use crate::assets::{decode_image, DecodedImage, TemplateSource};
use crate::compositor::{render, RenderInputs, RenderReport, TextPainters};
use crate::export::{
    export_local, export_remote, StageCallback, StorageCollaborator, UploadTarget, UploadedRef,
};
use crate::raster::Raster;

/// Construction-time settings for an engine.
#[derive(Clone)]
pub struct EngineOptions {
    /// Initial layer layout. Its photo size is also the size a new photo starts at.
    pub layout: Layout,
    pub painters: TextPainters,
    /// Re-render after every parameter change.
    pub auto_render: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            painters: TextPainters::default(),
            auto_render: true,
        }
    }
}

pub struct CompositingEngine {
    templates: Arc<dyn TemplateSource>,
    painters: TextPainters,
    clock: Arc<dyn Clock>,
    auto_render: bool,
    default_photo_size: f64,

    state: CompositionState,
    template: DecodedImage,
    photo: Option<DecodedImage>,
    record: Option<SourceRecord>,
    focus: LayerKind,

    raster: Option<Raster>,
    report: Option<RenderReport>,
    stale: bool,
}

impl CompositingEngine {
    /// Open a generator, optionally bound to the record it was launched from.
    ///
    /// The state is seeded from the record (or the current date and time)
    /// and the matching template is loaded before the first render.
    pub async fn open(
        templates: Arc<dyn TemplateSource>,
        clock: Arc<dyn Clock>,
        record: Option<SourceRecord>,
        options: EngineOptions,
    ) -> BirthcardResult<Self> {
        let state = CompositionState::seed(record.as_ref(), options.layout, clock.as_ref());
        let template = templates.load(state.gender).await?;

        tracing::info!(
            gender = %state.gender,
            width = template.natural_width(),
            height = template.natural_height(),
            record = record.as_ref().map(|r| r.id),
            "Opened announcement generator"
        );

        let mut engine = Self {
            templates,
            painters: options.painters,
            clock,
            auto_render: options.auto_render,
            default_photo_size: options.layout.photo.size_percent,
            state,
            template,
            photo: None,
            record,
            focus: LayerKind::Cast,
            raster: None,
            report: None,
            stale: true,
        };
        if engine.auto_render {
            engine.render();
        }
        Ok(engine)
    }

    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    pub fn record(&self) -> Option<&SourceRecord> {
        self.record.as_ref()
    }

    /// Whether this generator can attach its output to a record.
    pub fn can_upload_to_record(&self) -> bool {
        self.record.is_some()
    }

    /// The layer currently being edited.
    pub fn focus(&self) -> LayerKind {
        self.focus
    }

    pub fn set_focus(&mut self, layer: LayerKind) {
        self.focus = layer;
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    pub fn template_dimensions(&self) -> (u32, u32) {
        (self.template.natural_width(), self.template.natural_height())
    }

    /// Whether the state changed since the last render.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// The last rendered raster, if any.
    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    pub fn last_report(&self) -> Option<&RenderReport> {
        self.report.as_ref()
    }

    /// Render the current state, replacing the previous raster.
    pub fn render(&mut self) -> &Raster {
        let (raster, report) = render(&RenderInputs {
            state: &self.state,
            template: &self.template,
            photo: self.photo.as_ref(),
            painters: &self.painters,
        });
        self.report = Some(report);
        self.stale = false;
        self.raster.insert(raster)
    }

    fn changed(&mut self) {
        self.stale = true;
        if self.auto_render {
            self.render();
        }
    }

    /// Switch templates. The new template is fully decoded before it replaces the old one.
    pub async fn set_gender(&mut self, gender: Gender) -> BirthcardResult<()> {
        if gender == self.state.gender {
            return Ok(());
        }
        let template = match self.templates.load(gender).await {
            Ok(template) => template,
            Err(e) => {
                tracing::warn!(gender = %gender, error = %e, "Template load failed; keeping current template");
                return Err(e);
            }
        };
        tracing::debug!(
            gender = %gender,
            width = template.natural_width(),
            height = template.natural_height(),
            "Template swapped"
        );
        self.template = template;
        self.state.gender = gender;
        self.changed();
        Ok(())
    }

    pub async fn toggle_gender(&mut self) -> BirthcardResult<()> {
        self.set_gender(self.state.gender.toggled()).await
    }

    /// Install a user photo from encoded bytes.
    ///
    /// The photo starts centered, unzoomed, unpanned, at the configured
    /// default size, and editing focus moves to the photo layer.
    pub async fn set_photo(&mut self, bytes: Vec<u8>) -> BirthcardResult<()> {
        let photo = match decode_image(bytes).await {
            Ok(photo) => photo,
            Err(e) => {
                tracing::warn!(error = %e, "Photo decode failed; keeping current photo");
                return Err(e);
            }
        };
        tracing::debug!(
            width = photo.natural_width(),
            height = photo.natural_height(),
            "Photo installed"
        );
        self.photo = Some(photo);
        let layout = &mut self.state.layout.photo;
        layout.reset_placement();
        layout.size_percent = self.default_photo_size;
        self.focus = LayerKind::Photo;
        self.changed();
        Ok(())
    }

    pub fn clear_photo(&mut self) {
        if self.photo.take().is_some() {
            if self.focus == LayerKind::Photo {
                self.focus = LayerKind::Cast;
            }
            self.changed();
        }
    }

    /// Change one field of one layer. Values are clamped to their accepted range.
    pub fn set_layer_field(&mut self, layer: LayerKind, field: LayerField) -> BirthcardResult<()> {
        self.state.layout.apply(layer, field)?;
        tracing::debug!(layer = %layer, field = ?field, "Layer field changed");
        self.changed();
        Ok(())
    }

    pub fn set_caption(&mut self, text: impl Into<String>) {
        self.state.caption = text.into();
        self.changed();
    }

    /// Set the raw `YYYY-MM-DD` date input. Empty clears it.
    pub fn set_date(&mut self, raw: impl Into<String>) {
        self.state.raw_date = raw.into();
        self.changed();
    }

    /// Set the raw `HH:MM` time input. Empty clears it.
    pub fn set_time(&mut self, raw: impl Into<String>) {
        self.state.raw_time = raw.into();
        self.changed();
    }

    fn exportable_raster(&self) -> BirthcardResult<(&Raster, &RenderReport)> {
        let (Some(raster), Some(report)) = (self.raster.as_ref(), self.report.as_ref()) else {
            return Err(BirthcardError::NotRendered);
        };
        if self.stale {
            tracing::warn!("Exporting the last rendered image; parameters changed since");
        }
        Ok((raster, report))
    }

    /// Save the last rendered image as a PNG in `dir`.
    ///
    /// The file is named after the template the image was rendered with.
    pub fn export_local(&self, dir: &Path) -> BirthcardResult<PathBuf> {
        let (raster, report) = self.exportable_raster()?;
        export_local(raster, report.gender, dir, self.clock.as_ref())
    }

    /// Upload the last rendered image and attach it to the bound record.
    ///
    /// Failures leave the engine untouched so the action can simply be retried.
    pub async fn export_remote(
        &mut self,
        storage: &dyn StorageCollaborator,
        target: &UploadTarget,
        on_stage: Option<StageCallback<'_>>,
    ) -> BirthcardResult<UploadedRef> {
        let record = self.record.as_ref().ok_or(BirthcardError::NoSourceRecord)?;
        let (raster, _) = self.exportable_raster()?;
        export_remote(
            raster,
            record,
            storage,
            target,
            self.clock.as_ref(),
            on_stage,
        )
        .await
    }
}
