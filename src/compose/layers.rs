//! Priority-ordered layer resolution.
//!
//! Layers are partial templates. They are applied lowest priority first and
//! deep-merged, so higher priorities overwrite lower ones at the point of
//! conflict. Arrays are replaced wholesale, never concatenated.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::merger::deep_merge;
use crate::error::{ComposeError, Result};
use crate::model::{Layer, ResolvedTemplate, Template};

/// Merge `layers` into one resolved template.
///
/// Layers are stably sorted by ascending priority: equal priorities keep
/// their input order. The provenance list records each layer's source in
/// application order. Keys the template model does not define survive in
/// [`ResolvedTemplate::merged`].
///
/// # Errors
///
/// [`ComposeError::ValidationError`] for an empty layer list, a layer whose
/// content is not an object, or a merged result that is not a valid
/// template; [`ComposeError::UnknownStrategy`] for an unrecognized merge
/// strategy in the merged result.
pub fn resolve_conflicts(layers: &[Layer]) -> Result<ResolvedTemplate> {
    resolve_conflicts_at(layers, Utc::now())
}

/// [`resolve_conflicts`] with an explicit resolution timestamp.
pub fn resolve_conflicts_at(layers: &[Layer], now: DateTime<Utc>) -> Result<ResolvedTemplate> {
    let (merged, sources) = merge_layers(layers)?;
    let template = Template::from_value(merged.clone())?;

    Ok(ResolvedTemplate {
        template,
        resolved: true,
        resolved_at: now,
        sources,
        merged,
    })
}

/// Fold layer contents in priority order without casting the result.
///
/// Returns the merged object and the layer sources in application order.
pub fn merge_layers(layers: &[Layer]) -> Result<(Value, Vec<String>)> {
    if layers.is_empty() {
        return Err(ComposeError::invalid("<layers>", "at least one layer is required"));
    }

    let ordered = application_order(layers);

    let mut merged = Value::Object(Default::default());
    let mut sources = Vec::with_capacity(ordered.len());
    for layer in ordered {
        if !layer.content.is_object() {
            return Err(ComposeError::invalid(
                &layer.source,
                "layer content must be an object",
            ));
        }

        tracing::debug!(
            "Applying {:?} layer {} (priority {})",
            layer.kind,
            layer.source,
            layer.priority
        );
        merged = deep_merge(&merged, &layer.content);
        sources.push(layer.source.clone());
    }

    Ok((merged, sources))
}

/// Layers sorted for application, lowest priority first.
fn application_order(layers: &[Layer]) -> Vec<&Layer> {
    let mut ordered: Vec<&Layer> = layers.iter().collect();
    // sort_by_key is stable
    ordered.sort_by_key(|layer| layer.priority);
    ordered
}

/// Collects layers and answers provenance questions about them.
///
/// # Example
///
/// ```
/// use doc_composer::compose::LayerStack;
/// use doc_composer::model::{Layer, LayerKind};
/// use serde_json::json;
///
/// let mut stack = LayerStack::new();
/// stack.push(Layer::new(LayerKind::Base, 0, json!({ "id": "q", "name": "Quote" }), "base"));
/// stack.push(Layer::new(LayerKind::Theme, 5, json!({ "name": "Dark Quote" }), "theme"));
///
/// let resolved = stack.resolve().unwrap();
/// assert_eq!(resolved.template.name, "Dark Quote");
/// assert_eq!(stack.source_of("name"), Some("theme"));
/// assert_eq!(stack.source_of("id"), Some("base"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    /// Create a new empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer.
    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Add a layer, builder style.
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.push(layer);
        self
    }

    /// Merge all layers.
    pub fn resolve(&self) -> Result<ResolvedTemplate> {
        resolve_conflicts(&self.layers)
    }

    /// Source of the layer whose value wins at a dotted key path.
    ///
    /// Returns the last layer in application order that defines the path.
    pub fn source_of(&self, path: &str) -> Option<&str> {
        application_order(&self.layers)
            .into_iter()
            .rev()
            .find(|layer| lookup(&layer.content, path).is_some())
            .map(|layer| layer.source.as_str())
    }

    /// Get all layers in insertion order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}
