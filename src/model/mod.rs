//! Data model for templates, branding, and layers.
//!
//! - Template schema and content in [`template`]
//! - Client branding in [`branding`]
//! - Layers and resolved output in [`layer`]
//!
//! All types derive `serde` traits; field names are snake_case and the
//! template kind is serialized under `type`.

pub mod branding;
pub mod layer;
pub mod template;

pub use branding::{
    BrandAssets, ClientBranding, ColorPalette, ComponentOverride, LogoAsset, StyleProperties,
    Typography,
};
pub use layer::{Layer, LayerKind, ResolvedTemplate};
pub use template::{
    Asset, AssetKind, FontSpec, Inheritance, LayoutDescriptor, Margins, MergeStrategy,
    Orientation, ParseStrategyError, SectionDecl, StylingDescriptor, Template, TemplateContent,
    TemplateKind, TemplateMetadata, TemplateSchema, VariableDecl, VariableKind,
};
