//! 模板回退模块：在远程生成不可用时，根据关键词与模板确定性地生成工作流。
//!
//! # Template Fallback Module
//!
//! When the remote generation service times out, fails, or returns something
//! unusable, the pipeline still owes the caller a valid workflow. This module produces
//! one locally, from a data-driven catalog of templates.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`TemplateCatalog`] | `category -> ordered templates`, loaded from YAML |
//! | [`CategoryTemplates`] | Keywords, integrations and templates of one category |
//! | [`TemplateDescriptor`] | Name/description/steps of one template |
//! | [`select_category`] | Keyword scoring over title, description and tags |
//! | [`FallbackGenerator`] | Total generator producing `status = fallback` artifacts |
//!
//! ## Variation Selection
//!
//! Variation `n` of a subtask uses `templates[n mod len]` of its category, so asking for
//! more variations than there are templates cycles instead of failing. The whole table is
//! enumerable through [`TemplateCatalog::strategies`].

mod catalog;
mod generator;
mod matcher;

pub use catalog::{
    CategoryTemplates, StepTemplates, TemplateCatalog, TemplateDescriptor, GENERIC_CATEGORY,
};
pub use generator::FallbackGenerator;
pub use matcher::select_category;
