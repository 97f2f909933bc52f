//! The invariant output-column layout.
//!
//! Every row a stage emits has the same shape for the life of the run:
//! `[passthrough columns?] + [field columns in configured order] + [active
//! enrichment columns in canonical order]`. `RowLayout` is the single
//! authority for that ordering and for the derived output schema.

use super::config::{EnrichmentFields, StageConfig, active_name};
use crate::types::{Column, Schema, ValueType};

/// The file-metadata enrichment columns, in no particular order.
///
/// [`EnrichmentKind::CANONICAL_ORDER`] fixes the order they occupy in the
/// output row; a column whose output name is unconfigured is omitted without
/// leaving a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentKind {
    Filename,
    RowNumber,
    ShortFilename,
    Extension,
    Path,
    Hidden,
    LastModified,
    Uri,
    RootUri,
    /// The extractor's metadata mapping, serialized as a flat JSON object.
    MetadataJson,
}

impl EnrichmentKind {
    /// The fixed order enrichment columns occupy in the output row.
    pub const CANONICAL_ORDER: [EnrichmentKind; 10] = [
        EnrichmentKind::Filename,
        EnrichmentKind::RowNumber,
        EnrichmentKind::ShortFilename,
        EnrichmentKind::Extension,
        EnrichmentKind::Path,
        EnrichmentKind::Hidden,
        EnrichmentKind::LastModified,
        EnrichmentKind::Uri,
        EnrichmentKind::RootUri,
        EnrichmentKind::MetadataJson,
    ];

    /// The configured output-column name for this kind, if any.
    pub fn configured_name<'a>(&self, enrichment: &'a EnrichmentFields) -> Option<&'a str> {
        match self {
            EnrichmentKind::Filename => active_name(&enrichment.filename),
            EnrichmentKind::RowNumber => active_name(&enrichment.row_number),
            EnrichmentKind::ShortFilename => active_name(&enrichment.short_filename),
            EnrichmentKind::Extension => active_name(&enrichment.extension),
            EnrichmentKind::Path => active_name(&enrichment.path),
            EnrichmentKind::Hidden => active_name(&enrichment.hidden),
            EnrichmentKind::LastModified => active_name(&enrichment.last_modified),
            EnrichmentKind::Uri => active_name(&enrichment.uri),
            EnrichmentKind::RootUri => active_name(&enrichment.root_uri),
            EnrichmentKind::MetadataJson => active_name(&enrichment.metadata),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            EnrichmentKind::RowNumber => ValueType::Integer,
            EnrichmentKind::Hidden => ValueType::Boolean,
            EnrichmentKind::LastModified => ValueType::Date,
            _ => ValueType::String,
        }
    }
}

/// The resolved column layout of one stage run.
#[derive(Debug, Clone)]
pub struct RowLayout {
    passthrough: Schema,
    field_columns: Vec<Column>,
    enrichment: Vec<(EnrichmentKind, String)>,
}

impl RowLayout {
    /// Resolve the layout from configuration and, in streamed mode, the
    /// upstream schema whose columns pass through verbatim.
    pub fn new(config: &StageConfig, upstream: Option<&Schema>) -> Self {
        let field_columns = config
            .fields
            .iter()
            .map(|f| Column::new(f.name.clone(), f.target_type))
            .collect();

        let enrichment = EnrichmentKind::CANONICAL_ORDER
            .iter()
            .filter_map(|kind| {
                kind.configured_name(&config.enrichment)
                    .map(|name| (*kind, name.to_string()))
            })
            .collect();

        Self {
            passthrough: upstream.cloned().unwrap_or_default(),
            field_columns,
            enrichment,
        }
    }

    /// Number of leading columns copied verbatim from the upstream record.
    pub fn passthrough_width(&self) -> usize {
        self.passthrough.len()
    }

    /// Index of the first field column.
    pub fn field_offset(&self) -> usize {
        self.passthrough_width()
    }

    /// Index of the first enrichment column.
    pub fn enrichment_offset(&self) -> usize {
        self.passthrough_width() + self.field_columns.len()
    }

    /// Total number of columns in every emitted row.
    pub fn column_count(&self) -> usize {
        self.enrichment_offset() + self.enrichment.len()
    }

    /// Active enrichment columns, in canonical order, with their output
    /// names.
    pub fn active_enrichments(&self) -> &[(EnrichmentKind, String)] {
        &self.enrichment
    }

    /// The full output schema: passthrough, then fields, then enrichment.
    pub fn output_schema(&self) -> Schema {
        let mut columns = Vec::with_capacity(self.column_count());
        columns.extend(self.passthrough.columns.iter().cloned());
        columns.extend(self.field_columns.iter().cloned());
        columns.extend(
            self.enrichment
                .iter()
                .map(|(kind, name)| Column::new(name.clone(), kind.value_type())),
        );
        Schema::new(columns)
    }
}
