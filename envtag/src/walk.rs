//! Struct traversal.
//!
//! `#[derive(Env)]` generates an [`EnvStruct`] impl that hands every field,
//! together with its static [`FieldSpec`], to a [`FieldVisitor`]. The walker
//! in this module is the only visitor the crate uses: it parses each field's
//! annotation, runs a field processor, then recurses into nested structs with
//! the field's prefix appended.

use crate::convert::EnvField;
use crate::error::{AggregateError, EnvError};
use crate::options::Options;
use crate::params::{parse_field_params, FieldParams};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Static description of one struct field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Rust field name
    pub name: &'static str,
    /// `false` for private fields, which the walker skips
    pub exported: bool,
    /// Annotation table, tag name to literal value
    pub tags: &'static [(&'static str, &'static str)],
}

impl FieldSpec {
    /// Value of the tag `name`; `Some("")` when declared empty, `None` when absent
    pub fn tag(&self, name: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(tag, _)| *tag == name)
            .map(|(_, value)| *value)
    }
}

/// A struct whose fields can be populated from the environment.
pub trait EnvStruct {
    /// Hand every field to `visitor` in declaration order
    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor);
}

pub trait FieldVisitor {
    fn visit(&mut self, spec: &FieldSpec, field: &mut dyn EnvField);
}

/// Per-call walk state.
pub(crate) struct Context<'o> {
    pub(crate) options: &'o Options,
    /// Accumulated prefix for the struct currently being walked
    pub(crate) prefix: String,
    /// Values resolved so far in this pass, keyed by own key
    pub(crate) raw_values: HashMap<String, String>,
}

/// What the walker does with each exported field.
pub(crate) trait ProcessField {
    fn process(
        &mut self,
        cx: &mut Context<'_>,
        spec: &FieldSpec,
        params: &FieldParams,
        field: &mut dyn EnvField,
    ) -> Result<(), EnvError>;
}

/// Records the params of every field with a key.
#[derive(Debug, Default)]
pub(crate) struct CollectParams {
    pub(crate) params: Vec<FieldParams>,
}

impl ProcessField for CollectParams {
    fn process(
        &mut self,
        _cx: &mut Context<'_>,
        _spec: &FieldSpec,
        params: &FieldParams,
        _field: &mut dyn EnvField,
    ) -> Result<(), EnvError> {
        if !params.own_key.is_empty() {
            self.params.push(params.clone());
        }
        Ok(())
    }
}

pub(crate) struct Walker<'o, P> {
    cx: Context<'o>,
    processor: P,
    errors: Vec<EnvError>,
}

impl<'o, P: ProcessField> Walker<'o, P> {
    pub(crate) fn new(options: &'o Options, processor: P) -> Self {
        Self {
            cx: Context {
                options,
                prefix: options.prefix.clone(),
                raw_values: HashMap::new(),
            },
            processor,
            errors: Vec::new(),
        }
    }

    /// Walk `target` and return the processor, or every failure in field order.
    pub(crate) fn run(mut self, target: &mut dyn EnvStruct) -> Result<P, AggregateError> {
        target.visit_fields(&mut self);

        let Walker {
            processor, errors, ..
        } = self;
        debug!(failures = errors.len(), "environment walk finished");
        match AggregateError::new(errors) {
            Some(err) => Err(err),
            None => Ok(processor),
        }
    }
}

impl<P: ProcessField> FieldVisitor for Walker<'_, P> {
    fn visit(&mut self, spec: &FieldSpec, field: &mut dyn EnvField) {
        if !spec.exported {
            trace!(field = spec.name, "skipping private field");
            return;
        }

        let params = match parse_field_params(spec, self.cx.options, &self.cx.prefix) {
            Ok(params) => params,
            Err(err) => {
                self.errors.push(err);
                return;
            }
        };

        if let Err(err) = self.processor.process(&mut self.cx, spec, &params, field) {
            self.errors.push(err);
            return;
        }

        if params.init {
            field.init();
        }

        if let Some(inner) = field.nested() {
            let outer_len = self.cx.prefix.len();
            let options = self.cx.options;
            self.cx
                .prefix
                .push_str(spec.tag(&options.prefix_tag_name).unwrap_or_default());
            trace!(field = spec.name, prefix = %self.cx.prefix, "entering nested struct");
            inner.visit_fields(self);
            self.cx.prefix.truncate(outer_len);
        }
    }
}
