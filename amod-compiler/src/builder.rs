//! Construction of the [`Model`] from the syntax tree.

use std::collections::HashSet;
use std::num::ParseFloatError;

use amod_actr::{Chunk, Initializer, Model, ModuleKind, Param, ParamError, ParamValue, Similarity};
use amod_diagnostics::DiagnosticLog;

use crate::cst;
use crate::production::ProductionCompiler;
use crate::resolve::resolve_pattern;

/// Builds a [`Model`] section by section, recording every problem in the log.
///
/// The sections are processed in the order they depend on each other: the configuration (the
/// global settings, then the modules, then the chunks), the examples, the initializers and
/// finally the productions. A failing declaration is skipped, the others are still checked so
/// that a single run reports as many problems as possible.
pub(crate) struct ModelBuilder<'a> {
    model: Model,
    log: &'a mut DiagnosticLog,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(log: &'a mut DiagnosticLog) -> Self {
        Self {
            model: Model::new(""),
            log,
        }
    }

    /// Build the model of `file`. The model is meaningful only if no error has been logged.
    pub fn build(mut self, file: &cst::AmodFile) -> Model {
        self.add_model_section(&file.model);
        if let Some(config) = &file.config {
            self.add_config(config);
        }
        self.add_examples(&file.model.examples);
        if let Some(init) = &file.init {
            self.add_init(init);
        }
        if let Some(productions) = &file.productions {
            self.add_productions(productions);
        }
        self.model.finalize_implicit_chunks();
        debug!(
            "Model '{}' built: {} chunks, {} initializers, {} productions",
            self.model.name(),
            self.model.user_chunks().count(),
            self.model.initializers().len(),
            self.model.productions().len()
        );
        self.model
    }

    fn add_model_section(&mut self, section: &cst::ModelSection) {
        self.model = Model::new(section.name.as_str());
        self.model.set_description(section.description.clone());
        for author in &section.authors {
            self.model.add_author(author.as_str());
        }
    }

    fn add_config(&mut self, config: &cst::ConfigSection) {
        self.add_gactar(&config.gactar);
        self.add_modules(&config.modules);
        self.add_chunks(&config.chunks);
    }

    fn add_gactar(&mut self, fields: &[cst::Field]) {
        for field in fields {
            let Some(param) = self.field_param(field) else {
                continue;
            };
            match self.model.set_param(&param) {
                Ok(()) => {}
                Err(err) if err.is_value_error() => self.log.error(
                    Some(field.value_location),
                    format!("'{}' {}", field.key.as_str(), err),
                ),
                Err(ParamError::Unrecognized) => self.log.error(
                    Some(field.key.location),
                    format!(
                        "unrecognized parameter in gactar section: '{}'",
                        field.key.as_str()
                    ),
                ),
                Err(err) => self.log.internal_error(
                    Some(field.key.location),
                    format!(
                        "unhandled error ({}) in gactar section: '{}'",
                        err,
                        field.key.as_str()
                    ),
                ),
            }
        }
    }

    fn add_modules(&mut self, modules: &[cst::ModuleConfig]) {
        for module in modules {
            let kind = match module.name.as_str().parse::<ModuleKind>() {
                Ok(kind) => kind,
                Err(err) => {
                    self.log.error(Some(module.name.location), err.to_string());
                    continue;
                }
            };
            if let Err(err) = self.model.add_module(kind) {
                self.log.error(Some(module.name.location), err.to_string());
                continue;
            }
            for field in &module.fields {
                self.set_module_param(kind, field);
            }
        }
    }

    fn set_module_param(&mut self, kind: ModuleKind, field: &cst::Field) {
        let Some(param) = self.field_param(field) else {
            return;
        };
        let key = field.key.as_str();
        match self.model.set_module_param(kind, &param) {
            Ok(()) => {}
            Err(err) if err.is_value_error() => self.log.error(
                Some(field.value_location),
                format!("{} '{}' {}", kind, key, err),
            ),
            Err(ParamError::Unrecognized) => self.log.error(
                Some(field.key.location),
                format!("unrecognized parameter in {} config: '{}'", kind, key),
            ),
            Err(err @ ParamError::BufferExists) => self.log.error(
                Some(field.key.location),
                format!("{} '{}' {}", kind, key, err),
            ),
            Err(err) => self.log.internal_error(
                Some(field.key.location),
                format!("unhandled error ({}) in {} config: '{}'", err, kind, key),
            ),
        }
    }

    /// Typed version of a configuration field, `None` if it cannot be built (the problem is
    /// logged).
    fn field_param(&mut self, field: &cst::Field) -> Option<Param> {
        match field_to_param(field) {
            Ok(param) => Some(param),
            Err(err) => {
                self.log.internal_error(
                    Some(field.value_location),
                    format!("invalid number in field '{}': {}", field.key.as_str(), err),
                );
                None
            }
        }
    }

    fn add_chunks(&mut self, chunks: &[cst::ChunkDecl]) {
        for decl in chunks {
            let chunk = Chunk::new(
                decl.name.as_str(),
                decl.slots.iter().map(|slot| slot.name.clone()).collect(),
                decl.location.line,
            );
            match self.model.add_chunk(chunk) {
                Ok(()) => trace!("Chunk '{}' declared", decl.name.as_str()),
                Err(err) => self.log.error(Some(decl.name.location), err.to_string()),
            }
        }
    }

    fn add_examples(&mut self, examples: &[cst::Pattern]) {
        for example in examples {
            if let Ok(pattern) = resolve_pattern(&self.model, self.log, example) {
                self.model.add_example(pattern);
            }
        }
    }

    fn add_init(&mut self, init: &cst::InitSection) {
        for initialization in &init.initializers {
            match initialization {
                cst::Initialization::Module(initializer) => {
                    self.add_module_initializer(initializer)
                }
                cst::Initialization::Similar(similarities) => {
                    self.add_similarities(similarities)
                }
            }
        }
    }

    /// Check where the patterns of a module initializer go, then add them. If the placement is
    /// wrong nothing is added.
    fn add_module_initializer(&mut self, initializer: &cst::ModuleInitializer) {
        let module_name = initializer.module.as_str();
        let Some(module) = self.model.lookup_module(module_name) else {
            self.log.error(
                Some(initializer.module.location),
                format!("could not find module named '{}'", module_name),
            );
            return;
        };
        let kind = module.kind();
        let buffers: Vec<String> = module
            .buffer_names()
            .iter()
            .map(|b| b.to_string())
            .collect();
        if buffers.is_empty() {
            self.log.error(
                Some(initializer.module.location),
                format!("module '{}' does not have any buffers", module_name),
            );
            return;
        }

        let mut placed = vec![];
        let mut failed = false;
        for entry in &initializer.entries {
            match entry {
                cst::InitEntry::Pattern(pattern) => {
                    if let [buffer] = buffers.as_slice() {
                        placed.push((buffer.clone(), pattern));
                    } else {
                        self.log.error(
                            Some(pattern.location),
                            format!(
                                "module '{}' has more than one buffer - specify buffer name in initializer",
                                module_name
                            ),
                        );
                        failed = true;
                    }
                }
                cst::InitEntry::Buffer { buffer, patterns } => {
                    if buffers.iter().any(|b| b == buffer.as_str()) {
                        placed.extend(patterns.iter().map(|p| (buffer.name.clone(), p)));
                    } else {
                        self.log.error(
                            Some(buffer.location),
                            format!(
                                "buffer '{}' not found in module '{}'",
                                buffer.as_str(),
                                module_name
                            ),
                        );
                        failed = true;
                    }
                }
            }
        }
        if failed {
            return;
        }

        for (buffer, pattern) in placed {
            self.add_initializer(kind, buffer, pattern);
        }
    }

    fn add_initializer(&mut self, kind: ModuleKind, buffer: String, named: &cst::NamedPattern) {
        let single_chunk = self
            .model
            .lookup_buffer(&buffer)
            .map(|b| b.is_single_chunk())
            .unwrap_or(false);
        if single_chunk && self.model.initializers().iter().any(|i| i.buffer == buffer) {
            self.log.error(
                Some(named.location),
                format!(
                    "buffer '{}' should only have one pattern in initialization",
                    buffer
                ),
            );
            return;
        }
        if let Some(name) = &named.name {
            if self.model.has_explicit_chunk(name.as_str()) {
                self.log.error(
                    Some(name.location),
                    format!(
                        "duplicate chunk name \"{}\" found in initialization",
                        name.as_str()
                    ),
                );
                return;
            }
        }
        let Ok(pattern) = resolve_pattern(&self.model, self.log, &named.pattern) else {
            return;
        };
        if pattern.chunk.is_internal() {
            self.log.error(
                Some(named.pattern.chunk_name.location),
                format!(
                    "cannot initialize a buffer with internal chunk '{}'",
                    pattern.chunk.type_name
                ),
            );
            return;
        }
        trace!("Initializer of buffer '{}': {}", buffer, pattern);
        self.model.add_initializer(Initializer {
            module: kind,
            buffer,
            chunk_name: named.name.as_ref().map(|name| name.name.clone()),
            pattern,
            line: named.location.line,
        });
    }

    fn add_similarities(&mut self, similarities: &[cst::SimilarityDecl]) {
        for similarity in similarities {
            let value = match similarity.value.parse() {
                Ok(value) => value,
                Err(err) => {
                    self.log.internal_error(
                        Some(similarity.location),
                        format!("invalid similarity value '{}': {}", similarity.value, err),
                    );
                    continue;
                }
            };
            self.model.add_similarity(Similarity {
                chunk_one: similarity.chunk_one.name.clone(),
                chunk_two: similarity.chunk_two.name.clone(),
                value,
                line: similarity.location.line,
            });
        }
    }

    fn add_productions(&mut self, section: &cst::ProductionSection) {
        let mut names = HashSet::new();
        for production in &section.productions {
            if !names.insert(production.name.as_str()) {
                self.log.error(
                    Some(production.name.location),
                    format!("duplicate production name: '{}'", production.name.as_str()),
                );
                continue;
            }
            let compiled = ProductionCompiler::new(&self.model, self.log, production).compile();
            if let Some(compiled) = compiled {
                self.model.add_production(compiled);
            }
        }
    }
}

/// Convert a field of the source into a [`Param`], parsing the numbers.
pub(crate) fn field_to_param(field: &cst::Field) -> Result<Param, ParseFloatError> {
    let value = match &field.value {
        cst::FieldValue::Id(id) => ParamValue::Id(id.clone()),
        cst::FieldValue::Str(s) => ParamValue::Str(s.clone()),
        cst::FieldValue::Number(n) => ParamValue::Number(n.parse()?),
        cst::FieldValue::Fields(fields) => ParamValue::Fields(
            fields
                .iter()
                .map(field_to_param)
                .collect::<Result<_, _>>()?,
        ),
    };
    Ok(Param::new(field.key.as_str(), value))
}

#[cfg(test)]
mod tests {
    use amod_actr::LogLevel;
    use amod_diagnostics::Location;
    use speculoos::prelude::*;

    use super::*;
    use crate::parser::parse_file;

    fn build(source: &str) -> (Model, DiagnosticLog) {
        let file = parse_file(source).unwrap();
        let mut log = DiagnosticLog::new();
        let model = ModelBuilder::new(&mut log).build(&file);
        (model, log)
    }

    fn messages(log: &DiagnosticLog) -> Vec<&str> {
        log.diagnostics().iter().map(|d| d.message()).collect()
    }

    #[test]
    fn test_model_section() {
        let (model, log) = build(
            "==model==\nname: test\ndescription: 'a test'\nauthors { 'Ann <a@b.c>' 'Bob' }",
        );
        assert_that(&log.is_empty()).is_true();
        assert_that(&model.name()).is_equal_to("test");
        assert_that(&model.description()).is_equal_to(Some("a test"));
        assert_that(&model.authors().len()).is_equal_to(2);
    }

    #[test]
    fn test_gactar_config() {
        let (model, log) = build(
            "==model==\nname: test\n==config==\ngactar { log_level: 'detail' trace_activations: true random_seed: 42 }",
        );
        assert_that(&messages(&log)).is_empty();
        assert_that(&model.config().log_level).is_equal_to(LogLevel::Detail);
        assert_that(&model.config().trace_activations).is_true();
        assert_that(&model.config().random_seed).is_equal_to(Some(42));
    }

    #[test]
    fn test_gactar_errors() {
        let (_, log) = build(
            "==model==\nname: test\n==config==\ngactar { log_level: 'loud' foo: 1 }",
        );
        assert_that(&messages(&log)).is_equal_to(vec![
            "'log_level' invalid option (expected one of: min, info, detail)",
            "unrecognized parameter in gactar section: 'foo'",
        ]);
    }

    #[test]
    fn test_module_errors() {
        let (model, log) = build(
            "==model==\nname: test\n==config==\nmodules {\n  memory { decay: 2 latency: 1 }\n  motor {}\n}",
        );
        assert_that(&messages(&log)).is_equal_to(vec![
            "memory 'decay' is out of range (0-1)",
            "unrecognized parameter in memory config: 'latency'",
            "unrecognized module in config: 'motor'",
        ]);
        assert_that(&model.memory().decay).is_none();
    }

    #[test]
    fn test_extra_buffers() {
        let (model, log) = build(
            "==model==\nname: test\n==config==\nmodules {\n  imaginal { delay: 0.2 }\n  extra_buffers { first {} goal {} }\n}",
        );
        assert_that(&messages(&log))
            .is_equal_to(vec!["extra_buffers 'goal' buffer already exists"]);
        assert_that(&model.lookup_buffer("first")).is_some();
        assert_that(&model.imaginal().map(|i| i.delay)).is_equal_to(Some(Some(0.2)));
    }

    #[test]
    fn test_module_after_extra_buffer_with_its_name() {
        let (model, log) = build(
            "==model==\nname: test\n==config==\nmodules {\n  extra_buffers { imaginal {} }\n  imaginal { delay: 0.1 }\n}",
        );
        assert_that(&messages(&log))
            .is_equal_to(vec!["buffer 'imaginal' of module 'imaginal' already exists"]);
        assert_that(&log.diagnostics()[0].location().map(|l| (l.line, l.column_start)))
            .is_equal_to(Some((6, 3)));
        assert_that(&model.imaginal()).is_none();
        assert_that(&model.buffer_names()).is_equal_to(vec![
            "goal".to_string(),
            "retrieval".to_string(),
            "imaginal".to_string(),
        ]);
        assert_that(&model.lookup_buffer("imaginal").map(|b| b.module))
            .is_equal_to(Some(ModuleKind::ExtraBuffers));
    }

    #[test]
    fn test_chunk_errors() {
        let (model, log) = build(
            "==model==\nname: test\n==config==\nchunks {\n  [a: x]\n  [a: y]\n  [_status: s]\n  [_b: s]\n}",
        );
        assert_that(&messages(&log)).is_equal_to(vec![
            "duplicate chunk name: 'a'",
            "cannot use reserved chunk name '_status'",
            "cannot use reserved chunk name '_b' (chunks beginning with '_' are reserved)",
        ]);
        assert_that(&model.user_chunks().count()).is_equal_to(1);
        assert_that(&log.diagnostics()[0].location().map(|l| l.line)).is_equal_to(Some(6));
    }

    #[test]
    fn test_initializers() {
        let (model, log) = build(
            "==model==\nname: test\n==config==\nchunks { [item: value] }\n==init==\nmemory {\n  one [item: a]\n  two [item: b]\n}\ngoal [item: start]\nsimilar { (a b -0.5) }",
        );
        assert_that(&messages(&log)).is_empty();
        assert_that(&model.initializers().len()).is_equal_to(3);
        assert_that(&model.explicit_chunks().to_vec())
            .is_equal_to(vec!["one".to_string(), "two".to_string()]);
        assert_that(&model.initializers()[2].buffer.as_str()).is_equal_to("goal");
        assert_that(&model.similarities()[0].value).is_equal_to(-0.5);
        assert_that(&model.implicit_chunks().to_vec()).is_equal_to(vec![
            "a".to_string(),
            "b".to_string(),
            "start".to_string(),
        ]);
    }

    #[test]
    fn test_initializer_errors() {
        let (model, log) = build(
            "==model==\nname: test\n==config==\nchunks { [item: value] }\nmodules { extra_buffers { a {} b {} } }\n==init==\nmemory { one [item: a] one [item: b] }\ngoal [item: x]\ngoal [item: y]\nprocedural [item: z]\nimaginal [item: w]\nextra_buffers [item: v]\nextra_buffers { c { [item: u] } }",
        );
        assert_that(&messages(&log)).is_equal_to(vec![
            "duplicate chunk name \"one\" found in initialization",
            "buffer 'goal' should only have one pattern in initialization",
            "module 'procedural' does not have any buffers",
            "could not find module named 'imaginal'",
            "module 'extra_buffers' has more than one buffer - specify buffer name in initializer",
            "buffer 'c' not found in module 'extra_buffers'",
        ]);
        assert_that(&model.initializers().len()).is_equal_to(2);
    }

    #[test]
    fn test_initializer_internal_chunk() {
        let (model, log) = build(
            "==model==\nname: test\n==config==\nchunks { [item: value] }\n==init==\ngoal [_status: full]\nmemory { [item: a] }",
        );
        assert_that(&messages(&log))
            .is_equal_to(vec!["cannot initialize a buffer with internal chunk '_status'"]);
        assert_that(&log.diagnostics()[0].location().map(|l| (l.line, l.column_start)))
            .is_equal_to(Some((6, 7)));
        assert_that(&model.initializers().len()).is_equal_to(1);
        assert_that(&model.initializers()[0].buffer.as_str()).is_equal_to("retrieval");
    }

    #[test]
    fn test_duplicate_production() {
        let (model, log) = build(
            "==model==\nname: test\n==config==\nchunks { [item: value] }\n==productions==\np { match { goal [item: a] } do { stop } }\np { match { goal [item: b] } do { stop } }",
        );
        assert_that(&messages(&log)).is_equal_to(vec!["duplicate production name: 'p'"]);
        assert_that(&model.productions().len()).is_equal_to(1);
    }

    #[test]
    fn test_field_to_param() {
        let field = cst::Field {
            key: cst::Ident {
                name: "outer".into(),
                location: Location::point(1, 1),
            },
            value: cst::FieldValue::Fields(vec![]),
            value_location: Location::point(1, 8),
        };
        assert_that(&field_to_param(&field))
            .is_ok_containing(Param::new("outer", ParamValue::Fields(vec![])));
    }
}
