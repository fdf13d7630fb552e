use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::buffer::Buffer;
use crate::chunk::{is_internal_chunk_name, is_reserved_chunk_name, Chunk, ChunkError};
use crate::modules::{
    BufferConflict, ExtraBuffers, Goal, Imaginal, Memory, Module, ModuleKind, Procedural,
};
use crate::params::{Param, ParamError};
use crate::pattern::{Pattern, Value};
use crate::production::Production;
use crate::statement::{SetTarget, Statement};

/// Verbosity of the output of the generated models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Min,
    #[default]
    Info,
    Detail,
}

impl LogLevel {
    const OPTIONS: [&'static str; 3] = ["min", "info", "detail"];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Min => "min",
            LogLevel::Info => "info",
            LogLevel::Detail => "detail",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The settings of the `gactar` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub log_level: LogLevel,
    /// Output detailed info about the activations.
    pub trace_activations: bool,
    /// Seed for the random number generators of the frameworks.
    pub random_seed: Option<u64>,
}

/// An initial content of a buffer, or of the memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initializer {
    pub module: ModuleKind,
    pub buffer: String,
    /// The name given to the chunk instance, if any.
    pub chunk_name: Option<String>,
    pub pattern: Pattern,
    pub line: usize,
}

/// Similarity between two chunks, used by partial matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    pub chunk_one: String,
    pub chunk_two: String,
    pub value: f64,
    pub line: usize,
}

/// The compiled model: every declaration of the amod source, cross-referenced and validated.
///
/// The model is populated through its mutation methods, which enforce the uniqueness of the
/// names, and is read-only once the compilation is done.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    name: String,
    description: Option<String>,
    authors: Vec<String>,
    examples: Vec<Pattern>,
    config: GlobalConfig,
    chunks: Vec<Chunk>,
    goal: Goal,
    memory: Memory,
    procedural: Procedural,
    imaginal: Option<Imaginal>,
    extra_buffers: Option<ExtraBuffers>,
    initializers: Vec<Initializer>,
    similarities: Vec<Similarity>,
    productions: Vec<Production>,
    explicit_chunks: Vec<String>,
    implicit_chunks: Vec<String>,
}

impl Model {
    /// An empty model, knowing only the internal chunks.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            description: None,
            authors: vec![],
            examples: vec![],
            config: GlobalConfig::default(),
            chunks: vec![Chunk::status()],
            goal: Goal::default(),
            memory: Memory::default(),
            procedural: Procedural::default(),
            imaginal: None,
            extra_buffers: None,
            initializers: vec![],
            similarities: vec![],
            productions: vec![],
            explicit_chunks: vec![],
            implicit_chunks: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn add_author<S: Into<String>>(&mut self, author: S) {
        self.authors.push(author.into());
    }

    pub fn examples(&self) -> &[Pattern] {
        &self.examples
    }

    pub fn add_example(&mut self, example: Pattern) {
        self.examples.push(example);
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Apply a parameter of the `gactar` section.
    pub fn set_param(&mut self, param: &Param) -> Result<(), ParamError> {
        match param.key.as_str() {
            "log_level" => {
                self.config.log_level = match param.as_option(&LogLevel::OPTIONS)? {
                    "min" => LogLevel::Min,
                    "detail" => LogLevel::Detail,
                    _ => LogLevel::Info,
                };
            }
            "trace_activations" => self.config.trace_activations = param.as_bool()?,
            "random_seed" => self.config.random_seed = Some(param.as_unsigned()?),
            _ => return Err(ParamError::Unrecognized),
        }
        Ok(())
    }

    /// Register a chunk type, rejecting reserved and duplicate names.
    pub fn add_chunk(&mut self, chunk: Chunk) -> Result<(), ChunkError> {
        if is_reserved_chunk_name(&chunk.type_name) {
            return Err(ChunkError::Reserved(chunk.type_name));
        }
        if is_internal_chunk_name(&chunk.type_name) {
            return Err(ChunkError::Internal(chunk.type_name));
        }
        if self.lookup_chunk(&chunk.type_name).is_some() {
            return Err(ChunkError::Duplicate(chunk.type_name));
        }
        self.chunks.push(chunk);
        Ok(())
    }

    /// All the chunk types, including the internal ones.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// The chunk types declared by the model.
    pub fn user_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter().filter(|c| !c.is_internal())
    }

    pub fn lookup_chunk(&self, name: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.type_name == name)
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn procedural(&self) -> &Procedural {
        &self.procedural
    }

    pub fn imaginal(&self) -> Option<&Imaginal> {
        self.imaginal.as_ref()
    }

    pub fn extra_buffers(&self) -> Option<&ExtraBuffers> {
        self.extra_buffers.as_ref()
    }

    /// Make sure the module exists, creating the optional ones, and return it.
    pub fn declare_module(&mut self, kind: ModuleKind) -> &mut dyn Module {
        match kind {
            ModuleKind::Goal => &mut self.goal,
            ModuleKind::Memory => &mut self.memory,
            ModuleKind::Procedural => &mut self.procedural,
            ModuleKind::Imaginal => self.imaginal.get_or_insert_with(Imaginal::default),
            ModuleKind::ExtraBuffers => self
                .extra_buffers
                .get_or_insert_with(ExtraBuffers::default),
        }
    }

    /// Declare a module of the `modules` section. The buffers of a newly created module must not
    /// be already used by the other modules.
    pub fn add_module(&mut self, kind: ModuleKind) -> Result<(), BufferConflict> {
        if self.module(kind).is_none() {
            let buffers: Vec<String> = match kind {
                ModuleKind::Imaginal => Imaginal::default()
                    .buffer_names()
                    .iter()
                    .map(|b| b.to_string())
                    .collect(),
                _ => vec![],
            };
            if let Some(buffer) = buffers.into_iter().find(|b| self.lookup_buffer(b).is_some()) {
                return Err(BufferConflict {
                    module: kind,
                    buffer,
                });
            }
        }
        self.declare_module(kind);
        Ok(())
    }

    /// Apply a parameter of the `modules` section to the module, declaring it if needed.
    pub fn set_module_param(&mut self, kind: ModuleKind, param: &Param) -> Result<(), ParamError> {
        if kind == ModuleKind::ExtraBuffers {
            param.as_fields()?;
            if self.lookup_buffer(&param.key).is_some() {
                return Err(ParamError::BufferExists);
            }
        }
        self.declare_module(kind).set_param(param)
    }

    pub fn module(&self, kind: ModuleKind) -> Option<&dyn Module> {
        match kind {
            ModuleKind::Goal => Some(&self.goal),
            ModuleKind::Memory => Some(&self.memory),
            ModuleKind::Procedural => Some(&self.procedural),
            ModuleKind::Imaginal => self.imaginal.as_ref().map(|m| m as &dyn Module),
            ModuleKind::ExtraBuffers => self.extra_buffers.as_ref().map(|m| m as &dyn Module),
        }
    }

    /// The modules of the model, in a fixed order.
    pub fn modules(&self) -> Vec<&dyn Module> {
        ModuleKind::ALL
            .iter()
            .filter_map(|kind| self.module(*kind))
            .collect()
    }

    pub fn lookup_module(&self, name: &str) -> Option<&dyn Module> {
        name.parse().ok().and_then(|kind| self.module(kind))
    }

    /// The memory module, looked up either by its name or by the name of its buffer.
    pub fn lookup_memory(&self, name: &str) -> Option<&Memory> {
        if name == self.memory.module_name() || self.memory.has_buffer(name) {
            Some(&self.memory)
        } else {
            None
        }
    }

    pub fn buffers(&self) -> Vec<Buffer> {
        self.modules()
            .into_iter()
            .flat_map(|module| {
                let kind = module.kind();
                module
                    .buffer_names()
                    .into_iter()
                    .map(move |name| Buffer::new(name, kind))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn buffer_names(&self) -> Vec<String> {
        self.buffers().into_iter().map(|b| b.name).collect()
    }

    pub fn lookup_buffer(&self, name: &str) -> Option<Buffer> {
        self.buffers().into_iter().find(|b| b.name == name)
    }

    /// Add an initializer, registering the name of its chunk instance.
    pub fn add_initializer(&mut self, initializer: Initializer) {
        if let Some(name) = &initializer.chunk_name {
            self.explicit_chunks.push(name.clone());
        }
        self.initializers.push(initializer);
    }

    pub fn initializers(&self) -> &[Initializer] {
        &self.initializers
    }

    pub fn has_explicit_chunk(&self, name: &str) -> bool {
        self.explicit_chunks.iter().any(|c| c == name)
    }

    /// The names of the chunk instances declared in the initializers.
    pub fn explicit_chunks(&self) -> &[String] {
        &self.explicit_chunks
    }

    pub fn add_similarity(&mut self, similarity: Similarity) {
        self.similarities.push(similarity);
    }

    pub fn similarities(&self) -> &[Similarity] {
        &self.similarities
    }

    pub fn add_production(&mut self, production: Production) {
        self.productions.push(production);
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn lookup_production(&self, name: &str) -> Option<&Production> {
        self.productions.iter().find(|p| p.name == name)
    }

    pub fn has_print_statement(&self) -> bool {
        self.productions.iter().any(Production::has_print_statement)
    }

    /// Collect the identifiers used as chunk instances without being declared by an initializer.
    /// They are sorted, without duplicates.
    pub fn finalize_implicit_chunks(&mut self) {
        let mut ids = BTreeSet::new();
        let mut add_pattern = |pattern: &Pattern| {
            if !pattern.chunk.is_internal() {
                ids.extend(pattern.ids().map(str::to_string));
            }
        };
        self.initializers.iter().for_each(|i| add_pattern(&i.pattern));
        self.examples.iter().for_each(&mut add_pattern);
        let mut slot_ids = vec![];
        for production in &self.productions {
            production
                .matches
                .iter()
                .for_each(|m| add_pattern(&m.pattern));
            for statement in &production.statements {
                match statement {
                    Statement::Set(set) => match &set.target {
                        SetTarget::Pattern(pattern) => add_pattern(pattern),
                        SetTarget::Slots { slots, .. } => {
                            slot_ids.extend(slots.iter().filter_map(|slot| match &slot.value {
                                Value::Id(id) => Some(id.clone()),
                                _ => None,
                            }))
                        }
                    },
                    Statement::Recall(recall) => add_pattern(&recall.pattern),
                    _ => {}
                }
            }
        }
        ids.extend(slot_ids);
        self.implicit_chunks = ids
            .into_iter()
            .filter(|id| !self.has_explicit_chunk(id))
            .collect();
    }

    pub fn implicit_chunks(&self) -> &[String] {
        &self.implicit_chunks
    }

    pub fn has_implicit_chunks(&self) -> bool {
        !self.implicit_chunks.is_empty()
    }

    /// The chunk type the renderers use to declare the implicit chunks.
    pub fn implicit_chunk_type(&self) -> Chunk {
        Chunk::implicit()
    }
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;
    use crate::params::ParamValue;
    use crate::pattern::{PatternSlot, SlotValue};
    use crate::production::Match;
    use crate::statement::{SetSlot, SetStatement};

    fn chunk(name: &str, slots: &[&str]) -> Chunk {
        Chunk::new(name, slots.iter().map(|s| s.to_string()).collect(), 1)
    }

    fn id_pattern(chunk: &Chunk, ids: &[&str]) -> Pattern {
        let mut pattern = Pattern::new(chunk.clone());
        for id in ids {
            pattern.add_slot(PatternSlot::new(SlotValue::Id(id.to_string())));
        }
        pattern
    }

    #[test]
    fn test_status_chunk_is_registered() {
        let model = Model::new("test");
        assert_that(&model.lookup_chunk("_status")).is_some();
        assert_that(&model.user_chunks().count()).is_equal_to(0);
    }

    #[test]
    fn test_add_chunk() {
        let mut model = Model::new("test");
        assert_that(&model.add_chunk(chunk("count", &["value"]))).is_ok();
        assert_that(&model.add_chunk(chunk("count", &["other"])))
            .is_err_containing(ChunkError::Duplicate("count".into()));
        assert_that(&model.add_chunk(chunk("_secret", &["x"])))
            .is_err_containing(ChunkError::Internal("_secret".into()));
        assert_that(&model.add_chunk(chunk("_status", &["x"])))
            .is_err_containing(ChunkError::Reserved("_status".into()));
        assert_that(&model.user_chunks().count()).is_equal_to(1);
        assert_that(&model.lookup_chunk("count").unwrap().slot_names)
            .is_equal_to(vec!["value".to_string()]);
    }

    #[test]
    fn test_default_buffers() {
        let model = Model::new("test");
        assert_that(&model.buffer_names())
            .is_equal_to(vec!["goal".to_string(), "retrieval".to_string()]);
        assert_that(&model.lookup_buffer("retrieval").map(|b| b.module))
            .is_equal_to(Some(ModuleKind::Memory));
        assert_that(&model.lookup_buffer("imaginal")).is_none();
        assert_that(&model.lookup_module("imaginal").is_none()).is_true();
        assert_that(&model.lookup_module("procedural").is_some()).is_true();
    }

    #[test]
    fn test_lookup_memory() {
        let model = Model::new("test");
        assert_that(&model.lookup_memory("memory")).is_some();
        assert_that(&model.lookup_memory("retrieval")).is_some();
        assert_that(&model.lookup_memory("goal")).is_none();
    }

    #[test]
    fn test_declare_optional_modules() {
        let mut model = Model::new("test");
        model.declare_module(ModuleKind::Imaginal);
        let extra = Param::new("extra", ParamValue::Fields(vec![]));
        assert_that(&model.set_module_param(ModuleKind::ExtraBuffers, &extra)).is_ok();
        let goal = Param::new("goal", ParamValue::Fields(vec![]));
        assert_that(&model.set_module_param(ModuleKind::ExtraBuffers, &goal))
            .is_err_containing(ParamError::BufferExists);
        assert_that(&model.buffer_names()).is_equal_to(vec![
            "goal".to_string(),
            "retrieval".to_string(),
            "imaginal".to_string(),
            "extra".to_string(),
        ]);
        assert_that(&model.lookup_buffer("extra").map(|b| b.module))
            .is_equal_to(Some(ModuleKind::ExtraBuffers));
    }

    #[test]
    fn test_add_module_buffer_conflict() {
        let mut model = Model::new("test");
        let imaginal = Param::new("imaginal", ParamValue::Fields(vec![]));
        assert_that(&model.set_module_param(ModuleKind::ExtraBuffers, &imaginal)).is_ok();
        assert_that(&model.add_module(ModuleKind::Imaginal)).is_err_containing(BufferConflict {
            module: ModuleKind::Imaginal,
            buffer: "imaginal".to_string(),
        });
        assert_that(&model.imaginal()).is_none();
        assert_that(&model.add_module(ModuleKind::Memory)).is_ok();
        assert_that(&model.add_module(ModuleKind::ExtraBuffers)).is_ok();
        assert_that(&model.buffer_names()).is_equal_to(vec![
            "goal".to_string(),
            "retrieval".to_string(),
            "imaginal".to_string(),
        ]);
    }

    #[test]
    fn test_global_params() {
        let mut model = Model::new("test");
        let level = Param::new("log_level", ParamValue::Str("detail".into()));
        assert_that(&model.set_param(&level)).is_ok();
        let trace = Param::new("trace_activations", ParamValue::Id("true".into()));
        assert_that(&model.set_param(&trace)).is_ok();
        let seed = Param::new("random_seed", ParamValue::Number(42.0));
        assert_that(&model.set_param(&seed)).is_ok();
        assert_that(model.config()).is_equal_to(&GlobalConfig {
            log_level: LogLevel::Detail,
            trace_activations: true,
            random_seed: Some(42),
        });

        let level = Param::new("log_level", ParamValue::Id("loud".into()));
        let err = model.set_param(&level).unwrap_err();
        assert_that(&err.is_value_error()).is_true();
        assert_that(&model.config().log_level).is_equal_to(LogLevel::Detail);
        let other = Param::new("verbose", ParamValue::Id("true".into()));
        assert_that(&model.set_param(&other)).is_err_containing(ParamError::Unrecognized);
    }

    #[test]
    fn test_implicit_chunks() {
        let mut model = Model::new("test");
        let pair = chunk("pair", &["left", "right"]);
        model.add_chunk(pair.clone()).unwrap();
        model.add_initializer(Initializer {
            module: ModuleKind::Memory,
            buffer: "retrieval".into(),
            chunk_name: Some("first".into()),
            pattern: id_pattern(&pair, &["zeta", "alpha"]),
            line: 3,
        });
        let mut production = Production::new("p", None, 5);
        production.add_match(Match {
            buffer: "goal".into(),
            memory: None,
            pattern: id_pattern(&pair, &["first", "alpha"]),
        });
        production.add_match(Match {
            buffer: "goal".into(),
            memory: None,
            pattern: id_pattern(&Chunk::status(), &["full"]),
        });
        production.add_statement(Statement::Set(SetStatement {
            buffer: "goal".into(),
            target: SetTarget::Slots {
                chunk: pair,
                slots: vec![SetSlot {
                    name: "left".into(),
                    slot_index: 0,
                    value: Value::Id("beta".into()),
                }],
            },
        }));
        model.add_production(production);
        assert_that(&model.has_implicit_chunks()).is_false();

        model.finalize_implicit_chunks();
        assert_that(&model.implicit_chunks().to_vec()).is_equal_to(vec![
            "alpha".to_string(),
            "beta".to_string(),
            "zeta".to_string(),
        ]);
        assert_that(&model.explicit_chunks().to_vec()).is_equal_to(vec!["first".to_string()]);
        assert_that(&model.implicit_chunk_type().slot_names)
            .is_equal_to(vec!["value".to_string()]);
    }
}
