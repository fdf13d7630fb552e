use pest::error::LineColLocation;
use pest::Parser;
use thiserror::Error;

use amod_diagnostics::Location;

use crate::cst::*;

/// This module exists because of a `pest`'s bug: <https://github.com/pest-parser/pest/issues/326>
#[allow(missing_docs)]
mod grammar {
    /// The amod file parser.
    #[derive(Parser)]
    #[grammar = "grammar/amod.pest"]
    pub struct AmodParser;
}

use grammar::{AmodParser, Rule};

/// Helper type for lightening the types.
type Pair<'a> = pest::iterators::Pair<'a, Rule>;

/// The text of the grammar the parser is generated from.
pub const GRAMMAR: &str = include_str!("grammar/amod.pest");

/// Failure of the parser. A syntax error stops the compilation before any semantic check.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The source does not follow the grammar.
    #[error("{message}")]
    Syntax { message: String, location: Location },
    /// The parser produced a node the tree builder does not know how to handle.
    #[error("unexpected {rule} in {context}")]
    UnexpectedRule {
        rule: String,
        context: &'static str,
        location: Location,
    },
    /// A node the grammar guarantees is missing.
    #[error("corrupted parser while reading {0}")]
    Corrupted(&'static str),
}

impl ParseError {
    pub fn location(&self) -> Option<Location> {
        match self {
            ParseError::Syntax { location, .. } => Some(*location),
            ParseError::UnexpectedRule { location, .. } => Some(*location),
            ParseError::Corrupted(_) => None,
        }
    }

    /// Whether the error is caused by a defect of the parser rather than by the source.
    pub fn is_internal(&self) -> bool {
        !matches!(self, ParseError::Syntax { .. })
    }
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let err = err.renamed_rules(rule_name);
        let location = match err.line_col {
            LineColLocation::Pos((line, column)) => Location::point(line, column),
            LineColLocation::Span((line, start), (end_line, end)) if line == end_line => {
                Location::new(line, start, end)
            }
            LineColLocation::Span((line, start), _) => Location::point(line, start),
        };
        ParseError::Syntax {
            message: err.variant.message().to_string(),
            location,
        }
    }
}

/// Human name of the rules, used in the syntax errors.
fn rule_name(rule: &Rule) -> String {
    let name = match rule {
        Rule::EOI => "end of input",
        Rule::ident => "identifier",
        Rule::var => "variable",
        Rule::wildcard => "'?'",
        Rule::nil => "'nil'",
        Rule::number => "number",
        Rule::string => "string",
        Rule::pattern => "pattern",
        Rule::arg => "value",
        Rule::slot_item => "slot value",
        Rule::named_slot => "named slot",
        Rule::positional_slots => "':'",
        Rule::field => "field",
        Rule::field_value => "field value",
        Rule::field_block => "'{'",
        Rule::chunk_decl => "chunk declaration",
        Rule::model_section => "'==model=='",
        Rule::config_section => "'==config=='",
        Rule::init_section => "'==init=='",
        Rule::production_section => "'==productions=='",
        Rule::production => "production",
        Rule::match_item => "match item",
        Rule::when_clause => "'when'",
        Rule::comparison_op => "'==' or '!='",
        Rule::set_statement => "'set'",
        Rule::set_slot => "'.'",
        Rule::recall_statement => "'recall'",
        Rule::clear_statement => "'clear'",
        Rule::print_statement => "'print'",
        Rule::stop_statement => "'stop'",
        other => return format!("{:?}", other),
    };
    name.to_string()
}

/// Parse a whole amod file.
pub fn parse_file(source: &str) -> Result<AmodFile, ParseError> {
    let mut pairs = AmodParser::parse(Rule::file, source)?;
    let file = pairs.next().ok_or(ParseError::Corrupted("file"))?; // extract the real file

    let mut model = None;
    let mut config = None;
    let mut init = None;
    let mut productions = None;
    for section in file.into_inner() {
        match section.as_rule() {
            Rule::model_section => model = Some(parse_model_section(section)?),
            Rule::config_section => config = Some(parse_config_section(section)?),
            Rule::init_section => init = Some(parse_init_section(section)?),
            Rule::production_section => {
                productions = Some(parse_production_section(section)?)
            }
            Rule::EOI => {}
            _ => return Err(unexpected(&section, "file")),
        }
    }
    Ok(AmodFile {
        model: model.ok_or(ParseError::Corrupted("model section"))?,
        config,
        init,
        productions,
    })
}

/// Parse a single pattern, e.g. `[count: 1 2]`.
pub fn parse_pattern_input(text: &str) -> Result<Pattern, ParseError> {
    let mut pairs = AmodParser::parse(Rule::pattern_input, text)?;
    let input = pairs.next().ok_or(ParseError::Corrupted("pattern input"))?;
    let pattern = first_inner(input, "pattern input")?;
    parse_pattern(pattern)
}

/// The location of a node. Nodes spanning several lines get the position of their start.
fn location(pair: &Pair) -> Location {
    let span = pair.as_span();
    let (line, start) = span.start_pos().line_col();
    let (end_line, end) = span.end_pos().line_col();
    if line == end_line {
        Location::new(line, start, end)
    } else {
        Location::point(line, start)
    }
}

fn unexpected(pair: &Pair, context: &'static str) -> ParseError {
    ParseError::UnexpectedRule {
        rule: format!("{:?}", pair.as_rule()),
        context,
        location: location(pair),
    }
}

/// The first child of a node, that the grammar guarantees to exist.
fn first_inner<'a>(pair: Pair<'a>, context: &'static str) -> Result<Pair<'a>, ParseError> {
    pair.into_inner()
        .next()
        .ok_or(ParseError::Corrupted(context))
}

fn parse_ident(pair: Pair) -> Ident {
    Ident {
        name: pair.as_str().to_string(),
        location: location(&pair),
    }
}

/// A variable, without the leading `?`.
fn parse_var(pair: Pair) -> Ident {
    Ident {
        name: pair.as_str().trim_start_matches('?').to_string(),
        location: location(&pair),
    }
}

/// The content of a string, without the quotes.
fn parse_string(pair: Pair) -> Result<String, ParseError> {
    Ok(first_inner(pair, "string")?.as_str().to_string())
}

fn parse_model_section(pair: Pair) -> Result<ModelSection, ParseError> {
    let mut name = None;
    let mut description = None;
    let mut authors = vec![];
    let mut examples = vec![];
    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::model_name => name = Some(parse_ident(first_inner(item, "model name")?)),
            Rule::model_description => {
                description = Some(parse_string(first_inner(item, "model description")?)?)
            }
            Rule::model_authors => {
                authors = item
                    .into_inner()
                    .map(parse_string)
                    .collect::<Result<_, _>>()?
            }
            Rule::model_examples => {
                examples = item
                    .into_inner()
                    .map(parse_pattern)
                    .collect::<Result<_, _>>()?
            }
            _ => return Err(unexpected(&item, "model section")),
        }
    }
    Ok(ModelSection {
        name: name.ok_or(ParseError::Corrupted("model name"))?,
        description,
        authors,
        examples,
    })
}

fn parse_config_section(pair: Pair) -> Result<ConfigSection, ParseError> {
    let mut config = ConfigSection::default();
    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::gactar_config => config.gactar = parse_fields(item)?,
            Rule::module_configs => {
                config.modules = item
                    .into_inner()
                    .map(parse_module_config)
                    .collect::<Result<_, _>>()?
            }
            Rule::chunk_decls => {
                config.chunks = item
                    .into_inner()
                    .map(parse_chunk_decl)
                    .collect::<Result<_, _>>()?
            }
            _ => return Err(unexpected(&item, "config section")),
        }
    }
    Ok(config)
}

/// All the children of the node, which must be fields.
fn parse_fields(pair: Pair) -> Result<Vec<Field>, ParseError> {
    pair.into_inner().map(parse_field).collect()
}

fn parse_field(pair: Pair) -> Result<Field, ParseError> {
    let mut inner = pair.into_inner();
    let key = parse_ident(inner.next().ok_or(ParseError::Corrupted("field key"))?);
    let value = inner.next().ok_or(ParseError::Corrupted("field value"))?;
    let value_location = location(&value);
    let value = match value.as_rule() {
        Rule::field_value => {
            let value = first_inner(value, "field value")?;
            match value.as_rule() {
                Rule::number => FieldValue::Number(value.as_str().to_string()),
                Rule::string => FieldValue::Str(parse_string(value)?),
                Rule::ident => FieldValue::Id(value.as_str().to_string()),
                _ => return Err(unexpected(&value, "field value")),
            }
        }
        Rule::field_block => FieldValue::Fields(parse_fields(value)?),
        _ => return Err(unexpected(&value, "field")),
    };
    Ok(Field {
        key,
        value,
        value_location,
    })
}

fn parse_module_config(pair: Pair) -> Result<ModuleConfig, ParseError> {
    let location = location(&pair);
    let mut inner = pair.into_inner();
    let name = parse_ident(inner.next().ok_or(ParseError::Corrupted("module name"))?);
    let fields = inner.map(parse_field).collect::<Result<_, _>>()?;
    Ok(ModuleConfig {
        name,
        fields,
        location,
    })
}

fn parse_chunk_decl(pair: Pair) -> Result<ChunkDecl, ParseError> {
    let location = location(&pair);
    let mut inner = pair.into_inner();
    let name = parse_ident(inner.next().ok_or(ParseError::Corrupted("chunk name"))?);
    let slots = inner.map(parse_ident).collect();
    Ok(ChunkDecl {
        name,
        slots,
        location,
    })
}

fn parse_init_section(pair: Pair) -> Result<InitSection, ParseError> {
    let mut initializers = vec![];
    for item in pair.into_inner() {
        let initialization = match item.as_rule() {
            Rule::similarity_initializer => Initialization::Similar(
                item.into_inner()
                    .map(parse_similarity)
                    .collect::<Result<_, _>>()?,
            ),
            Rule::module_initializer => {
                Initialization::Module(parse_module_initializer(item)?)
            }
            _ => return Err(unexpected(&item, "init section")),
        };
        initializers.push(initialization);
    }
    Ok(InitSection { initializers })
}

fn parse_similarity(pair: Pair) -> Result<SimilarityDecl, ParseError> {
    let location = location(&pair);
    let mut inner = pair.into_inner();
    let mut next = || inner.next().ok_or(ParseError::Corrupted("similarity"));
    let chunk_one = parse_ident(next()?);
    let chunk_two = parse_ident(next()?);
    let value = next()?.as_str().to_string();
    Ok(SimilarityDecl {
        chunk_one,
        chunk_two,
        value,
        location,
    })
}

fn parse_module_initializer(pair: Pair) -> Result<ModuleInitializer, ParseError> {
    let location = location(&pair);
    let mut inner = pair.into_inner();
    let module = parse_ident(inner.next().ok_or(ParseError::Corrupted("module initializer"))?);
    let mut entries = vec![];
    for entry in inner {
        let entry = match entry.as_rule() {
            Rule::named_pattern => InitEntry::Pattern(parse_named_pattern(entry)?),
            Rule::buffer_initializer => {
                let mut inner = entry.into_inner();
                let buffer =
                    parse_ident(inner.next().ok_or(ParseError::Corrupted("buffer initializer"))?);
                let patterns = inner.map(parse_named_pattern).collect::<Result<_, _>>()?;
                InitEntry::Buffer { buffer, patterns }
            }
            _ => return Err(unexpected(&entry, "module initializer")),
        };
        entries.push(entry);
    }
    Ok(ModuleInitializer {
        module,
        entries,
        location,
    })
}

fn parse_named_pattern(pair: Pair) -> Result<NamedPattern, ParseError> {
    let location = location(&pair);
    let mut name = None;
    let mut pattern = None;
    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::ident => name = Some(parse_ident(item)),
            Rule::pattern => pattern = Some(parse_pattern(item)?),
            _ => return Err(unexpected(&item, "initializer")),
        }
    }
    Ok(NamedPattern {
        name,
        pattern: pattern.ok_or(ParseError::Corrupted("initializer pattern"))?,
        location,
    })
}

fn parse_production_section(pair: Pair) -> Result<ProductionSection, ParseError> {
    let productions = pair
        .into_inner()
        .map(parse_production)
        .collect::<Result<_, _>>()?;
    Ok(ProductionSection { productions })
}

fn parse_production(pair: Pair) -> Result<Production, ParseError> {
    let location = location(&pair);
    let mut name = None;
    let mut description = None;
    let mut matches = vec![];
    let mut statements = vec![];
    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::ident => name = Some(parse_ident(item)),
            Rule::production_description => {
                description = Some(parse_string(first_inner(item, "description")?)?)
            }
            Rule::match_block => {
                matches = item
                    .into_inner()
                    .map(parse_match_item)
                    .collect::<Result<_, _>>()?
            }
            Rule::do_block => {
                statements = item
                    .into_inner()
                    .map(parse_statement)
                    .collect::<Result<_, _>>()?
            }
            _ => return Err(unexpected(&item, "production")),
        }
    }
    Ok(Production {
        name: name.ok_or(ParseError::Corrupted("production name"))?,
        description,
        matches,
        statements,
        location,
    })
}

fn parse_match_item(pair: Pair) -> Result<MatchItem, ParseError> {
    let location = location(&pair);
    let mut name = None;
    let mut pattern = None;
    let mut when = vec![];
    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::ident => name = Some(parse_ident(item)),
            Rule::pattern => pattern = Some(parse_pattern(item)?),
            Rule::when_clause => {
                when = item
                    .into_inner()
                    .map(parse_comparison)
                    .collect::<Result<_, _>>()?
            }
            _ => return Err(unexpected(&item, "match")),
        }
    }
    Ok(MatchItem {
        name: name.ok_or(ParseError::Corrupted("match name"))?,
        pattern,
        when,
        location,
    })
}

fn parse_comparison(pair: Pair) -> Result<Comparison, ParseError> {
    let mut inner = pair.into_inner();
    let mut next = || inner.next().ok_or(ParseError::Corrupted("comparison"));
    let var = parse_var(next()?);
    let op = match next()?.as_str() {
        "!=" => ComparisonOp::NotEqual,
        _ => ComparisonOp::Equal,
    };
    let rhs = parse_arg(next()?)?;
    Ok(Comparison { var, op, rhs })
}

fn parse_arg(pair: Pair) -> Result<Arg, ParseError> {
    let location = location(&pair);
    let value = first_inner(pair, "value")?;
    let value = match value.as_rule() {
        Rule::nil => ArgValue::Nil,
        Rule::var => ArgValue::Var(parse_var(value).name),
        Rule::number => ArgValue::Number(value.as_str().to_string()),
        Rule::string => ArgValue::Str(parse_string(value)?),
        Rule::ident => ArgValue::Id(value.as_str().to_string()),
        _ => return Err(unexpected(&value, "value")),
    };
    Ok(Arg { value, location })
}

fn parse_statement(pair: Pair) -> Result<Statement, ParseError> {
    let location = location(&pair);
    let statement = match pair.as_rule() {
        Rule::set_statement => {
            let mut buffer = None;
            let mut slot = None;
            let mut value = None;
            for item in pair.into_inner() {
                match item.as_rule() {
                    Rule::ident => buffer = Some(parse_ident(item)),
                    Rule::set_slot => slot = Some(parse_ident(first_inner(item, "set slot")?)),
                    Rule::pattern => value = Some(SetValue::Pattern(parse_pattern(item)?)),
                    Rule::arg => value = Some(SetValue::Arg(parse_arg(item)?)),
                    _ => return Err(unexpected(&item, "set statement")),
                }
            }
            Statement::Set(SetStatement {
                buffer: buffer.ok_or(ParseError::Corrupted("set buffer"))?,
                slot,
                value: value.ok_or(ParseError::Corrupted("set value"))?,
                location,
            })
        }
        Rule::recall_statement => Statement::Recall(RecallStatement {
            pattern: parse_pattern(first_inner(pair, "recall statement")?)?,
            location,
        }),
        Rule::clear_statement => Statement::Clear(ClearStatement {
            buffers: pair.into_inner().map(parse_ident).collect(),
            location,
        }),
        Rule::print_statement => Statement::Print(PrintStatement {
            args: pair
                .into_inner()
                .map(parse_arg)
                .collect::<Result<_, _>>()?,
            location,
        }),
        Rule::stop_statement => Statement::Stop(location),
        _ => return Err(unexpected(&pair, "do block")),
    };
    Ok(statement)
}

fn parse_pattern(pair: Pair) -> Result<Pattern, ParseError> {
    let location = location(&pair);
    let mut inner = pair.into_inner();
    let chunk_name = parse_ident(inner.next().ok_or(ParseError::Corrupted("pattern chunk"))?);
    let slots = inner.next().ok_or(ParseError::Corrupted("pattern slots"))?;
    let slots = match slots.as_rule() {
        Rule::positional_slots => PatternSlots::Positional(
            slots
                .into_inner()
                .map(parse_slot_item)
                .collect::<Result<_, _>>()?,
        ),
        Rule::named_slots => PatternSlots::Named(
            slots
                .into_inner()
                .map(parse_named_slot)
                .collect::<Result<_, _>>()?,
        ),
        _ => return Err(unexpected(&slots, "pattern")),
    };
    Ok(Pattern {
        chunk_name,
        slots,
        location,
    })
}

fn parse_named_slot(pair: Pair) -> Result<NamedSlot, ParseError> {
    let mut inner = pair.into_inner();
    let name = parse_ident(inner.next().ok_or(ParseError::Corrupted("slot name"))?);
    let item = parse_slot_item(inner.next().ok_or(ParseError::Corrupted("slot value"))?)?;
    Ok(NamedSlot { name, item })
}

fn parse_slot_item(pair: Pair) -> Result<SlotItem, ParseError> {
    let location = location(&pair);
    let mut negated = false;
    let mut value = None;
    for item in pair.into_inner() {
        let slot_value = match item.as_rule() {
            Rule::negation => {
                negated = true;
                continue;
            }
            Rule::wildcard => SlotValue::Wildcard,
            Rule::nil => SlotValue::Nil,
            Rule::var => SlotValue::Var(parse_var(item).name),
            Rule::number => SlotValue::Number(item.as_str().to_string()),
            Rule::string => SlotValue::Str(parse_string(item)?),
            Rule::ident => SlotValue::Id(item.as_str().to_string()),
            _ => return Err(unexpected(&item, "slot")),
        };
        value = Some(slot_value);
    }
    Ok(SlotItem {
        negated,
        value: value.ok_or(ParseError::Corrupted("slot value"))?,
        location,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use speculoos::prelude::*;

    use super::*;

    const SOURCE: &str = r#"
==model==
// A comment
name: count
description: 'Counting example'
authors { 'Someone <someone@example.com>' }
examples { [countFrom: 2 5 starting] }

==config==
gactar { log_level: 'detail' trace_activations: true }
modules {
    memory { latency_factor: 0.4 }
    extra_buffers { scratch {} }
}
chunks {
    [count: first second]
    [countFrom: start end status]
}

==init==
memory {
    one [count: 0 1]
    [count: 1 2]
}
similar { ( one two -0.5 ) }

==productions==
start {
    description: 'Start counting'
    match {
        goal [countFrom: ?start ?end starting] when (?start != ?end and ?end != nil)
    }
    do {
        recall [count: ?start ?]
        set goal.status to counting
        print ?start, 'is the start'
        clear scratch, goal
        stop
    }
}
"#;

    #[test]
    fn test_parse_file() {
        let file = parse_file(SOURCE).unwrap();
        assert_eq!(file.model.name.name, "count");
        assert_eq!(file.model.name.location, Location::new(4, 7, 12));
        assert_eq!(file.model.description.as_deref(), Some("Counting example"));
        assert_eq!(file.model.authors, vec!["Someone <someone@example.com>"]);
        assert_eq!(file.model.examples.len(), 1);

        let config = file.config.unwrap();
        assert_eq!(config.gactar.len(), 2);
        assert_eq!(config.gactar[0].value, FieldValue::Str("detail".into()));
        assert_eq!(config.gactar[1].value, FieldValue::Id("true".into()));
        assert_eq!(config.modules.len(), 2);
        assert_eq!(config.modules[0].fields[0].value, FieldValue::Number("0.4".into()));
        assert_eq!(config.modules[1].fields[0].value, FieldValue::Fields(vec![]));
        let names: Vec<_> = config.chunks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["count", "countFrom"]);
        assert_eq!(config.chunks[1].slots.len(), 3);

        let init = file.init.unwrap();
        assert_eq!(init.initializers.len(), 2);
        match &init.initializers[0] {
            Initialization::Module(module) => {
                assert_eq!(module.module.name, "memory");
                assert_eq!(module.entries.len(), 2);
                match &module.entries[0] {
                    InitEntry::Pattern(pattern) => {
                        assert_eq!(pattern.name.as_ref().map(|n| n.as_str()), Some("one"))
                    }
                    other => panic!("unexpected entry {:?}", other),
                }
            }
            other => panic!("unexpected initializer {:?}", other),
        }
        match &init.initializers[1] {
            Initialization::Similar(similar) => assert_eq!(similar[0].value, "-0.5"),
            other => panic!("unexpected initializer {:?}", other),
        }

        let productions = file.productions.unwrap().productions;
        assert_eq!(productions.len(), 1);
        let start = &productions[0];
        assert_eq!(start.name.name, "start");
        assert_eq!(start.description.as_deref(), Some("Start counting"));
        assert_eq!(start.matches[0].when.len(), 2);
        assert_eq!(start.matches[0].when[0].var.name, "start");
        assert_eq!(start.matches[0].when[0].op, ComparisonOp::NotEqual);
        assert_eq!(start.matches[0].when[1].rhs.value, ArgValue::Nil);
        assert_eq!(start.statements.len(), 5);
    }

    #[test]
    fn test_parse_statements() {
        let file = parse_file(SOURCE).unwrap();
        let statements = &file.productions.unwrap().productions[0].statements;
        match &statements[1] {
            Statement::Set(set) => {
                assert_eq!(set.buffer.name, "goal");
                assert_eq!(set.slot.as_ref().map(|s| s.as_str()), Some("status"));
                match &set.value {
                    SetValue::Arg(arg) => assert_eq!(arg.value, ArgValue::Id("counting".into())),
                    other => panic!("unexpected value {:?}", other),
                }
            }
            other => panic!("unexpected statement {:?}", other),
        }
        match &statements[2] {
            Statement::Print(print) => {
                let values: Vec<_> = print.args.iter().map(|a| a.value.clone()).collect();
                assert_eq!(
                    values,
                    vec![
                        ArgValue::Var("start".into()),
                        ArgValue::Str("is the start".into())
                    ]
                );
            }
            other => panic!("unexpected statement {:?}", other),
        }
        match &statements[3] {
            Statement::Clear(clear) => assert_eq!(clear.buffers.len(), 2),
            other => panic!("unexpected statement {:?}", other),
        }
        assert!(matches!(statements[4], Statement::Stop(_)));
    }

    #[test]
    fn test_print_without_arguments() {
        let source =
            "==model== name: m ==productions== p { match { goal [g: ?x] } do { print stop } }";
        let file = parse_file(source).unwrap();
        let statements = &file.productions.unwrap().productions[0].statements;
        assert_eq!(statements.len(), 2);
        match &statements[0] {
            Statement::Print(print) => assert!(print.args.is_empty()),
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_parse_pattern_input() {
        let pattern = parse_pattern_input("[count: !1 ? ?x nil 'str' id]").unwrap();
        assert_eq!(pattern.chunk_name.name, "count");
        let values: Vec<_> = pattern.slots.items().iter().map(|s| s.value.clone()).collect();
        assert_eq!(
            values,
            vec![
                SlotValue::Number("1".into()),
                SlotValue::Wildcard,
                SlotValue::Var("x".into()),
                SlotValue::Nil,
                SlotValue::Str("str".into()),
                SlotValue::Id("id".into()),
            ]
        );
        assert!(pattern.slots.items()[0].negated);
        assert!(!pattern.slots.items()[1].negated);
    }

    #[test]
    fn test_parse_named_pattern() {
        let pattern = parse_pattern_input("[goal state: start next: ?n]").unwrap();
        match pattern.slots {
            PatternSlots::Named(slots) => {
                let names: Vec<_> = slots.iter().map(|s| s.name.as_str()).collect();
                assert_eq!(names, vec!["state", "next"]);
                assert_eq!(slots[1].item.value, SlotValue::Var("n".into()));
            }
            other => panic!("unexpected slots {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_location() {
        let source = "==model==\nname: count\n==config==\nchunks { [count first] }\n";
        let err = parse_file(source).unwrap_err();
        assert_that(&err.is_internal()).is_false();
        assert_that(&err.location().map(|l| l.line)).is_equal_to(Some(4));
    }

    #[test]
    fn test_missing_model_section() {
        let err = parse_file("==config==").unwrap_err();
        assert_that(&err.location().map(|l| l.line)).is_equal_to(Some(1));
        assert_that(&err.to_string()).contains("==model==");
    }

    #[test]
    fn test_grammar_text() {
        assert_that(&GRAMMAR).contains("pattern_input");
    }
}
