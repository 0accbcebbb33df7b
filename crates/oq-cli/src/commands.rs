//! Command implementations

use oq_client::Resource;
use oq_core::config::parse_override;
use oq_core::{CompilerConfig, EntityColumns, OperatorPolicy, QueryResult};
use oq_queries::{compile_sort, QueryOptions, SearchCriteria, SortSpec};
use tracing::debug;

use crate::cli::CompileArgs;

/// Compile criteria and options; CLI flags take precedence over `config`
pub fn compile(args: &CompileArgs, mut config: CompilerConfig) -> QueryResult<String> {
    if args.lenient {
        config.unknown_operators = OperatorPolicy::Ignore;
    }
    for pair in &args.columns {
        let (field, column) = parse_override(pair)?;
        config.naming.column_overrides.insert(field, column);
    }

    debug!(
        policy = config.unknown_operators.as_str(),
        overrides = config.naming.column_overrides.len(),
        "compiling"
    );

    let naming = EntityColumns::from_config(&config.naming);

    let mut options = match &args.options {
        Some(raw) => QueryOptions::from_json(&serde_json::from_str(raw)?)?,
        None => QueryOptions::new(),
    };

    if let Some(raw) = &args.criteria {
        let criteria = SearchCriteria::from_json(&serde_json::from_str(raw)?, config.unknown_operators)?;
        options = options.with_criteria(&criteria, &naming)?;
    }

    match &args.path {
        Some(path) => Resource::with_naming(path.as_str(), naming).list_path(&options),
        None => options.to_query_string(),
    }
}

/// Compile a JSON sort specification
pub fn sort(spec: &str) -> QueryResult<String> {
    compile_sort(&SortSpec::from_json(&serde_json::from_str(spec)?)?)
}
