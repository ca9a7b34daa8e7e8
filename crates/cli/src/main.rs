use crate::error::CliError;
use clap::Parser;
use commands::Commands;
use connectors::{
    file::csv::{loader::CsvTable, settings::CsvSettings},
    memory::MemorySource,
};
use engine_config::settings::ScrollSettings;
use engine_core::{page::ScrollOptions, scroll::ScrollEngine};
use model::{
    core::{data_type::DataType, value::Value},
    pagination::cursor::{Cursor, CursorInput, CursorOptions, SortDirection, TokenEncoding},
};
use planner::{
    query::{
        ast::select::Select, builder::select::SelectBuilder, dialect::SqlDialect, ident,
        renderer::render_sql,
    },
    table_ref,
};
use std::{path::Path, str::FromStr, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(name = "scroll", version = "0.1.0", about = "Keyset pagination over tabular data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Page {
            file,
            entity,
            sort,
            limit,
            cursor,
            previous,
            encoding,
            field_type,
            config,
            sql,
        } => {
            let settings = ScrollSettings::load(config.as_deref())?;
            let entity = match entity {
                Some(entity) => entity,
                None => file_stem(&file)?,
            };
            let engine = load_engine(&file, &entity, settings).await?;

            let select = build_select(&entity, sort.as_deref())?;
            let encoding = match encoding {
                Some(encoding) => parse_arg("encoding", &encoding)?,
                None => engine.settings().encoding,
            };
            let input = match cursor {
                Some(token) => CursorInput::token(token, encoding),
                None => CursorInput::Start(encoding),
            };

            let mut options = ScrollOptions::default().previous(previous);
            options.limit = limit;
            options.field_type = field_type
                .map(|ty| parse_arg::<DataType>("field-type", &ty))
                .transpose()?;

            if let Some(dialect) = sql {
                let dialect: SqlDialect = parse_arg("sql", &dialect)?;
                let prepared = engine.prepare(select, input, &options).await?;
                let (sql, params) = render_sql(&prepared, dialect);
                info!("Prepared {} query for '{}'", dialect, entity);
                output::print_sql(&sql, &params)?;
                return Ok(());
            }

            let page = engine.scroll(select, input, &options).await?;
            info!("Fetched {} record(s) from '{}'", page.len(), entity);
            output::print_page(&page)?;
        }
        Commands::Encode {
            field,
            field_type,
            direction,
            value,
            id,
            id_type,
            previous,
            encoding,
        } => {
            let options = CursorOptions::new(
                &field,
                parse_arg("field-type", &field_type)?,
                parse_arg("direction", &direction)?,
            )
            .id("id", parse_arg("id-type", &id_type)?)
            .previous(previous)
            .encoding(parse_arg("encoding", &encoding)?);

            let value = value.map(Value::String).unwrap_or(Value::Null);
            let cursor = Cursor::new(value, Value::String(id), &options)?;
            println!("{}", cursor.encode());
        }
        Commands::Decode {
            token,
            encoding,
            field,
            field_type,
            direction,
            id_type,
            previous,
        } => {
            let options = CursorOptions::new(
                &field,
                parse_arg("field-type", &field_type)?,
                parse_arg("direction", &direction)?,
            )
            .id("id", parse_arg("id-type", &id_type)?)
            .previous(previous);

            let encoding: TokenEncoding = parse_arg("encoding", &encoding)?;
            let cursor = CursorInput::token(token, encoding).resolve(&options)?;
            output::print_cursor(&cursor)?;
        }
    }

    Ok(())
}

async fn load_engine(
    file: &Path,
    entity: &str,
    settings: ScrollSettings,
) -> Result<ScrollEngine<MemorySource>, CliError> {
    let csv_settings = CsvSettings {
        id_field: settings.id_field.clone(),
        ..CsvSettings::default()
    };
    let table = CsvTable::load(file, entity, &csv_settings)?;

    let source = MemorySource::new();
    table.register(&source).await;
    Ok(ScrollEngine::new(Arc::new(source), settings))
}

fn build_select(entity: &str, sort: Option<&str>) -> Result<Select, CliError> {
    let builder = SelectBuilder::new()
        .select(vec![])
        .from(table_ref!(entity), None);

    let Some(sort) = sort else {
        return Ok(builder.build());
    };
    let (field, direction) = match sort.rsplit_once(':') {
        Some((field, direction)) => (field, parse_arg::<SortDirection>("sort", direction)?),
        None => (sort, SortDirection::Asc),
    };
    if field.trim().is_empty() {
        return Err(CliError::invalid("sort", "missing field name"));
    }

    Ok(builder
        .order_by(ident(field.trim()), Some(direction.into()))
        .build())
}

fn file_stem(file: &Path) -> Result<String, CliError> {
    file.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| CliError::invalid("file", "cannot derive an entity name"))
}

fn parse_arg<T>(arg: &'static str, text: &str) -> Result<T, CliError>
where
    T: FromStr<Err = String>,
{
    text.parse().map_err(|message| CliError::invalid(arg, message))
}
