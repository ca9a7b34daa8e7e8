use crate::{
    error::ScrollError,
    page::{Page, ScrollIterator, ScrollOptions},
};
use connectors::source::ScrollSource;
use engine_config::settings::ScrollSettings;
use model::{
    core::data_type::DataType,
    pagination::cursor::{Cursor, CursorInput, CursorOptions},
    records::row::RowData,
};
use planner::query::{
    ast::select::Select,
    keyset::KeysetPredicate,
    sort::{SortSpec, append_tiebreak, resolve_sort},
};
use std::{ops::ControlFlow, sync::Arc};
use tracing::debug;

/// Keyset pagination over a [`ScrollSource`].
///
/// Every call is independent: the cursor carries the whole position, so the
/// engine keeps no state between pages. Records inserted or deleted behind
/// a cursor after it was issued may appear on, or vanish from, later pages.
pub struct ScrollEngine<S: ScrollSource> {
    source: Arc<S>,
    settings: ScrollSettings,
}

/// A validated query ready to execute, with the cursor it was built from.
#[derive(Debug, Clone)]
struct Prepared {
    select: Select,
    cursor: Cursor,
    cursor_options: CursorOptions,
}

impl<S: ScrollSource> ScrollEngine<S> {
    pub fn new(source: Arc<S>, settings: ScrollSettings) -> Self {
        ScrollEngine { source, settings }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn settings(&self) -> &ScrollSettings {
        &self.settings
    }

    /// Validates `select` against `cursor` and returns it with the keyset
    /// predicate, tiebreak ordering and limit applied, without executing it.
    pub async fn prepare(
        &self,
        select: Select,
        cursor: CursorInput,
        options: &ScrollOptions,
    ) -> Result<Select, ScrollError> {
        Ok(self.plan(select, cursor, options).await?.select)
    }

    /// Fetches one page.
    pub async fn scroll(
        &self,
        select: Select,
        cursor: CursorInput,
        options: &ScrollOptions,
    ) -> Result<Page, ScrollError> {
        let prepared = self.plan(select, cursor, options).await?;
        let records = self.fetch(&prepared).await?;

        let (next_cursor, previous_cursor) = match (records.first(), records.last()) {
            (Some(first), Some(last)) => (
                Some(Cursor::from_record(last, &prepared.next_options())?),
                Some(Cursor::from_record(first, &prepared.previous_options())?),
            ),
            _ => (None, None),
        };

        debug!("Scrolled {} records", records.len());
        Ok(Page {
            records,
            next_cursor,
            previous_cursor,
            current_cursor: prepared.cursor,
        })
    }

    /// Fetches one page and hands each record to `on_record` with its own
    /// next cursor and the page's previous cursor.
    ///
    /// Returning [`ControlFlow::Break`] stops delivery; the iterator of the
    /// last delivered record is returned, `None` if the page was empty.
    pub async fn scroll_each<F>(
        &self,
        select: Select,
        cursor: CursorInput,
        options: &ScrollOptions,
        mut on_record: F,
    ) -> Result<Option<ScrollIterator>, ScrollError>
    where
        F: FnMut(&RowData, &ScrollIterator) -> ControlFlow<()>,
    {
        let prepared = self.plan(select, cursor, options).await?;
        let records = self.fetch(&prepared).await?;
        let Some(first) = records.first() else {
            return Ok(None);
        };

        let next_options = prepared.next_options();
        let previous_cursor = Cursor::from_record(first, &prepared.previous_options())?;
        let first_cursor = Cursor::empty(&next_options);

        let mut last = None;
        for record in &records {
            let iterator = ScrollIterator {
                next_cursor: Cursor::from_record(record, &next_options)?,
                previous_cursor: previous_cursor.clone(),
                current_cursor: prepared.cursor.clone(),
                first_cursor: first_cursor.clone(),
            };
            let flow = on_record(record, &iterator);
            last = Some(iterator);
            if flow.is_break() {
                debug!("Scroll stopped early by caller");
                break;
            }
        }
        Ok(last)
    }

    async fn plan(
        &self,
        mut select: Select,
        cursor: CursorInput,
        options: &ScrollOptions,
    ) -> Result<Prepared, ScrollError> {
        let id_field = self.settings.id_field.as_str();
        let entity = select.entity().ok_or(ScrollError::MissingEntity)?.to_string();

        let had_sort = !select.order_by.is_empty();
        let sort = resolve_sort(&mut select, id_field)?;
        if !had_sort {
            debug!("No sort order on '{}', defaulting to {} asc", entity, id_field);
        }

        let field = options.field_name.clone().unwrap_or_else(|| sort.field.clone());
        let spec = SortSpec::new(&field, sort.direction);
        debug!("Resolved scroll sort: {}", spec);

        let (field_type, id_type) = self.field_types(&entity, &field, options).await?;
        let cursor_options = CursorOptions::new(&field, field_type, spec.direction)
            .id(id_field, id_type)
            .previous(options.previous)
            .encoding(self.settings.encoding)
            .max_token_len(self.settings.max_token_len);

        let cursor = cursor.resolve(&cursor_options)?;
        spec.check_cursor(&cursor)?;

        append_tiebreak(&mut select, &sort.field, id_field);
        // Cursors are read back from the fetched records.
        select.include_column(&field);
        select.include_column(id_field);
        KeysetPredicate::new(id_field).apply(&mut select, &cursor);
        select.limit = options
            .limit
            .or(select.limit)
            .or(self.settings.default_limit);

        Ok(Prepared {
            select,
            cursor,
            cursor_options,
        })
    }

    async fn field_types(
        &self,
        entity: &str,
        field: &str,
        options: &ScrollOptions,
    ) -> Result<(DataType, DataType), ScrollError> {
        let metadata = self.source.metadata(entity).await?;
        let id_type = metadata
            .comparison_type(&self.settings.id_field)
            .unwrap_or_else(|| metadata.id_type());

        let field_type = match options.field_type {
            Some(field_type) => field_type,
            None => metadata
                .comparison_type(field)
                .ok_or_else(|| ScrollError::UnknownField {
                    field: field.to_string(),
                    entity: entity.to_string(),
                })?,
        };
        Ok((field_type, id_type))
    }

    async fn fetch(&self, prepared: &Prepared) -> Result<Vec<RowData>, ScrollError> {
        let backward = prepared.cursor.is_previous() && prepared.select.limit.is_some();
        let records = if backward {
            debug!("Backward scroll: fetching in reverse order and restoring it");
            self.source.fetch_reversed_limited(&prepared.select).await?
        } else {
            self.source.fetch(&prepared.select).await?
        };
        Ok(records)
    }
}

impl Prepared {
    /// Options for cursors derived from this page, keeping the sort the page
    /// was validated against and the encoding it was requested with.
    fn derived_options(&self, is_previous: bool) -> CursorOptions {
        CursorOptions {
            field_name: self.cursor.field_name().to_string(),
            direction: self.cursor.direction(),
            encoding: self.cursor.encoding(),
            ..self.cursor_options.clone()
        }
        .previous(is_previous)
    }

    fn next_options(&self) -> CursorOptions {
        self.derived_options(false)
    }

    fn previous_options(&self) -> CursorOptions {
        self.derived_options(true)
    }
}
