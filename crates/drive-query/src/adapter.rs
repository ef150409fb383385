//! Ordered result view consumed by the presentation layer.
//!
//! The adapter only stores records. Turning a record into something a UI can
//! draw is the job of a [`RowRenderer`], so the adapter never depends on a
//! toolkit.

use crate::error::{check_index, Result};
use crate::types::{Record, ResultBatch};

/// Passive ordered container of result records.
///
/// Records appear in the order they were appended; nothing is sorted,
/// deduplicated or filtered here.
#[derive(Debug, Default)]
pub struct PagedResultAdapter {
    records: Vec<Record>,
}

impl PagedResultAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the view.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Appends a batch after the records already present, in batch order.
    pub fn append(&mut self, batch: ResultBatch) {
        self.records.extend(batch);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Record> {
        check_index(index, self.records.len())?;
        Ok(&self.records[index])
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Renders the record at `index`.
    pub fn render<R: RowRenderer>(&self, index: usize, renderer: &R) -> Result<R::Row> {
        let record = self.get(index)?;
        Ok(renderer.render(index, record))
    }

    /// Lazily renders every record in view order.
    pub fn rows<'a, R: RowRenderer>(
        &'a self,
        renderer: &'a R,
    ) -> impl Iterator<Item = R::Row> + 'a {
        self.records
            .iter()
            .enumerate()
            .map(move |(index, record)| renderer.render(index, record))
    }
}

/// Maps `(index, record)` to a presentable row.
pub trait RowRenderer {
    type Row;

    fn render(&self, index: usize, record: &Record) -> Self::Row;
}

impl<F, Row> RowRenderer for F
where
    F: Fn(usize, &Record) -> Row,
{
    type Row = Row;

    fn render(&self, index: usize, record: &Record) -> Row {
        self(index, record)
    }
}

/// Two-line row: title over modification date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub title: String,
    pub description: String,
}

/// Renders the title and modified time of a record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleDateRenderer;

impl RowRenderer for TitleDateRenderer {
    type Row = RenderedRow;

    fn render(&self, _index: usize, record: &Record) -> RenderedRow {
        RenderedRow {
            title: record.title().unwrap_or_default().to_string(),
            description: record
                .modified_time()
                .map(|at| at.to_rfc2822())
                .unwrap_or_default(),
        }
    }
}
