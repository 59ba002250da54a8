//! Nesting-context state for list and table rendering.
//!
//! These structs track position inside lists and tables during event
//! processing. They own the bookkeeping only; the render engine turns their
//! answers into output text.

/// One open list scope.
#[derive(Debug)]
struct ListInfo {
    ordered: bool,
    counter: u32,
}

/// A rendered list-item prefix.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ItemPrefix {
    /// The padded marker text (`"* "`, `"2. "`, ...).
    pub text: String,
    /// True for the first item of the outermost list, which gets a
    /// preceding line break to separate the list from prior content.
    pub opens_list: bool,
}

/// Stack of open list scopes.
#[derive(Debug, Default)]
pub(crate) struct ListStack {
    stack: Vec<ListInfo>,
}

impl ListStack {
    /// Open a list scope.
    pub(crate) fn push(&mut self, ordered: bool) {
        self.stack.push(ListInfo {
            ordered,
            counter: 0,
        });
    }

    /// Close the innermost list scope.
    pub(crate) fn pop(&mut self) {
        self.stack.pop();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Produce the prefix for the next item of the innermost list and advance
    /// its counter. `None` when no list is open (stray `li`).
    ///
    /// Prefixes are left-padded with three spaces per nesting level beyond
    /// the first: depth 1 items start at column 0, depth 2 at column 3, and
    /// so on.
    pub(crate) fn item_prefix(&mut self) -> Option<ItemPrefix> {
        let depth = self.stack.len();
        let list = self.stack.last_mut()?;
        let opens_list = depth == 1 && list.counter == 0;
        let marker = if list.ordered {
            format!("{}. ", list.counter + 1)
        } else {
            "* ".to_owned()
        };
        list.counter += 1;
        let mut text = " ".repeat((depth - 1) * 3);
        text.push_str(&marker);
        Some(ItemPrefix { text, opens_list })
    }
}

/// What to emit in front of a table cell's content.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CellSeparator {
    /// First cell in a row: nothing.
    None,
    /// `" | "`
    Normal,
    /// `" || "` — an extra pipe reserving a cell spanned from an earlier row.
    SpanReserved,
}

/// Position and row-span bookkeeping inside one table.
///
/// Markdown has no native row-span, so a cell declaring `rowspan=N` records
/// its column; for the following `N-1` rows, revisiting that column emits an
/// extra pipe to keep column counts aligned. The reservation is skipped
/// exactly once, on the cell that declared the span.
#[derive(Debug, Default)]
pub(crate) struct TableInfo {
    row_index: u32,
    column_index: u32,
    row_span_column: u32,
    row_span_remaining: i64,
    row_span_just_started: bool,
}

impl TableInfo {
    pub(crate) fn new() -> Self {
        TableInfo::default()
    }

    /// Record a row-span declaration for the column about to open.
    pub(crate) fn start_row_span(&mut self, count: i64) {
        self.row_span_remaining = count;
        self.row_span_just_started = true;
        self.row_span_column = self.column_index;
    }

    /// Advance to the next cell and report the separator to emit before it.
    pub(crate) fn begin_cell(&mut self) -> CellSeparator {
        let separator = if self.column_index == 0 {
            CellSeparator::None
        } else {
            let mut reserved = false;
            if self.row_span_column == self.column_index {
                if self.row_span_just_started {
                    // the cell that declared the span occupies its own slot
                    self.row_span_just_started = false;
                } else if self.row_span_remaining > 0 {
                    let remaining = self.row_span_remaining;
                    self.row_span_remaining -= 1;
                    if remaining > 1 {
                        reserved = true;
                    }
                }
            }
            if reserved {
                CellSeparator::SpanReserved
            } else {
                CellSeparator::Normal
            }
        };
        self.column_index += 1;
        separator
    }

    /// Finish the current row. Returns the column count when the finished row
    /// was the first one, signalling that a header-separator row is due.
    pub(crate) fn end_row(&mut self) -> Option<u32> {
        let header_columns = (self.row_index == 0).then_some(self.column_index);
        self.row_index += 1;
        self.column_index = 0;
        header_columns
    }
}
