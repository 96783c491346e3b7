use rowmap_core::{bail, Error, Result, Value};

/// Receives the decoded cells of a text stream from a scanner.
///
/// The scanner unescapes and unquotes cells before handing them over; a
/// consumer only sees cell contents and row boundaries.
pub trait CellConsumer {
    /// One cell of the current row, found at `buf[offset..offset + len]`.
    fn new_cell(&mut self, buf: &[u8], offset: usize, len: usize) -> Result<()>;

    /// The current row is complete.
    fn end_of_row(&mut self) -> Result<()>;

    /// The stream is complete. Flushes the last row.
    fn end(&mut self) -> Result<()>;
}

/// Receives completed rows. The handler owns every row it is given.
pub trait RowHandler {
    fn handle(&mut self, row: Vec<String>) -> Result<()>;
}

/// Accumulates cells into rows of strings and hands each completed row to
/// a [`RowHandler`].
///
/// Each delivered row is a fresh `Vec` of exactly the row's length. The
/// accumulator is never handed out, so handlers may keep rows freely.
#[derive(Debug)]
pub struct StringArrayConsumer<H> {
    handler: H,

    /// Cells of the row being read
    cells: Vec<String>,

    /// Largest accumulator capacity kept between rows
    retain_limit: usize,

    /// Number of rows handed to the handler so far
    delivered: usize,

    ended: bool,
}

const DEFAULT_RETAIN_LIMIT: usize = 256;

const MIN_CAPACITY: usize = 10;

impl<H: RowHandler> StringArrayConsumer<H> {
    pub fn new(handler: H) -> StringArrayConsumer<H> {
        StringArrayConsumer {
            handler,
            cells: vec![],
            retain_limit: DEFAULT_RETAIN_LIMIT,
            delivered: 0,
            ended: false,
        }
    }

    /// Sets the largest number of cells the accumulator keeps room for
    /// after a row is delivered. Longer rows release their buffer.
    pub fn retain_limit(mut self, cells: usize) -> StringArrayConsumer<H> {
        self.retain_limit = cells;
        self
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Number of rows delivered so far.
    pub fn rows(&self) -> usize {
        self.delivered
    }

    /// Current accumulator capacity, in cells.
    pub fn capacity(&self) -> usize {
        self.cells.capacity()
    }

    fn push(&mut self, cell: String) {
        let capacity = self.cells.capacity();
        if self.cells.len() == capacity {
            let grown = (capacity + 1).max(capacity + capacity / 2).max(MIN_CAPACITY);
            self.cells.reserve_exact(grown - self.cells.len());
        }
        self.cells.push(cell);
    }

    fn dispatch(&mut self) -> Result<()> {
        let row: Vec<String> = self.cells.drain(..).collect();

        if self.cells.capacity() > self.retain_limit {
            log::trace!(
                "releasing cell buffer of capacity {}",
                self.cells.capacity()
            );
            self.cells = vec![];
        }

        self.delivered += 1;
        self.handler.handle(row)
    }

    fn check_open(&self) -> Result<()> {
        if self.ended {
            bail!("cell consumer used after end of stream");
        }
        Ok(())
    }
}

impl<H: RowHandler> CellConsumer for StringArrayConsumer<H> {
    fn new_cell(&mut self, buf: &[u8], offset: usize, len: usize) -> Result<()> {
        self.check_open()?;

        let Some(bytes) = offset
            .checked_add(len)
            .and_then(|end| buf.get(offset..end))
        else {
            bail!(
                "cell span {offset}..{} is out of bounds of a {} byte buffer",
                offset.saturating_add(len),
                buf.len()
            );
        };

        let cell = std::str::from_utf8(bytes)
            .map_err(|_| Error::type_conversion(&Value::Bytes(bytes.to_vec()), "UTF-8 cell"))?;
        self.push(cell.to_string());
        Ok(())
    }

    fn end_of_row(&mut self) -> Result<()> {
        self.check_open()?;
        self.dispatch()
    }

    fn end(&mut self) -> Result<()> {
        self.check_open()?;
        self.ended = true;

        if !self.cells.is_empty() || self.delivered == 0 {
            self.dispatch()?;
        }
        Ok(())
    }
}

impl<F> RowHandler for F
where
    F: FnMut(Vec<String>) -> Result<()>,
{
    fn handle(&mut self, row: Vec<String>) -> Result<()> {
        self(row)
    }
}

impl RowHandler for Vec<Vec<String>> {
    fn handle(&mut self, row: Vec<String>) -> Result<()> {
        self.push(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feed(consumer: &mut impl CellConsumer, cells: &[&str]) {
        for cell in cells {
            consumer.new_cell(cell.as_bytes(), 0, cell.len()).unwrap();
        }
    }

    #[test]
    fn growth_policy() {
        let mut consumer = StringArrayConsumer::new(vec![]);
        assert_eq!(consumer.capacity(), 0);

        feed(&mut consumer, &["a"]);
        assert!(consumer.capacity() >= 10);

        let cells: Vec<String> = (0..11).map(|i| i.to_string()).collect();
        let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
        feed(&mut consumer, &cells);
        assert!(consumer.capacity() >= 15);
    }

    #[test]
    fn delivered_rows_are_exact() {
        let mut consumer = StringArrayConsumer::new(vec![]);
        feed(&mut consumer, &["a", "b", "c"]);
        consumer.end_of_row().unwrap();

        let rows = consumer.into_handler();
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0].capacity(), 3);
    }

    #[test]
    fn large_buffers_released() {
        let mut consumer = StringArrayConsumer::new(vec![]).retain_limit(16);
        let cells: Vec<String> = (0..40).map(|i| i.to_string()).collect();
        let cells: Vec<&str> = cells.iter().map(String::as_str).collect();

        feed(&mut consumer, &cells);
        consumer.end_of_row().unwrap();
        assert_eq!(consumer.capacity(), 0);

        feed(&mut consumer, &cells[..12]);
        consumer.end_of_row().unwrap();
        assert!(consumer.capacity() >= 12);
        assert!(consumer.capacity() <= 16);
    }
}
