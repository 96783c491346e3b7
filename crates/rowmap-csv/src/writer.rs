use rowmap::{Store, Writer};
use rowmap_core::{
    setter::PropertyMapping, Error, FieldKey, Result, Setter, SetterFactory, Type, Value,
};
use std::fmt;

/// Separator and quote characters of a CSV dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvFormat {
    pub separator: char,
    pub quote: char,
}

/// One output line being assembled cell by cell.
#[derive(Debug, Clone, Default)]
pub struct CsvLine {
    format: CsvFormat,
    buf: String,
    cells: usize,
}

/// Appends scalar properties to a [`CsvLine`]. Null writes an empty cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCellSetterFactory;

impl Default for CsvFormat {
    fn default() -> Self {
        CsvFormat {
            separator: ',',
            quote: '"',
        }
    }
}

impl CsvLine {
    pub fn new() -> CsvLine {
        CsvLine::default()
    }

    pub fn with_format(format: CsvFormat) -> CsvLine {
        CsvLine {
            format,
            ..CsvLine::default()
        }
    }

    /// Appends a cell, quoting it when it contains the separator, the quote
    /// character or a line break.
    pub fn push_cell(&mut self, cell: &str) {
        if self.cells > 0 {
            self.buf.push(self.format.separator);
        }
        self.cells += 1;

        let CsvFormat { separator, quote } = self.format;
        let needs_quotes = cell
            .chars()
            .any(|c| c == separator || c == quote || c == '\r' || c == '\n');

        if !needs_quotes {
            self.buf.push_str(cell);
            return;
        }

        self.buf.push(quote);
        for c in cell.chars() {
            if c == quote {
                self.buf.push(quote);
            }
            self.buf.push(c);
        }
        self.buf.push(quote);
    }

    /// Number of cells on the line.
    pub fn len(&self) -> usize {
        self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells == 0
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.cells = 0;
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl fmt::Display for CsvLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

impl SetterFactory<CsvLine> for CsvCellSetterFactory {
    fn new_setter(&self, mapping: &PropertyMapping) -> Option<Setter<CsvLine>> {
        let ty = &mapping.property.ty;
        if !ty.is_scalar() || *ty == Type::Bytes {
            return None;
        }

        Some(Setter::new(|line: &mut CsvLine, value: &Value| {
            match value {
                Value::Null => line.push_cell(""),
                Value::String(v) => line.push_cell(v),
                Value::Bool(v) => line.push_cell(&v.to_string()),
                Value::I32(v) => line.push_cell(&v.to_string()),
                Value::I64(v) => line.push_cell(&v.to_string()),
                Value::F64(v) => line.push_cell(&v.to_string()),
                _ => return Err(Error::type_conversion(value, "CSV cell")),
            }
            Ok(())
        }))
    }
}

/// Writes the column names as one line.
pub fn write_header(keys: &[FieldKey], line: &mut CsvLine) {
    for key in keys {
        line.push_cell(key.name());
    }
}

/// Writes a header line followed by one line per value, each ending in a
/// newline.
pub fn write_all<'a, T, I>(
    writer: &Writer<CsvLine>,
    format: CsvFormat,
    values: I,
    out: &mut impl fmt::Write,
) -> Result<()>
where
    T: Store + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut line = CsvLine::with_format(format);
    write_header(&writer.keys(), &mut line);
    writeln!(out, "{line}")?;

    for value in values {
        line.clear();
        writer.write_value(value, &mut line)?;
        writeln!(out, "{line}")?;
    }

    Ok(())
}
