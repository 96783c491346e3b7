//! Maps SQLite query results with rowmap.
//!
//! Rows are read into owned [`ValueRow`]s keyed by the statement's column
//! names, so any [`Mapper<ValueRow>`] built with
//! [`ValueRowGetterFactory`](rowmap_core::source::ValueRowGetterFactory)
//! can consume them.

mod value;
pub use value::{to_value, Param};

use rowmap::{schema::ModelId, Mapper, MapperFactory};
use rowmap_core::{Error, FieldKey, Result, ValueRecord, ValueRow};
use rusqlite::{Connection, Params, Row, Statement};
use std::sync::Arc;

/// One key per result column, in statement order.
pub fn column_keys(stmt: &Statement<'_>) -> Vec<FieldKey> {
    FieldKey::sequence(stmt.column_names())
}

/// Copies the current row out of the cursor.
pub fn read_row(keys: &Arc<[FieldKey]>, row: &Row<'_>) -> Result<ValueRow> {
    let values = (0..keys.len())
        .map(|index| {
            let value = row
                .get_ref(index)
                .map_err(Error::driver_operation_failed)?;
            to_value(value).map_err(|e| e.context(rowmap_core::err!("column `{}`", keys[index])))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ValueRow::new(keys.clone(), values))
}

/// Runs `sql` and maps every row with `mapper`.
///
/// The mapper must have been built for the statement's columns, see
/// [`column_keys`].
pub fn query(
    conn: &Connection,
    sql: &str,
    params: impl Params,
    mapper: &Mapper<ValueRow>,
) -> Result<Vec<ValueRecord>> {
    let mut stmt = conn.prepare(sql).map_err(Error::driver_operation_failed)?;
    let keys: Arc<[FieldKey]> = column_keys(&stmt).into();
    run(&mut stmt, &keys, params, mapper)
}

/// Runs `sql`, building a mapper for `model` from the result columns.
pub fn query_model(
    conn: &Connection,
    sql: &str,
    params: impl Params,
    factory: &MapperFactory<ValueRow>,
    model: ModelId,
) -> Result<Vec<ValueRecord>> {
    let mut stmt = conn.prepare(sql).map_err(Error::driver_operation_failed)?;
    let keys: Arc<[FieldKey]> = column_keys(&stmt).into();
    let mapper = factory.mapper(model, &keys)?;
    run(&mut stmt, &keys, params, &mapper)
}

fn run(
    stmt: &mut Statement<'_>,
    keys: &Arc<[FieldKey]>,
    params: impl Params,
    mapper: &Mapper<ValueRow>,
) -> Result<Vec<ValueRecord>> {
    let mut rows = stmt.query(params).map_err(Error::driver_operation_failed)?;
    let mut session = mapper.session();

    while let Some(row) = rows.next().map_err(Error::driver_operation_failed)? {
        let row = read_row(keys, row)?;
        session.push(&row)?;
    }

    log::debug!(
        "mapped {} rows into {} objects",
        session.position(),
        session.len()
    );
    session.finish()
}
