/// PostgreSQL backend built on the synchronous `postgres` client.
///
/// Parameterless statements go through the simple query protocol, which hands
/// back every column as text. Statements with parameters are prepared first so
/// each `SqlValue` can be converted to the type the server inferred for its
/// placeholder. Placeholders inferred as a domain type are re-prepared with the
/// domain's base type; the server coerces the value into the domain itself.

use crate::core::db::connection::{Backend, ConnectionSettings};
use crate::core::db::query::QueryResult;
use crate::core::db::value::SqlValue;
use crate::core::{Result, ShopError};
use chrono::{NaiveDate, NaiveDateTime};
use postgres::types::{FromSql, Kind, ToSql, Type};
use postgres::{Client, NoTls, Row, SimpleQueryMessage, Statement};
use rust_decimal::Decimal;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// A single PostgreSQL client connection
pub struct PgBackend {
    client: Client,
}

impl PgBackend {
    /// Connects to the server described by `settings`.
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let mut config = postgres::Config::new();
        config
            .host(&settings.host)
            .port(settings.port)
            .dbname(&settings.database)
            .user(&settings.user);
        if !settings.password.is_empty() {
            config.password(&settings.password);
        }
        Self::connect_with(&config)
    }

    /// Connects with a prepared client configuration, e.g. one parsed from a
    /// `postgresql://` URL.
    pub fn connect_with(config: &postgres::Config) -> Result<Self> {
        let client = config.connect(NoTls)?;
        Ok(PgBackend { client })
    }

    /// Prepares `sql`, swapping domain-typed placeholders for their base types.
    fn prepare(&mut self, sql: &str) -> Result<Statement> {
        let stmt = self.client.prepare(sql)?;
        if !stmt.params().iter().any(|ty| matches!(ty.kind(), Kind::Domain(_))) {
            return Ok(stmt);
        }
        let base_types: Vec<Type> = stmt.params().iter().map(|ty| base_type(ty).clone()).collect();
        debug!(?base_types, "re-preparing statement with domain base types");
        Ok(self.client.prepare_typed(sql, &base_types)?)
    }

    fn simple_query(&mut self, sql: &str) -> Result<QueryResult> {
        let mut columns = Vec::new();
        let mut rows = Vec::new();
        for message in self.client.simple_query(sql)? {
            if let SimpleQueryMessage::Row(row) = message {
                if columns.is_empty() {
                    columns = row.columns().iter().map(|c| c.name().to_string()).collect();
                }
                let values = (0..row.len())
                    .map(|i| row.get(i).unwrap_or("NULL").to_string())
                    .collect();
                rows.push(values);
            }
        }
        Ok(QueryResult::new(columns, rows))
    }
}

impl Backend for PgBackend {
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let stmt = self.prepare(sql)?;
        let bound = bind_params(params, stmt.params())?;
        let refs: Vec<&(dyn ToSql + Sync)> = bound.iter().map(|b| &**b).collect();
        Ok(self.client.execute(&stmt, &refs)?)
    }

    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryResult> {
        if params.is_empty() {
            return self.simple_query(sql);
        }

        let stmt = self.prepare(sql)?;
        let bound = bind_params(params, stmt.params())?;
        let refs: Vec<&(dyn ToSql + Sync)> = bound.iter().map(|b| &**b).collect();
        let columns = stmt.columns().iter().map(|c| c.name().to_string()).collect();
        let rows = self
            .client
            .query(&stmt, &refs)?
            .iter()
            .map(format_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(QueryResult::new(columns, rows))
    }

    fn sequence_value(&mut self, name: &str) -> Result<Option<i64>> {
        let row = self
            .client
            .query_opt("SELECT currval($1::text::regclass)", &[&name])?;
        match row {
            Some(row) => Ok(row.try_get::<_, Option<i64>>(0)?),
            None => Ok(None),
        }
    }

    fn close(self: Box<Self>) -> Result<()> {
        debug!("closing postgres connection");
        Ok(self.client.close()?)
    }
}

fn bind_params(params: &[SqlValue], types: &[Type]) -> Result<Vec<Box<dyn ToSql + Sync>>> {
    if params.len() != types.len() {
        return Err(ShopError::Query(format!(
            "statement expects {} parameters, got {}",
            types.len(),
            params.len()
        )));
    }
    params
        .iter()
        .zip(types)
        .map(|(value, ty)| bind_param(value, ty))
        .collect()
}

/// Follows a domain type down to the type it is declared over.
fn base_type(ty: &Type) -> &Type {
    match ty.kind() {
        Kind::Domain(base) => base_type(base),
        _ => ty,
    }
}

/// Converts one value to the Rust type matching the placeholder's SQL type.
fn bind_param(value: &SqlValue, ty: &Type) -> Result<Box<dyn ToSql + Sync>> {
    let mismatch = || ShopError::Query(format!("cannot bind {:?} to a {} parameter", value, ty));

    let bound: Box<dyn ToSql + Sync> = match base_type(ty).name() {
        "int2" => Box::new(integer(value)?.map(i16::try_from).transpose().map_err(|_| mismatch())?),
        "int4" => Box::new(integer(value)?.map(i32::try_from).transpose().map_err(|_| mismatch())?),
        "int8" => Box::new(integer(value)?),
        "float4" => Box::new(real(value)?.map(|f| f as f32)),
        "float8" => Box::new(real(value)?),
        "numeric" => Box::new(match value {
            SqlValue::Null => None,
            SqlValue::Integer(i) => Some(Decimal::from(*i)),
            SqlValue::Real(f) => Some(Decimal::try_from(*f).map_err(|_| mismatch())?),
            SqlValue::Text(s) => Some(Decimal::from_str(s.trim()).map_err(|_| mismatch())?),
        }),
        "bool" => Box::new(match value {
            SqlValue::Null => None,
            SqlValue::Integer(i) => Some(*i != 0),
            SqlValue::Text(s) => Some(s.parse::<bool>().map_err(|_| mismatch())?),
            SqlValue::Real(_) => return Err(mismatch()),
        }),
        "date" => Box::new(match value {
            SqlValue::Null => None,
            SqlValue::Text(s) => {
                Some(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| mismatch())?)
            }
            _ => return Err(mismatch()),
        }),
        "text" | "varchar" | "bpchar" | "name" | "unknown" => Box::new(match value {
            SqlValue::Null => None,
            SqlValue::Integer(i) => Some(i.to_string()),
            SqlValue::Real(f) => Some(f.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
        }),
        _ => {
            return Err(ShopError::Query(format!(
                "unsupported parameter type {}",
                ty
            )))
        }
    };
    Ok(bound)
}

fn integer(value: &SqlValue) -> Result<Option<i64>> {
    match value {
        SqlValue::Null => Ok(None),
        SqlValue::Integer(i) => Ok(Some(*i)),
        SqlValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ShopError::Query(format!("'{}' is not an integer", s))),
        SqlValue::Real(f) => Err(ShopError::Query(format!("{} is not an integer", f))),
    }
}

fn real(value: &SqlValue) -> Result<Option<f64>> {
    match value {
        SqlValue::Null => Ok(None),
        SqlValue::Integer(i) => Ok(Some(*i as f64)),
        SqlValue::Real(f) => Ok(Some(*f)),
        SqlValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ShopError::Query(format!("'{}' is not a number", s))),
    }
}

/// Renders a typed row as text, NULL included.
fn format_row(row: &Row) -> Result<Vec<String>> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, column)| match column.type_().name() {
            "bool" => cell::<bool>(row, i),
            "int2" => cell::<i16>(row, i),
            "int4" => cell::<i32>(row, i),
            "int8" => cell::<i64>(row, i),
            "float4" => cell::<f32>(row, i),
            "float8" => cell::<f64>(row, i),
            "numeric" => cell::<Decimal>(row, i),
            "date" => cell::<NaiveDate>(row, i),
            "timestamp" => cell::<NaiveDateTime>(row, i),
            "text" | "varchar" | "bpchar" | "name" => cell::<String>(row, i),
            other => Ok(format!("<{}>", other)),
        })
        .collect()
}

fn cell<'a, T>(row: &'a Row, idx: usize) -> Result<String>
where
    T: FromSql<'a> + Display,
{
    let value: Option<T> = row.try_get(idx)?;
    Ok(value.map_or_else(|| "NULL".to_string(), |v| v.to_string()))
}
