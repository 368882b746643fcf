//! SQL Server client implementation.
//!
//! Provides `MssqlConnector`, which opens one TDS session per call using
//! tiberius over a tokio TCP stream.

use crate::config::ConnectionProfile;
use crate::db::{Connector, DatabaseSession, StatementOutput, Value};
use crate::error::{ExecutorError, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use futures::TryStreamExt;
use tiberius::{AuthMethod, Client, ColumnData, Config, FromSql, QueryItem};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

const APPLICATION_NAME: &str = "sqlserver-executor";

// Every session starts a transaction implicitly; closing without COMMIT rolls back.
const BEGIN_SESSION_SQL: &str = "SET IMPLICIT_TRANSACTIONS ON";
const ROW_COUNT_SQL: &str = "SELECT CAST(@@ROWCOUNT AS BIGINT)";
const COMMIT_SQL: &str = "IF @@TRANCOUNT > 0 COMMIT TRANSACTION";

type TdsClient = Client<Compat<TcpStream>>;

/// Connects to SQL Server with SQL authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct MssqlConnector;

#[async_trait]
impl Connector for MssqlConnector {
    async fn connect(&self, profile: &ConnectionProfile) -> Result<Box<dyn DatabaseSession>> {
        let mut config = Config::new();
        config.host(&profile.server);
        config.port(profile.port);
        config.database(&profile.database);
        config.application_name(APPLICATION_NAME);
        config.authentication(AuthMethod::sql_server(&profile.user, &profile.password));
        config.trust_cert();

        debug!("Connecting to {}", profile.display_string());

        let tcp = TcpStream::connect(config.get_addr()).await.map_err(|e| {
            ExecutorError::connection(format!(
                "无法连接到 {}:{} - {}",
                profile.server, profile.port, e
            ))
        })?;
        tcp.set_nodelay(true)
            .map_err(|e| ExecutorError::connection(e.to_string()))?;

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| ExecutorError::connection(driver_message(&e)))?;

        let mut session = MssqlSession {
            client: Some(client),
        };
        session.run_batch(BEGIN_SESSION_SQL).await?;

        debug!("Successfully connected to database");
        Ok(Box::new(session))
    }
}

/// An open TDS session.
pub struct MssqlSession {
    client: Option<TdsClient>,
}

impl MssqlSession {
    fn client(&mut self) -> Result<&mut TdsClient> {
        self.client
            .as_mut()
            .ok_or_else(|| ExecutorError::connection("连接已关闭"))
    }

    /// Runs a batch and discards anything it returns.
    async fn run_batch(&mut self, sql: &str) -> Result<()> {
        let client = self.client()?;
        client
            .simple_query(sql)
            .await
            .map_err(|e| ExecutorError::query(driver_message(&e)))?
            .into_results()
            .await
            .map_err(|e| ExecutorError::query(driver_message(&e)))?;
        Ok(())
    }
}

#[async_trait]
impl DatabaseSession for MssqlSession {
    async fn execute(&mut self, sql: &str) -> Result<StatementOutput> {
        let client = self.client()?;
        let mut stream = client
            .simple_query(sql)
            .await
            .map_err(|e| ExecutorError::query(driver_message(&e)))?;

        let mut output = StatementOutput::default();
        let mut active_result: Option<usize> = None;

        // The stream must be drained completely before the client is reused.
        while let Some(item) = stream
            .try_next()
            .await
            .map_err(|e| ExecutorError::query(driver_message(&e)))?
        {
            match item {
                QueryItem::Metadata(meta) => {
                    if active_result.is_none() && !meta.columns().is_empty() {
                        active_result = Some(meta.result_index());
                        output.columns = meta
                            .columns()
                            .iter()
                            .map(|col| col.name().to_string())
                            .collect();
                    }
                }
                QueryItem::Row(row) => {
                    if active_result == Some(row.result_index()) {
                        output
                            .rows
                            .push(row.cells().map(|(_, data)| convert_value(data)).collect());
                    }
                }
            }
        }

        debug!(
            "Statement returned {} column(s), {} row(s)",
            output.columns.len(),
            output.rows.len()
        );
        Ok(output)
    }

    async fn rows_affected(&mut self) -> Result<u64> {
        let client = self.client()?;
        let row = client
            .simple_query(ROW_COUNT_SQL)
            .await
            .map_err(|e| ExecutorError::query(driver_message(&e)))?
            .into_row()
            .await
            .map_err(|e| ExecutorError::query(driver_message(&e)))?;

        let count = match row {
            Some(row) => row
                .try_get::<i64, _>(0)
                .map_err(|e| ExecutorError::query(driver_message(&e)))?
                .unwrap_or(0),
            None => 0,
        };
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn commit(&mut self) -> Result<()> {
        self.run_batch(COMMIT_SQL).await
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| ExecutorError::connection(driver_message(&e)))?;
            debug!("Connection closed");
        }
        Ok(())
    }
}

/// Extracts the message a user should see from a driver error.
fn driver_message(error: &tiberius::error::Error) -> String {
    match error {
        tiberius::error::Error::Server(token) => token.message().to_string(),
        other => other.to_string(),
    }
}

/// Converts a single cell to our Value type.
fn convert_value(data: &ColumnData<'static>) -> Value {
    match data {
        ColumnData::U8(v) => v.map_or(Value::Null, |v| Value::Int(i64::from(v))),
        ColumnData::I16(v) => v.map_or(Value::Null, |v| Value::Int(i64::from(v))),
        ColumnData::I32(v) => v.map_or(Value::Null, |v| Value::Int(i64::from(v))),
        ColumnData::I64(v) => v.map_or(Value::Null, Value::Int),
        ColumnData::F32(v) => v.map_or(Value::Null, |v| Value::Float(f64::from(v))),
        ColumnData::F64(v) => v.map_or(Value::Null, Value::Float),
        ColumnData::Bit(v) => v.map_or(Value::Null, Value::Bool),
        ColumnData::String(v) => v
            .as_ref()
            .map_or(Value::Null, |s| Value::String(s.to_string())),
        ColumnData::Guid(v) => v.map_or(Value::Null, |g| Value::String(g.to_string())),
        ColumnData::Binary(v) => v
            .as_ref()
            .map_or(Value::Null, |b| Value::Bytes(b.to_vec())),
        ColumnData::Numeric(v) => v.map_or(Value::Null, |n| Value::Decimal(n.to_string())),
        ColumnData::Xml(v) => v.as_ref().map_or(Value::Null, |x| {
            Value::String(x.clone().into_owned().into_string())
        }),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            temporal::<NaiveDateTime>(data)
        }
        ColumnData::Date(_) => temporal::<NaiveDate>(data),
        ColumnData::Time(_) => temporal::<NaiveTime>(data),
        ColumnData::DateTimeOffset(_) => temporal::<DateTime<FixedOffset>>(data),
        #[allow(unreachable_patterns)]
        _ => Value::Null,
    }
}

fn temporal<'a, T>(data: &'a ColumnData<'static>) -> Value
where
    T: FromSql<'a> + ToString,
{
    match T::from_sql(data) {
        Ok(Some(v)) => Value::DateTime(v.to_string()),
        Ok(None) => Value::Null,
        Err(e) => {
            debug!("Unconvertible temporal value: {}", e);
            Value::Null
        }
    }
}
