use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool, QueryBuilder};
use std::marker::PhantomData;
use std::time::{Duration, Instant};

use super::store::RecordStore;
use super::tables::PgRecord;
use crate::error::StoreError;
use crate::models::{CommitMode, KeyValue};

/// 单条批量语句的行数上限
const CHUNK_SIZE: usize = 1000;
/// 单条语句超时 (秒)
const STATEMENT_TIMEOUT_SECS: u64 = 30;

/// Postgres 记录存储
pub struct PgStore<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R: PgRecord> PgStore<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

fn select_list<R: PgRecord>() -> String {
    format!("id, {}", R::COLUMNS.join(", "))
}

/// 覆盖列: 除候选键外的全部列 (键值一经写入不再改动)
fn overwrite_list<R: PgRecord>() -> String {
    let keys: Vec<&str> = R::candidate_keys().iter().map(|k| k.field).collect();
    R::COLUMNS
        .iter()
        .filter(|c| !keys.contains(c))
        .map(|c| format!("{c} = EXCLUDED.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 构建批量 upsert 语句
///
/// - `with_id`: 已存在的记录, 按 id 冲突整体覆盖
/// - 否则为新记录; 有主候选键时 `ON CONFLICT (主键列) DO UPDATE`, 作为并发导入的兜底
pub(crate) fn build_upsert_sql<R: PgRecord>(with_id: bool) -> (String, String) {
    let columns = R::COLUMNS.join(", ");
    let head = if with_id {
        format!("INSERT INTO {} (id, {}) ", R::TABLE, columns)
    } else {
        format!("INSERT INTO {} ({}) ", R::TABLE, columns)
    };

    let conflict = if with_id {
        Some("id")
    } else {
        R::candidate_keys().first().map(|k| k.field)
    };
    let mut tail = String::new();
    if let Some(target) = conflict {
        tail.push_str(&format!(" ON CONFLICT ({}) DO UPDATE SET {}", target, overwrite_list::<R>()));
    }
    tail.push_str(&format!(" RETURNING {}", select_list::<R>()));
    (head, tail)
}

async fn write_chunk<'c, R, E>(executor: E, chunk: &[R], with_id: bool) -> Result<Vec<R>, StoreError>
where
    R: PgRecord,
    E: PgExecutor<'c>,
{
    tracing::debug!("开始构建批量写入语句 {}, {} 条记录", R::TABLE, chunk.len());
    let start_time = Instant::now();

    let (head, tail) = build_upsert_sql::<R>(with_id);
    let mut query_builder = QueryBuilder::new(head);
    query_builder.push_values(chunk, |mut b, record| {
        if with_id {
            b.push_bind(record.id());
        }
        record.push_columns(&mut b);
    });
    query_builder.push(tail);

    tracing::debug!("SQL构建完成, 耗时: {:?}", start_time.elapsed());
    let execute_start = Instant::now();

    let execute_result = tokio::time::timeout(
        Duration::from_secs(STATEMENT_TIMEOUT_SECS),
        query_builder.build_query_as::<R>().fetch_all(executor),
    )
    .await;

    match execute_result {
        Ok(Ok(rows)) => {
            tracing::info!(
                "✓ {} 写入成功, 影响 {} 行, 耗时: {:?}",
                R::TABLE,
                rows.len(),
                execute_start.elapsed()
            );
            Ok(rows)
        }
        Ok(Err(e)) => {
            tracing::error!("✗ {} 写入失败, 耗时: {:?}, 错误: {:?}", R::TABLE, execute_start.elapsed(), e);
            Err(e.into())
        }
        Err(_) => {
            tracing::error!("✗ {} 写入超时 (>{}秒)!", R::TABLE, STATEMENT_TIMEOUT_SECS);
            Err(StoreError::Timeout(STATEMENT_TIMEOUT_SECS))
        }
    }
}

#[async_trait]
impl<R: PgRecord> RecordStore<R> for PgStore<R> {
    async fn find_by_key(
        &self,
        field: &'static str,
        value: &KeyValue,
    ) -> Result<Option<R>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1 LIMIT 1",
            select_list::<R>(),
            R::TABLE,
            field
        );
        let query = sqlx::query_as::<_, R>(&sql);
        let query = match value {
            KeyValue::Text(s) => query.bind(s.clone()),
            KeyValue::Int(i) => query.bind(*i),
        };
        Ok(query.fetch_optional(&self.pool).await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<R>, StoreError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", select_list::<R>(), R::TABLE);
        Ok(sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn save_all(&self, records: Vec<R>) -> Result<Vec<R>, StoreError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let (existing, fresh): (Vec<R>, Vec<R>) =
            records.into_iter().partition(|r| r.id().is_some());
        let mut saved = Vec::with_capacity(existing.len() + fresh.len());

        match R::VARIANT.commit_mode() {
            CommitMode::Atomic => {
                let mut tx = self.pool.begin().await?;
                for chunk in existing.chunks(CHUNK_SIZE) {
                    saved.extend(write_chunk(&mut *tx, chunk, true).await?);
                }
                for chunk in fresh.chunks(CHUNK_SIZE) {
                    saved.extend(write_chunk(&mut *tx, chunk, false).await?);
                }
                tx.commit().await?;
            }
            CommitMode::BestEffort => {
                for chunk in existing.chunks(CHUNK_SIZE) {
                    saved.extend(write_chunk(&self.pool, chunk, true).await?);
                }
                for chunk in fresh.chunks(CHUNK_SIZE) {
                    saved.extend(write_chunk(&self.pool, chunk, false).await?);
                }
            }
        }

        Ok(saved)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);
        let count: i64 = sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool).await?;
        Ok(count.max(0) as usize)
    }
}
