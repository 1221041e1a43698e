//! Diesel row models for ordered task persistence.

use super::schema::tarefas;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = tarefas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Store-assigned task identifier.
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub id: i64,
    /// Task name.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub nome: String,
    /// Cost in cents.
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub custo_centavos: i64,
    /// Due date.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub data_limite: DateTime<Utc>,
    /// Presentation position.
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub ordem_apresentacao: i64,
    /// Creation timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub created_at: DateTime<Utc>,
    /// Last detail-edit timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records. The identifier comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tarefas)]
pub struct NewTaskRow {
    /// Task name.
    pub nome: String,
    /// Cost in cents.
    pub custo_centavos: i64,
    /// Due date.
    pub data_limite: DateTime<Utc>,
    /// Presentation position.
    pub ordem_apresentacao: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last detail-edit timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset for detail edits. Leaves `ordem_apresentacao` untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tarefas)]
pub struct TaskDetailsChangeset {
    /// Task name.
    pub nome: String,
    /// Cost in cents.
    pub custo_centavos: i64,
    /// Due date.
    pub data_limite: DateTime<Utc>,
    /// Last detail-edit timestamp.
    pub updated_at: DateTime<Utc>,
}
