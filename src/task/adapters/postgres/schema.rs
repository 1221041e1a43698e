//! Diesel schema for ordered task persistence.

diesel::table! {
    /// Task records in presentation order.
    tarefas (id) {
        /// Store-assigned task identifier.
        id -> Int8,
        /// Task name, unique under `lower()`.
        #[max_length = 255]
        nome -> Varchar,
        /// Cost in cents.
        custo_centavos -> Int8,
        /// Due date.
        data_limite -> Timestamptz,
        /// Presentation position, unique and checked immediately.
        ordem_apresentacao -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last detail-edit timestamp.
        updated_at -> Timestamptz,
    }
}
