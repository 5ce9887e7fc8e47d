//! Diesel schema for the task store.

diesel::table! {
    /// Task instances.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Instantiated process.
        process_id -> Uuid,
        /// Unique title.
        #[max_length = 64]
        title -> Varchar,
        /// Creator.
        created_by -> Uuid,
        /// Current workflow state.
        state_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Current field values.
    task_data (task_id, field_id) {
        /// Owning task.
        task_id -> Uuid,
        /// Field.
        field_id -> Uuid,
        /// Normalized value.
        value -> Jsonb,
        /// Latest editor.
        updated_by -> Uuid,
        /// Latest edit timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Superseded field values, append-only.
    task_data_history (id) {
        /// Insertion order.
        id -> Int8,
        /// Owning task.
        task_id -> Uuid,
        /// Field.
        field_id -> Uuid,
        /// Replaced value.
        old_value -> Jsonb,
        /// Editor.
        editor -> Uuid,
        /// Edit timestamp.
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Executed actions, append-only.
    task_action_logs (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Actor.
        user_id -> Uuid,
        /// Executed action.
        action_id -> Uuid,
        /// Source state.
        from_state -> Uuid,
        /// Target state.
        to_state -> Uuid,
        /// Optional comment.
        comment -> Nullable<Text>,
        /// Optional attachment metadata.
        attachment -> Nullable<Jsonb>,
        /// Execution timestamp.
        created_at -> Timestamptz,
        /// Commit order.
        seq -> Int8,
    }
}

diesel::table! {
    /// Permission projection.
    task_permissions (task_id, action_id, user_id) {
        /// Task.
        task_id -> Uuid,
        /// Permitted action.
        action_id -> Uuid,
        /// Permitted user.
        user_id -> Uuid,
        /// Category of the producing rule.
        #[max_length = 40]
        role_type -> Varchar,
        /// Materialization timestamp.
        granted_at -> Timestamptz,
    }
}
