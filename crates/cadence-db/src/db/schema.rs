// Diesel mapping of the store's tables.

diesel::table! {
    event (id) {
        id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        category -> Nullable<Text>,
        priority -> Nullable<Int4>,
        status -> Text,
        metadata -> Nullable<Jsonb>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    schedule (id) {
        id -> Uuid,
        event_id -> Uuid,
        description -> Nullable<Text>,
        start_at -> Timestamptz,
        end_at -> Timestamptz,
        recurrence -> Jsonb,
        metadata -> Nullable<Jsonb>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    schedule_exception (id) {
        id -> Uuid,
        schedule_id -> Uuid,
        exception_date -> Date,
        exception_type -> Text,
        modified_date -> Nullable<Date>,
        modified_start -> Nullable<Time>,
        modified_end -> Nullable<Time>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(schedule -> event (event_id));
diesel::joinable!(schedule_exception -> schedule (schedule_id));

diesel::allow_tables_to_appear_in_same_query!(event, schedule, schedule_exception);
