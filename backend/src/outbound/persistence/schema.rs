//! Diesel table definitions; must match `backend/migrations`.

diesel::table! {
    users (id) {
        id -> Uuid,
        email -> Varchar,
        username -> Varchar,
        full_name -> Varchar,
        password_hash -> Text,
        /// Optional profile attributes as a JSON object.
        profile -> Jsonb,
        is_verified -> Bool,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    travel_intents (id) {
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        destination -> Varchar,
        start_date -> Date,
        end_date -> Nullable<Date>,
        flexible_dates -> Bool,
        description -> Nullable<Text>,
        trip_types -> Array<Text>,
        max_travelers -> Nullable<Int2>,
        budget_range -> Nullable<Varchar>,
        activities -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        is_active -> Bool,
        /// Interested user ids in insertion order, without duplicates.
        interested_users -> Array<Uuid>,
        group_id -> Nullable<Uuid>,
    }
}

diesel::joinable!(travel_intents -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(travel_intents, users);
