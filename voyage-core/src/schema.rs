use diesel::{table, allow_tables_to_appear_in_same_query};

table! {
    destinations (id) {
        id -> Text,
        name -> Text,
        country -> Nullable<Text>,
        description -> Nullable<Text>,
        short_description -> Nullable<Text>,
        image_url -> Nullable<Text>,
        images -> Array<Text>,
        rating -> Float8,
        review_count -> Int4,
        price -> Nullable<Float8>,
        duration -> Nullable<Text>,
        category -> Nullable<Text>,
        featured -> Bool,
        popular -> Bool,
        location -> Nullable<Jsonb>,
        highlights -> Array<Text>,
        amenities -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    users (id) {
        id -> Text,
        email -> Text,
        password_hash -> Text,
        full_name -> Text,
        avatar -> Nullable<Text>,
        phone -> Nullable<Text>,
        date_of_birth -> Nullable<Date>,
        gender -> Nullable<Text>,
        address -> Nullable<Text>,
        role -> Text,
        preferences -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    bookings (id) {
        id -> Text,
        user_id -> Text,
        destination_id -> Nullable<Text>,
        status -> Text,
        booking_date -> Timestamptz,
        travel_date -> Nullable<Timestamp>,
        number_of_travelers -> Nullable<Int4>,
        total_price -> Nullable<Float8>,
        payment_method -> Nullable<Text>,
        payment_status -> Text,
        contact_info -> Nullable<Jsonb>,
        special_requests -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    reviews (id) {
        id -> Text,
        user_id -> Text,
        destination_id -> Text,
        user_name -> Text,
        user_avatar -> Nullable<Text>,
        rating -> Int4,
        comment -> Text,
        images -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    favorites (id) {
        id -> Text,
        user_id -> Text,
        destination_id -> Text,
        created_at -> Timestamptz,
    }
}

table! {
    notifications (id) {
        id -> Text,
        user_id -> Text,
        title -> Text,
        message -> Text,
        notification_type -> Text,
        read -> Bool,
        related_id -> Nullable<Text>,
        reminder_type -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

allow_tables_to_appear_in_same_query!(
    destinations,
    users,
    bookings,
    reviews,
    favorites,
    notifications,
);
