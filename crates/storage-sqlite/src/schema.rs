diesel::table! {
    auth_tokens (id) {
        id -> Integer,
        api -> Text,
        token -> Text,
        expires_in -> BigInt,
        obtained_at -> BigInt,
    }
}

// The provider product tables (one value/timestamp column pair per product,
// keyed by the business key) are intentionally absent here: their columns
// are addressed dynamically from the catalog through parameterized
// `sql_query` statements in `products::ProductRepository`.
