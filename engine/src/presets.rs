//! Ready-made configurations for the dashboard's management screens.

use crate::filter::{Bucket, FilterConfig, Predicate};
use crate::schema::{DraftSchema, FieldDef, FieldKind};
use crate::{EnvelopeKeys, ScreenConfig};

/// Names accepted by [`by_name`].
pub const SCREEN_NAMES: [&str; 3] = ["admins", "users", "products"];

fn choice(options: &[&str]) -> FieldKind {
    FieldKind::Choice {
        options: options.iter().map(|o| o.to_string()).collect(),
    }
}

fn status_buckets(filter: FilterConfig) -> FilterConfig {
    filter
        .with_bucket(Bucket::new(
            "active",
            "Active",
            Predicate::field_equals("status", "active"),
        ))
        .with_bucket(Bucket::new(
            "inactive",
            "Inactive",
            Predicate::field_equals("status", "inactive"),
        ))
}

/// Admin management screen.
pub fn admins() -> ScreenConfig {
    let filter = FilterConfig::new(["name", "email"])
        .with_bucket(Bucket::new(
            "super-admins",
            "Super admins",
            Predicate::field_equals("role", "superadmin"),
        ))
        .with_bucket(Bucket::new(
            "admins",
            "Admins",
            Predicate::field_equals("role", "admin"),
        ));

    let schema = DraftSchema::new(vec![
        FieldDef::required("name", FieldKind::Text),
        FieldDef::required("email", FieldKind::Email),
        FieldDef::required("password", FieldKind::Password),
        FieldDef::required("role", choice(&["admin", "superadmin"])).with_default("admin"),
        FieldDef::required("status", choice(&["active", "inactive"])).with_default("active"),
    ]);

    ScreenConfig::new("admins", status_buckets(filter))
        .with_page_size(10)
        .padded(true)
        .with_schema(schema)
        .with_resource("admins", EnvelopeKeys::new("admins", "admin"))
}

/// User management screen.
pub fn users() -> ScreenConfig {
    let filter = status_buckets(FilterConfig::new(["name", "email", "phone"])).with_bucket(
        Bucket::new(
            "admins-only",
            "Admins only",
            Predicate::field_in("role", ["admin", "superadmin"]),
        ),
    );

    let schema = DraftSchema::new(vec![
        FieldDef::required("name", FieldKind::Text),
        FieldDef::required("email", FieldKind::Email),
        FieldDef::optional("phone", FieldKind::Text),
        FieldDef::required("password", FieldKind::Password),
        FieldDef::required("role", choice(&["user", "admin"])).with_default("user"),
        FieldDef::required("status", choice(&["active", "inactive"])).with_default("active"),
    ]);

    ScreenConfig::new("users", filter)
        .with_page_size(10)
        .padded(true)
        .with_schema(schema)
        .with_resource("users", EnvelopeKeys::new("users", "user"))
}

/// Product management screen.
pub fn products() -> ScreenConfig {
    let filter = FilterConfig::new(["name", "sku", "category"])
        .with_bucket(Bucket::new(
            "in-stock",
            "In stock",
            Predicate::number_gt("stock", 0.0),
        ))
        .with_bucket(Bucket::new(
            "out-of-stock",
            "Out of stock",
            Predicate::number_le("stock", 0.0),
        ));

    let schema = DraftSchema::new(vec![
        FieldDef::required("name", FieldKind::Text),
        FieldDef::required("sku", FieldKind::Text),
        FieldDef::required("category", FieldKind::Text),
        FieldDef::optional("description", FieldKind::Text),
        FieldDef::required("price", FieldKind::Number).with_default(0),
        FieldDef::required("stock", FieldKind::Number).with_default(0),
        FieldDef::required("status", choice(&["active", "inactive"])).with_default("active"),
    ]);

    ScreenConfig::new("products", status_buckets(filter))
        .with_page_size(8)
        .with_schema(schema)
        .with_resource("products", EnvelopeKeys::new("products", "product"))
}

/// Look up a preset by screen name.
pub fn by_name(name: &str) -> Option<ScreenConfig> {
    match name {
        "admins" => Some(admins()),
        "users" => Some(users()),
        "products" => Some(products()),
        _ => None,
    }
}
