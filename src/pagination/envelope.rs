//! Paginated envelope construction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pagination::locator::ArrayTarget;
use crate::pagination::params::PaginationDirective;

/// Key under which metadata is attached to the response.
pub const PAGINATION_FIELD: &str = "pagination";

/// Key wrapping the slice when the response has no object to merge into.
pub const DATA_FIELD: &str = "data";

/// Metadata describing the page that was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(directive: &PaginationDirective, total_items: u64) -> Self {
        let total_pages = if directive.page_size == 0 {
            0
        } else {
            total_items.div_ceil(directive.page_size)
        };

        Self {
            page: directive.page,
            page_size: directive.page_size,
            total_items,
            total_pages,
        }
    }

    fn to_value(self) -> Value {
        serde_json::json!({
            "page": self.page,
            "pageSize": self.page_size,
            "totalItems": self.total_items,
            "totalPages": self.total_pages,
        })
    }
}

/// Slice the located array and rebuild `root` around the slice.
///
/// Out-of-range pages produce an empty slice with accurate totals.
pub fn paginate(root: &Value, target: &ArrayTarget, directive: &PaginationDirective) -> Value {
    let total = target.data.len();
    let meta = PaginationMeta::new(directive, total as u64);

    let start = usize::try_from(directive.start()).unwrap_or(usize::MAX).min(total);
    let end = start
        .saturating_add(usize::try_from(directive.page_size).unwrap_or(usize::MAX))
        .min(total);
    let sliced = target.data[start..end].to_vec();

    if target.root_is_array() {
        return wrap(Value::Array(sliced), meta);
    }

    match target.rebuild(root, sliced.clone()) {
        Value::Object(mut object) => {
            object.insert(PAGINATION_FIELD.to_string(), meta.to_value());
            Value::Object(object)
        }
        _ => wrap(Value::Array(sliced), meta),
    }
}

fn wrap(data: Value, meta: PaginationMeta) -> Value {
    let mut object = Map::new();
    object.insert(DATA_FIELD.to_string(), data);
    object.insert(PAGINATION_FIELD.to_string(), meta.to_value());
    Value::Object(object)
}
