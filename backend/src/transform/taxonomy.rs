//! Shipment status taxonomy.
//!
//! Collapses the fine-grained statuses of the export into the six coarse
//! states the Crystal report understands. Matching is exact and
//! case-sensitive; anything unknown falls back to [`UNMAPPED_STATUS`].

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Label for statuses that belong to no category.
pub const UNMAPPED_STATUS: &str = "Estado no mapeado";

/// Coarse shipment state shown to report consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    AtOriginTerminal,
    AtDestinationTerminal,
    InTransit,
    OutForDelivery,
    Delivered,
    ClosedByIncident,
}

impl Category {
    /// Every category, in report order.
    pub const ALL: [Category; 6] = [
        Category::AtOriginTerminal,
        Category::AtDestinationTerminal,
        Category::InTransit,
        Category::OutForDelivery,
        Category::Delivered,
        Category::ClosedByIncident,
    ];

    /// Label written to `EstadoRemesa`.
    pub fn label(self) -> &'static str {
        match self {
            Category::AtOriginTerminal => "En Terminal Origen",
            Category::AtDestinationTerminal => "En Terminal Destino",
            Category::InTransit => "En Transporte",
            Category::OutForDelivery => "En Reparto",
            Category::Delivered => "Entregada",
            Category::ClosedByIncident => "Cerrado Por Incidencia",
        }
    }

    /// Fine-grained statuses that collapse into this category.
    pub fn statuses(self) -> &'static [&'static str] {
        match self {
            Category::AtOriginTerminal => &[
                "new",
                "estimating",
                "estimating_failed",
                "ready_for_approval",
                "accepted",
            ],
            Category::AtDestinationTerminal => &[
                "performer_lookup",
                "performer_draft",
                "performer_found",
                "performer_not_found",
                "pickup_arrived",
                "ready_for_pickup_confirmation",
            ],
            Category::InTransit => &["pickuped"],
            Category::OutForDelivery => &[
                "delivery_arrived",
                "ready_for_delivery_confirmation",
                "pay_waiting",
                "returned",
                "returned_finish",
            ],
            Category::Delivered => &["delivered", "delivered_finish"],
            Category::ClosedByIncident => &[
                "failed",
                "cancelled",
                "cancelled_with_payment",
                "cancelled_by_taxi",
                "cancelled_with_items_on_hands",
            ],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// status -> category lookup, built once from [`Category::statuses`].
static STATUS_INDEX: Lazy<HashMap<&'static str, Category>> = Lazy::new(|| {
    Category::ALL
        .iter()
        .flat_map(|&category| category.statuses().iter().map(move |&s| (s, category)))
        .collect()
});

/// Category of a fine-grained status, if it has one.
pub fn classify(status: &str) -> Option<Category> {
    STATUS_INDEX.get(status).copied()
}

/// `EstadoRemesa` value for a status, falling back to [`UNMAPPED_STATUS`].
pub fn status_label(status: &str) -> &'static str {
    classify(status).map_or(UNMAPPED_STATUS, Category::label)
}

/// Human-readable dump of the taxonomy.
pub fn taxonomy_description() -> String {
    let mut out = String::from("Status taxonomy (fine-grained status -> EstadoRemesa)\n");
    for category in Category::ALL {
        out.push_str(&format!("\n{}\n", category.label()));
        for status in category.statuses() {
            out.push_str(&format!("  - {}\n", status));
        }
    }
    out.push_str(&format!("\nAnything else -> {}\n", UNMAPPED_STATUS));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_status_maps_to_its_category() {
        for category in Category::ALL {
            for status in category.statuses() {
                assert_eq!(classify(status), Some(category), "status {status}");
                assert_eq!(status_label(status), category.label());
            }
        }
    }

    #[test]
    fn test_statuses_belong_to_one_category() {
        let total: usize = Category::ALL.iter().map(|c| c.statuses().len()).sum();
        assert_eq!(total, 24);
        assert_eq!(STATUS_INDEX.len(), total);
    }

    #[test]
    fn test_unknown_status_falls_back() {
        assert_eq!(classify("teleported"), None);
        assert_eq!(status_label("teleported"), UNMAPPED_STATUS);
        assert_eq!(status_label(""), UNMAPPED_STATUS);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(status_label("Delivered"), UNMAPPED_STATUS);
        assert_eq!(status_label(" delivered"), UNMAPPED_STATUS);
        assert_eq!(status_label("delivered"), "Entregada");
    }

    #[test]
    fn test_spot_checks() {
        assert_eq!(status_label("pickuped"), "En Transporte");
        assert_eq!(status_label("pay_waiting"), "En Reparto");
        assert_eq!(status_label("cancelled_by_taxi"), "Cerrado Por Incidencia");
        assert_eq!(status_label("performer_not_found"), "En Terminal Destino");
        assert_eq!(status_label("estimating_failed"), "En Terminal Origen");
    }

    #[test]
    fn test_description_lists_everything() {
        let desc = taxonomy_description();
        for category in Category::ALL {
            assert!(desc.contains(category.label()));
        }
        assert!(desc.contains("cancelled_with_items_on_hands"));
        assert!(desc.contains(UNMAPPED_STATUS));
    }
}
