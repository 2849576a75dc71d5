//! バンドル版デフォルトテンプレート
//!
//! テンプレートストアが空のとき（初回起動・新規デプロイ）に一度だけ
//! シードされるチェックリスト構造。リミックスされた環境でも同じ
//! 構造から始められるようにする。

use crate::types::{TemplateCategory, TemplateData, TemplateItem, DEFAULT_PRODUCT_TYPES};

struct SeedItem {
    text: &'static str,
    product_type: &'static str,
}

struct SeedCategory {
    name: &'static str,
    items: &'static [SeedItem],
}

const SEED_CATEGORIES: &[SeedCategory] = &[
    SeedCategory {
        name: "Material",
        items: &[
            SeedItem {
                text: "Diameter and Thickness of refrigerant pipe should be as recommended by LG.",
                product_type: "Multi V",
            },
            SeedItem {
                text: "Copper pipe should be covered with a cap for preventing inflow of external materials.",
                product_type: "Multi V",
            },
        ],
    },
    SeedCategory {
        name: "Refrigerant Pipe",
        items: &[
            SeedItem {
                text: "Pipe connection and branch installation must be done according to the LG installation standards.",
                product_type: "Multi V",
            },
            SeedItem {
                text: "Pipe welding should be performed while blowing nitrogen through the pipe.",
                product_type: "Multi V",
            },
        ],
    },
    SeedCategory {
        name: "Drain Pipe",
        items: &[
            SeedItem {
                text: "Drain pipe size should be as recommended in the installation manual of LG.",
                product_type: "Multi V",
            },
            SeedItem {
                text: "Air vent should be installed to prevent reverse flow in the common drain pipe.",
                product_type: "Multi V",
            },
        ],
    },
    SeedCategory {
        name: "Communication and Power cable",
        items: &[
            SeedItem {
                text: "Communication cable should be two core shield wire and its size should be more than 1.0mm².",
                product_type: "Multi V",
            },
            SeedItem {
                text: "Communication cable should be enclosed in a conduit pipe and kept appropriate spacing away from power cable as PDB.",
                product_type: "Multi V",
            },
            SeedItem {
                text: "Power of all IDUs should be supplied through one circuit breaker. Don't install individual switch or connect power to the IDU from a separate circuit breaker.",
                product_type: "Multi V",
            },
        ],
    },
    SeedCategory {
        name: "Indoor Unit",
        items: &[
            SeedItem {
                text: "Remote controller should be placed where it would not be influenced by external temperature and the IDU discharge airflow.",
                product_type: "Multi V",
            },
            SeedItem {
                text: "Connection of IDU and the drain pipe should be done by a flexible hose to prevent connection breakage or drain pipe crack due to its vibration.",
                product_type: "Multi V",
            },
            SeedItem {
                text: "Service hole size should be sufficient for checking and servicing the indoor unit",
                product_type: "Multi V",
            },
        ],
    },
    SeedCategory {
        name: "Outdoor Unit",
        items: &[
            SeedItem {
                text: "Use at least 200mm high concrete or/and H-beam support as a base support of the ODU. And ODU should be fixed tightly with anchor bolt.",
                product_type: "Multi V",
            },
            SeedItem {
                text: "Anti-vibration pad should be placed between outdoor unit and foundation.",
                product_type: "Multi V",
            },
        ],
    },
    SeedCategory {
        name: "AHU",
        items: &[
            SeedItem {
                text: "AHU Comm kit Installation (SVC Area, preventing water)",
                product_type: "AHU",
            },
            SeedItem {
                text: "EEV kit capacity should match with the ODU",
                product_type: "AHU",
            },
            SeedItem {
                text: "Additional Refrigerant : Additional refrigerant of DX coil and extended pipe should be charged",
                product_type: "AHU",
            },
        ],
    },
    SeedCategory {
        name: "ISC",
        items: &[
            SeedItem {
                text: "The anti-vibration pad should be 2 layers of 10 mm or more.",
                product_type: "ISC",
            },
            SeedItem {
                text: "2-1. HMI communication line spec should be 0.75㎟ 2-line Shield and the length should be within 500m.",
                product_type: "ISC",
            },
            SeedItem {
                text: "Is there a solution for freeze and burst prevention? (antifreeze/ flow-switch/ circulation pump interlock).",
                product_type: "ISC",
            },
        ],
    },
];

/// デフォルトテンプレートを構築する
///
/// IDは決定的（`cat-N` / `item-N-M`）。同じシードからは常に同じ
/// テンプレートが得られる。
pub fn default_template() -> TemplateData {
    TemplateData {
        categories: SEED_CATEGORIES
            .iter()
            .enumerate()
            .map(|(ci, cat)| TemplateCategory {
                id: format!("cat-{}", ci + 1),
                name: cat.name.to_string(),
                sort_order: ci as i32,
                items: cat
                    .items
                    .iter()
                    .enumerate()
                    .map(|(ii, item)| TemplateItem {
                        id: format!("item-{}-{}", ci + 1, ii + 1),
                        text: item.text.to_string(),
                        product_type: item.product_type.to_string(),
                        reference_images: Vec::new(),
                        sort_order: ii as i32,
                    })
                    .collect(),
            })
            .collect(),
        product_types: DEFAULT_PRODUCT_TYPES.iter().map(|s| s.to_string()).collect(),
        version: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_shape() {
        let template = default_template();
        assert_eq!(template.categories.len(), 8);
        assert_eq!(template.categories[0].name, "Material");
        assert_eq!(template.categories[7].name, "ISC");
        assert_eq!(template.product_types.len(), 6);
        assert_eq!(template.item_count(), 20);
    }

    #[test]
    fn test_default_template_deterministic_ids() {
        let a = default_template();
        let b = default_template();
        assert_eq!(a, b);
        assert_eq!(a.categories[0].items[0].id, "item-1-1");
    }

    #[test]
    fn test_default_template_sort_orders_sequential() {
        let template = default_template();
        for (ci, cat) in template.categories.iter().enumerate() {
            assert_eq!(cat.sort_order, ci as i32);
            for (ii, item) in cat.items.iter().enumerate() {
                assert_eq!(item.sort_order, ii as i32);
            }
        }
    }
}
