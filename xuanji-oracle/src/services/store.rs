//! Static storefront catalogue

use serde::Serialize;
use xuanji_common::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u32,
    pub name: &'static str,
    /// Price in fen (1/100 yuan)
    pub price_fen: u32,
    pub description: &'static str,
    pub image_url: &'static str,
}

impl Product {
    /// Display price, e.g. `¥688.00`
    pub fn price_label(&self) -> String {
        format!("¥{}.{:02}", self.price_fen / 100, self.price_fen % 100)
    }
}

const CATALOG: [Product; 6] = [
    Product {
        id: 1,
        name: "和田玉貔貅手链",
        price_fen: 68_800,
        description: "招财进宝，辟邪护身，选用上等和田玉。",
        image_url: "https://picsum.photos/300/300?random=1",
    },
    Product {
        id: 2,
        name: "纯铜八卦镜",
        price_fen: 16_800,
        description: "化煞挡灾，镇宅之宝，传统工艺制作。",
        image_url: "https://picsum.photos/300/300?random=2",
    },
    Product {
        id: 3,
        name: "水晶莲花摆件",
        price_fen: 28_800,
        description: "净化磁场，提升智慧，带来内心宁静。",
        image_url: "https://picsum.photos/300/300?random=3",
    },
    Product {
        id: 4,
        name: "六管铜风铃",
        price_fen: 12_800,
        description: "化解五黄二黑煞气，声音清脆悦耳。",
        image_url: "https://picsum.photos/300/300?random=4",
    },
    Product {
        id: 5,
        name: "真品五帝钱",
        price_fen: 8_800,
        description: "招财化煞，防小人，提升运势。",
        image_url: "https://picsum.photos/300/300?random=5",
    },
    Product {
        id: 6,
        name: "弥勒佛摆件",
        price_fen: 39_800,
        description: "笑口常开，和气生财，家庭和睦。",
        image_url: "https://picsum.photos/300/300?random=6",
    },
];

pub fn catalog() -> &'static [Product] {
    &CATALOG
}

pub fn find_product(id: u32) -> Result<&'static Product> {
    CATALOG
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| Error::NotFound(format!("Product {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique_and_sequential() {
        let ids: Vec<u32> = catalog().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_price_label() {
        assert_eq!(find_product(1).unwrap().price_label(), "¥688.00");
        assert_eq!(find_product(5).unwrap().price_label(), "¥88.00");
        assert!(matches!(find_product(7), Err(Error::NotFound(_))));
    }
}
