use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 그림이 업로드되지 않았을 때 쓰는 기본 파일 이름
pub const DEFAULT_PICTURE: &str = "default.jpg";

// 상품 모델 (goods 테이블의 한 행)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub itemid: i64,
    pub itemname: String,
    pub description: Option<String>,
    pub price: f64,
    pub pictureurl: String,
    pub updatedate: NaiveDate,
}

// 요청으로 받은 상품 필드
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub itemname: String,
    pub description: Option<String>,
    pub price: f64,
    pub pictureurl: String,
}

// 저장할 상품 필드 (itemid 제외, updatedate 포함)
#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub itemname: String,
    pub description: Option<String>,
    pub price: f64,
    pub pictureurl: String,
    pub updatedate: NaiveDate,
}

impl ItemInput {
    pub fn stamped(self, updatedate: NaiveDate) -> ItemRecord {
        ItemRecord {
            itemname: self.itemname,
            description: self.description,
            price: self.price,
            pictureurl: self.pictureurl,
            updatedate,
        }
    }
}

impl ItemRecord {
    pub fn into_item(self, itemid: i64) -> Item {
        Item {
            itemid,
            itemname: self.itemname,
            description: self.description,
            price: self.price,
            pictureurl: self.pictureurl,
            updatedate: self.updatedate,
        }
    }
}

// 목록 응답: count 는 전체 상품 수
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemList {
    pub count: i64,
    pub list: Vec<Item>,
}
