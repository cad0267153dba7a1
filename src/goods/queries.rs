/// 전체 상품 조회
pub const GET_ALL_ITEMS: &str = "SELECT itemid, itemname, price, description, pictureurl, updatedate FROM goods ORDER BY itemid DESC";

/// 페이지 단위 상품 조회
pub const GET_ITEM_PAGE: &str = r#"
    SELECT itemid, itemname, price, description, pictureurl, updatedate
    FROM goods
    ORDER BY itemid DESC
    LIMIT $1 OFFSET $2
"#;

/// 전체 상품 개수
pub const COUNT_ITEMS: &str = "SELECT COUNT(*) AS cnt FROM goods";

/// 상품 상세 조회
pub const GET_ITEM: &str =
    "SELECT itemid, itemname, price, description, pictureurl, updatedate FROM goods WHERE itemid = $1";

/// 동시 등록 직렬화를 위한 테이블 잠금 (일반 조회는 막지 않음)
pub const LOCK_GOODS: &str = "LOCK TABLE goods IN SHARE ROW EXCLUSIVE MODE";

/// 다음 itemid
pub const NEXT_ITEM_ID: &str = "SELECT COALESCE(MAX(itemid), 0) + 1 AS nextid FROM goods";

/// 상품 등록
pub const INSERT_ITEM: &str = r#"
    INSERT INTO goods (itemid, itemname, price, description, pictureurl, updatedate)
    VALUES ($1, $2, $3, $4, $5, $6)
"#;

/// 상품 수정
pub const UPDATE_ITEM: &str = r#"
    UPDATE goods
    SET itemname = $1, price = $2, description = $3, pictureurl = $4, updatedate = $5
    WHERE itemid = $6
"#;

/// 상품 삭제
pub const DELETE_ITEM: &str = "DELETE FROM goods WHERE itemid = $1";
