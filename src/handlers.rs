// region:    --- Imports
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::goods::{Item, ItemInput, ItemList, Pagination, DEFAULT_PICTURE};
use crate::upload::{read_item_form, ItemForm};
use axum::body::Body;
use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use tracing::info;

// endregion: --- Imports

// region:    --- Request / Response
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub pageno: Option<String>,
    pub count: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItemIdParams {
    pub itemid: Option<String>,
}

/// {"result": ...} 응답
#[derive(Debug, Serialize)]
pub struct ResultResponse<T> {
    pub result: T,
}

/// 상세 조회 응답: 없으면 {"result": false} 만 내보낸다
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
}

fn parse_itemid(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

/// 삭제 요청 본문 읽기 (urlencoded 또는 JSON)
async fn read_item_id(request: Request, state: &AppState) -> ApiResult<ItemIdParams> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json {
        let Json(body) = Json::<serde_json::Value>::from_request(request, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        // JSON 에서는 숫자와 문자열 itemid 를 모두 받는다
        let itemid = match body.get("itemid") {
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        Ok(ItemIdParams { itemid })
    } else {
        let Form(params) = Form::<ItemIdParams>::from_request(request, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(params)
    }
}

/// 폼에서 상품 필드 추출 (itemname, price 필수)
fn item_input(form: &ItemForm, pictureurl: String) -> ApiResult<ItemInput> {
    let itemname = form
        .text("itemname")
        .ok_or_else(|| ApiError::BadRequest("itemname is required".to_string()))?
        .to_string();
    let price = form
        .text("price")
        .and_then(|price| price.trim().parse::<f64>().ok())
        .filter(|price| price.is_finite())
        .ok_or_else(|| ApiError::BadRequest("price must be a number".to_string()))?;

    Ok(ItemInput {
        itemname,
        description: form.text("description").map(str::to_string),
        price,
        pictureurl,
    })
}
// endregion: --- Request / Response

// region:    --- Query Handlers

/// 전체 상품 조회
pub async fn handle_all(State(state): State<AppState>) -> ApiResult<Json<ItemList>> {
    info!("{:<12} --> 전체 상품 조회", "HandlerQuery");
    Ok(Json(state.catalog.list_all().await?))
}

/// 페이지 조회
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<ItemList>> {
    let page = Pagination::from_query(query.pageno.as_deref(), query.count.as_deref());
    info!(
        "{:<12} --> 페이지 조회 pageno: {}, count: {}",
        "HandlerQuery", page.pageno, page.size
    );
    Ok(Json(state.catalog.list_page(page).await?))
}

/// 상품 상세 조회
pub async fn handle_detail(
    State(state): State<AppState>,
    Query(params): Query<ItemIdParams>,
) -> ApiResult<Json<DetailResponse>> {
    info!("{:<12} --> 상품 상세 조회 {:?}", "HandlerQuery", params.itemid);
    let item = match parse_itemid(params.itemid.as_deref()) {
        Some(itemid) => state.catalog.detail(itemid).await?,
        None => None,
    };
    Ok(Json(DetailResponse {
        result: item.is_some(),
        item,
    }))
}

/// 마지막 변경 시각 조회
pub async fn handle_date(State(state): State<AppState>) -> ApiResult<Json<ResultResponse<String>>> {
    let result = state
        .catalog
        .tracker()
        .read()
        .await
        .map_err(ApiError::Tracker)?;
    Ok(Json(ResultResponse { result }))
}

/// 이미지 다운로드
pub async fn handle_image(
    State(state): State<AppState>,
    Path(fileid): Path<String>,
) -> ApiResult<Response> {
    info!("{:<12} --> 이미지 다운로드: {}", "HandlerQuery", fileid);
    let Some((file, len)) = state.images.open_image(&fileid).await? else {
        return Err(ApiError::NotFound(fileid));
    };
    let mime = mime_guess::from_path(&fileid).first_or_octet_stream();

    let headers = [
        (header::CONTENT_TYPE, mime.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", fileid),
        ),
        (header::CONTENT_LENGTH, len.to_string()),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

// endregion: --- Query Handlers

// region:    --- Command Handlers

/// 상품 등록 (이미지가 없으면 default.jpg)
pub async fn handle_insert(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ResultResponse<bool>>> {
    info!("{:<12} --> 상품 등록 요청", "Command");
    let form = read_item_form(multipart, &state.images).await?;
    let outcome = insert_item(&state, &form).await;
    settle_upload(&state, &form, outcome).await
}

async fn insert_item(state: &AppState, form: &ItemForm) -> ApiResult<bool> {
    let pictureurl = form
        .picture
        .clone()
        .unwrap_or_else(|| DEFAULT_PICTURE.to_string());
    let input = item_input(form, pictureurl)?;
    Ok(state.catalog.insert(input).await?)
}

/// 상품 수정 (이미지가 없으면 oldpictureurl 유지)
pub async fn handle_update(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ResultResponse<bool>>> {
    let form = read_item_form(multipart, &state.images).await?;
    info!("{:<12} --> 상품 수정 요청 {:?}", "Command", form.text("itemid"));
    let outcome = update_item(&state, &form).await;
    settle_upload(&state, &form, outcome).await
}

async fn update_item(state: &AppState, form: &ItemForm) -> ApiResult<bool> {
    let pictureurl = form
        .picture
        .clone()
        .or_else(|| {
            form.text("oldpictureurl")
                .filter(|old| !old.trim().is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_PICTURE.to_string());
    let input = item_input(form, pictureurl)?;

    match parse_itemid(form.text("itemid")) {
        Some(itemid) => Ok(state.catalog.update(itemid, input).await?),
        None => Ok(false),
    }
}

/// 반영되지 않은 요청이 저장한 이미지는 지운다
async fn settle_upload(
    state: &AppState,
    form: &ItemForm,
    outcome: ApiResult<bool>,
) -> ApiResult<Json<ResultResponse<bool>>> {
    if !matches!(outcome, Ok(true)) {
        if let Some(picture) = &form.picture {
            info!("{:<12} --> 사용되지 않은 이미지 삭제: {}", "Command", picture);
            state.images.remove(picture).await;
        }
    }
    outcome.map(|result| Json(ResultResponse { result }))
}

/// 상품 삭제
pub async fn handle_delete(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Json<ResultResponse<bool>>> {
    let params = read_item_id(request, &state).await?;
    info!("{:<12} --> 상품 삭제 요청 {:?}", "Command", params.itemid);
    let result = match parse_itemid(params.itemid.as_deref()) {
        Some(itemid) => state.catalog.delete(itemid).await?,
        None => false,
    };
    Ok(Json(ResultResponse { result }))
}

// endregion: --- Command Handlers

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_itemid() {
        assert_eq!(parse_itemid(Some("12")), Some(12));
        assert_eq!(parse_itemid(Some(" 7 ")), Some(7));
        assert_eq!(parse_itemid(Some("abc")), None);
        assert_eq!(parse_itemid(None), None);
    }

    #[test]
    fn test_detail_response_shapes() {
        let missing = DetailResponse {
            result: false,
            item: None,
        };
        assert_eq!(
            serde_json::to_value(&missing).unwrap(),
            serde_json::json!({ "result": false })
        );

        let found = DetailResponse {
            result: true,
            item: Some(Item {
                itemid: 3,
                itemname: "사과".to_string(),
                description: None,
                price: 1200.0,
                pictureurl: DEFAULT_PICTURE.to_string(),
                updatedate: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            }),
        };
        let value = serde_json::to_value(&found).unwrap();
        assert_eq!(value["result"], true);
        assert_eq!(value["item"]["itemid"], 3);
        assert_eq!(value["item"]["updatedate"], "2024-02-29");
        assert_eq!(value["item"]["pictureurl"], "default.jpg");
    }
}
