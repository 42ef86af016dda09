//! REST 映射
//!
//! `CrudResult` 与 HTTP 状态码/JSON 报文之间的双向转换，不包含传输本身：
//! - 服务端：`status_of` / `to_response` 把结果翻译为状态码与报文；
//! - 客户端代理：`map_response` 把远端响应还原为 `CrudResult`；
//!   `map_update_response` 额外接受不带报文的 304，此时以发送的对象作为结果。
//!
//! | 结果                       | 状态码 | 报文                         |
//! |----------------------------|--------|------------------------------|
//! | Loaded / Updated / Deleted | 200    | 模型对象                     |
//! | Created                    | 201    | 模型对象                     |
//! | NotModified                | 304    | 存储中的模型对象（可为空）   |
//! | BadRequest                 | 400    | 原因文本                     |
//! | NotFound                   | 404    | 空                           |
//! | Validation                 | 422    | `ValidationError` JSON 列表  |
//! | ServerError                | 500    | 原因文本                     |
//!
use crate::error::AppError;
use r01f_domain::{
    error::DomainError,
    persist::{CrudError, CrudErrorKind, CrudResult, PerformedOperation, RequestedOperation},
    validation::ValidationError,
};
use serde::{Serialize, de::DeserializeOwned};

pub mod status {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const NOT_MODIFIED: u16 = 304;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
    pub const UNPROCESSABLE_ENTITY: u16 = 422;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

pub fn status_of<M>(result: &CrudResult<M>) -> u16 {
    match result {
        CrudResult::Ok(ok) => match ok.performed() {
            PerformedOperation::Created => status::CREATED,
            PerformedOperation::NotModified => status::NOT_MODIFIED,
            PerformedOperation::Loaded
            | PerformedOperation::Updated
            | PerformedOperation::Deleted => status::OK,
        },
        CrudResult::Err(err) => match err.kind() {
            CrudErrorKind::BadRequest { .. } => status::BAD_REQUEST,
            CrudErrorKind::NotFound => status::NOT_FOUND,
            CrudErrorKind::Validation { .. } => status::UNPROCESSABLE_ENTITY,
            CrudErrorKind::ServerError { .. } => status::INTERNAL_SERVER_ERROR,
        },
    }
}

/// 服务端：结果 -> (状态码, 报文)
pub fn to_response<M: Serialize>(result: &CrudResult<M>) -> Result<(u16, String), AppError> {
    let body = match result {
        CrudResult::Ok(ok) => serde_json::to_string(ok.model_object()).map_err(DomainError::from)?,
        CrudResult::Err(err) => match err.kind() {
            CrudErrorKind::BadRequest { reason } | CrudErrorKind::ServerError { reason } => {
                reason.clone()
            }
            CrudErrorKind::NotFound => String::new(),
            CrudErrorKind::Validation { errors } => {
                serde_json::to_string(errors).map_err(DomainError::from)?
            }
        },
    };
    Ok((status_of(result), body))
}

/// 客户端代理：(状态码, 报文) -> 结果
pub fn map_response<M: DeserializeOwned>(
    requested: RequestedOperation,
    model_type: &str,
    oid: Option<&str>,
    status: u16,
    body: &str,
) -> CrudResult<M> {
    let oid = oid.map(ToString::to_string);
    let performed = match status {
        status::CREATED => Some(PerformedOperation::Created),
        status::NOT_MODIFIED => Some(PerformedOperation::NotModified),
        status::OK => Some(match requested {
            RequestedOperation::Load => PerformedOperation::Loaded,
            RequestedOperation::Create => PerformedOperation::Created,
            RequestedOperation::Update => PerformedOperation::Updated,
            RequestedOperation::Delete => PerformedOperation::Deleted,
        }),
        _ => None,
    };

    if let Some(performed) = performed {
        return match serde_json::from_str::<M>(body) {
            Ok(model_object) => CrudResult::ok(requested, performed, model_object),
            Err(e) => CrudResult::error(CrudError::server_error(
                requested,
                model_type,
                oid,
                format!("undecodable {model_type} in {status} response: {e}"),
            )),
        };
    }

    let error = match status {
        status::BAD_REQUEST => CrudError::bad_request(requested, model_type, oid, body),
        status::NOT_FOUND => CrudError::not_found(requested, model_type, oid),
        status::UNPROCESSABLE_ENTITY => {
            let errors = serde_json::from_str::<Vec<ValidationError>>(body)
                .unwrap_or_else(|_| vec![ValidationError::new(None, body)]);
            CrudError::validation(requested, model_type, oid, errors)
        }
        other => {
            let reason = if body.is_empty() {
                format!("unexpected status {other}")
            } else {
                format!("status {other}: {body}")
            };
            CrudError::server_error(requested, model_type, oid, reason)
        }
    };
    CrudResult::error(error)
}

/// 客户端代理（更新）：304 且报文为空时，远端未修改，发送的对象即为当前状态
pub fn map_update_response<M: DeserializeOwned>(
    model_type: &str,
    oid: Option<&str>,
    status: u16,
    body: &str,
    sent: M,
) -> CrudResult<M> {
    if status == status::NOT_MODIFIED && body.trim().is_empty() {
        return CrudResult::not_modified(RequestedOperation::Update, sent);
    }
    map_response(RequestedOperation::Update, model_type, oid, status, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
    }

    fn item() -> Item {
        Item { name: "pen".into() }
    }

    #[test]
    fn status_codes_follow_performed_and_error_kind() {
        assert_eq!(status_of(&CrudResult::loaded(item())), 200);
        assert_eq!(status_of(&CrudResult::deleted(item())), 200);
        assert_eq!(
            status_of(&CrudResult::created(RequestedOperation::Update, item())),
            201
        );
        assert_eq!(
            status_of(&CrudResult::not_modified(RequestedOperation::Update, item())),
            304
        );

        let err = |kind| {
            CrudResult::<Item>::error(CrudError::new(RequestedOperation::Load, "item", None, kind))
        };
        assert_eq!(status_of(&err(CrudErrorKind::NotFound)), 404);
        assert_eq!(
            status_of(&err(CrudErrorKind::BadRequest { reason: "x".into() })),
            400
        );
        assert_eq!(
            status_of(&err(CrudErrorKind::Validation { errors: vec![] })),
            422
        );
        assert_eq!(
            status_of(&err(CrudErrorKind::ServerError { reason: "x".into() })),
            500
        );
    }

    #[test]
    fn success_status_derives_performed_from_request() {
        let body = r#"{"name":"pen"}"#;
        let r: CrudResult<Item> =
            map_response(RequestedOperation::Update, "item", Some("i-1"), 200, body);
        assert_eq!(r.performed(), Some(PerformedOperation::Updated));

        let r: CrudResult<Item> =
            map_response(RequestedOperation::Update, "item", Some("i-1"), 201, body);
        assert_eq!(r.performed(), Some(PerformedOperation::Created));
        assert_eq!(r.requested(), RequestedOperation::Update);

        let r: CrudResult<Item> =
            map_response(RequestedOperation::Update, "item", Some("i-1"), 304, body);
        assert_eq!(r.performed(), Some(PerformedOperation::NotModified));
        assert_eq!(r.model_object(), Some(&item()));
    }

    #[test]
    fn undecodable_success_body_is_server_error() {
        let r: CrudResult<Item> =
            map_response(RequestedOperation::Load, "item", Some("i-1"), 200, "<html>");
        assert!(r.error_ref().unwrap().is_server_error());
    }

    #[test]
    fn empty_not_modified_update_keeps_sent_object() {
        let r = map_update_response("item", Some("i-1"), 304, "", item());
        assert_eq!(r.performed(), Some(PerformedOperation::NotModified));
        assert_eq!(r.requested(), RequestedOperation::Update);
        assert_eq!(r.model_object(), Some(&item()));

        // 带报文时以远端对象为准
        let r = map_update_response(
            "item",
            Some("i-1"),
            304,
            r#"{"name":"pencil"}"#,
            item(),
        );
        assert_eq!(r.model_object().map(|i| i.name.as_str()), Some("pencil"));

        let r = map_update_response("item", Some("i-1"), 404, "", item());
        assert!(r.error_ref().unwrap().is_not_found());

        // 其余操作的空 304 仍无法还原对象
        let r: CrudResult<Item> =
            map_response(RequestedOperation::Load, "item", Some("i-1"), 304, "");
        assert!(r.error_ref().unwrap().is_server_error());
    }

    #[test]
    fn error_statuses_map_to_kinds() {
        let r: CrudResult<Item> =
            map_response(RequestedOperation::Create, "item", None, 400, "duplicate");
        assert_eq!(
            r.error_ref().unwrap().kind(),
            &CrudErrorKind::BadRequest {
                reason: "duplicate".into()
            }
        );

        let r: CrudResult<Item> =
            map_response(RequestedOperation::Load, "item", Some("i-9"), 404, "");
        let err = r.error_ref().unwrap();
        assert!(err.is_not_found());
        assert_eq!(err.oid(), Some("i-9"));

        let r: CrudResult<Item> = map_response(RequestedOperation::Load, "item", None, 503, "");
        assert!(r.error_ref().unwrap().is_server_error());
    }

    #[test]
    fn validation_body_is_list_or_plain_message() {
        let list = r#"[{"field":"name","message":"required"},{"message":"bad"}]"#;
        let r: CrudResult<Item> = map_response(RequestedOperation::Create, "item", None, 422, list);
        match r.error_ref().unwrap().kind() {
            CrudErrorKind::Validation { errors } => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field(), Some("name"));
                assert_eq!(errors[1].field(), None);
            }
            other => panic!("unexpected {other:?}"),
        }

        let r: CrudResult<Item> =
            map_response(RequestedOperation::Create, "item", None, 422, "name is required");
        match r.error_ref().unwrap().kind() {
            CrudErrorKind::Validation { errors } => {
                assert_eq!(errors, &vec![ValidationError::new(None, "name is required")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn server_response_is_read_back_by_proxy() {
        let served = CrudResult::created(RequestedOperation::Create, item());
        let (status, body) = to_response(&served).unwrap();
        let proxied: CrudResult<Item> =
            map_response(RequestedOperation::Create, "item", None, status, &body);
        assert_eq!(proxied, served);

        let rejected = CrudResult::<Item>::error(CrudError::validation(
            RequestedOperation::Create,
            "item",
            None,
            vec![ValidationError::for_field("name", "required")],
        ));
        let (status, body) = to_response(&rejected).unwrap();
        assert_eq!(status, 422);
        let proxied: CrudResult<Item> =
            map_response(RequestedOperation::Create, "item", None, status, &body);
        assert_eq!(proxied, rejected);
    }
}
