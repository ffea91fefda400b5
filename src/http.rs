//! HTTP boundary: basic-auth, raw-body uploads and JSON listings over the
//! document engine.

use std::io;
use std::str::FromStr;
use std::time::Duration;

use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use base64::Engine;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;
use tokio_util::io::{ReaderStream, StreamReader};

use crate::adapters::BlobStoreImpl;
use crate::cancel::with_deadline;
use crate::documents::DocumentEngine;
use crate::entities::{Document, DocumentId, FileName, MediaType, Permissions, UserId};
use crate::error::Error;
use crate::ports::{Authenticator, Credentials};
use crate::users::PasswordAuthenticator;

const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

pub struct AppState {
    pub engine: DocumentEngine<BlobStoreImpl>,
    pub authenticator: PasswordAuthenticator,
    pub request_timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] Error);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            Error::Denied { .. } => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidTarget(_) | Error::InvalidRequest(_) | Error::InvalidPermissions(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::Cancelled => StatusCode::GATEWAY_TIMEOUT,
            Error::InvariantViolation(_)
            | Error::Io(_)
            | Error::Database(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            log::error!("request failed: {:?}", self.0);
            "internal error".to_string()
        } else {
            self.0.to_string()
        };

        let mut builder = HttpResponse::build(status);
        if let Error::Unauthenticated = self.0 {
            builder.insert_header((
                header::WWW_AUTHENTICATE,
                r#"Basic realm="restricted", charset="UTF-8""#,
            ));
        }
        builder.json(ErrorBody { error: message })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DocumentView {
    pub id: String,
    pub owner: String,
    pub version: i64,
    pub size: i64,
    pub media_type: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentView {
    fn from(document: Document) -> Self {
        Self {
            id: document.id.to_string(),
            owner: document.owner.into(),
            version: document.version.into(),
            size: document.size.into(),
            media_type: document.media_type.into(),
            file_name: document.file_name.into(),
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct UploadParams {
    pub file_name: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateParams {
    pub document_id: String,
    pub file_name: Option<String>,
}

#[derive(Deserialize)]
pub struct DocumentParams {
    pub document_id: String,
}

#[derive(Deserialize)]
pub struct ShareRequest {
    pub document_id: String,
    pub grantee: String,
    pub permissions: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ShareResponse {
    pub permissions: Vec<String>,
}

fn basic_credentials(req: &HttpRequest) -> Result<Credentials, Error> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(Error::Unauthenticated)?;
    let encoded = value
        .strip_prefix("Basic ")
        .ok_or(Error::Unauthenticated)?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| Error::Unauthenticated)?;
    let decoded = String::from_utf8(decoded).map_err(|_| Error::Unauthenticated)?;
    let (username, password) = decoded.split_once(':').ok_or(Error::Unauthenticated)?;

    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

async fn authenticated(state: &AppState, req: &HttpRequest) -> Result<UserId, Error> {
    let credentials = basic_credentials(req)?;
    state.authenticator.authenticate(&credentials).await
}

fn parse_document_id(value: &str) -> Result<DocumentId, Error> {
    DocumentId::from_str(value)
        .map_err(|_| Error::InvalidRequest(format!("malformed document id: {}", value)))
}

fn media_type_of(req: &HttpRequest) -> MediaType {
    let value = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(DEFAULT_MEDIA_TYPE);
    MediaType::from(value)
}

fn body_reader(payload: web::Payload) -> impl AsyncRead + Unpin {
    StreamReader::new(
        payload.map(|chunk| chunk.map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))),
    )
}

async fn register(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let credentials = basic_credentials(&req)
        .map_err(|_| Error::InvalidRequest("basic credentials required".to_string()))?;
    let user_id = state.authenticator.register(&credentials).await?;

    Ok(HttpResponse::Ok().json(RegisterResponse {
        user_id: user_id.into(),
    }))
}

async fn upload(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<UploadParams>,
    payload: web::Payload,
) -> Result<HttpResponse, ApiError> {
    let actor = authenticated(&state, &req).await?;
    let file_name = FileName::from(params.into_inner().file_name.unwrap_or_default());

    let document = with_deadline(
        state.request_timeout,
        state
            .engine
            .upload(&actor, body_reader(payload), media_type_of(&req), file_name),
    )
    .await?;

    Ok(HttpResponse::Created().json(DocumentView::from(document)))
}

async fn update(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<UpdateParams>,
    payload: web::Payload,
) -> Result<HttpResponse, ApiError> {
    let actor = authenticated(&state, &req).await?;
    let params = params.into_inner();
    let document_id = parse_document_id(&params.document_id)?;
    let file_name = FileName::from(params.file_name.unwrap_or_default());

    let document = with_deadline(
        state.request_timeout,
        state.engine.update(
            &actor,
            document_id,
            body_reader(payload),
            media_type_of(&req),
            file_name,
        ),
    )
    .await?;

    Ok(HttpResponse::Ok().json(DocumentView::from(document)))
}

async fn list_documents(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor = authenticated(&state, &req).await?;
    let documents = with_deadline(state.request_timeout, state.engine.list(&actor)).await?;

    Ok(HttpResponse::Ok().json(
        documents
            .into_iter()
            .map(DocumentView::from)
            .collect::<Vec<_>>(),
    ))
}

async fn list_shared_documents(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor = authenticated(&state, &req).await?;
    let documents =
        with_deadline(state.request_timeout, state.engine.list_shared(&actor)).await?;

    Ok(HttpResponse::Ok().json(
        documents
            .into_iter()
            .map(DocumentView::from)
            .collect::<Vec<_>>(),
    ))
}

async fn get_document(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<DocumentParams>,
) -> Result<HttpResponse, ApiError> {
    let actor = authenticated(&state, &req).await?;
    let document_id = parse_document_id(&params.document_id)?;

    let (document, file) =
        with_deadline(state.request_timeout, state.engine.open(&actor, document_id)).await?;

    let media_type = match document.media_type.value() {
        "" => DEFAULT_MEDIA_TYPE,
        value => value,
    };
    Ok(HttpResponse::Ok()
        .content_type(media_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(
                document.file_name.value().to_string(),
            )],
        })
        .insert_header(("X-Document-Version", document.version.to_string()))
        .streaming(ReaderStream::new(file)))
}

async fn share(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ShareRequest>,
) -> Result<HttpResponse, ApiError> {
    let actor = authenticated(&state, &req).await?;
    let body = body.into_inner();
    let document_id = parse_document_id(&body.document_id)?;
    let permissions = Permissions::from_names(&body.permissions)
        .map_err(|e| Error::InvalidPermissions(e.to_string()))?;
    let grantee = UserId::from(body.grantee);

    let granted = with_deadline(
        state.request_timeout,
        state
            .engine
            .share(&actor, document_id, &grantee, permissions),
    )
    .await?;

    Ok(HttpResponse::Ok().json(ShareResponse {
        permissions: granted.names().into_iter().map(String::from).collect(),
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/register").route(web::post().to(register)))
        .service(web::resource("/upload").route(web::post().to(upload)))
        .service(web::resource("/update").route(web::patch().to(update)))
        .service(web::resource("/documents").route(web::get().to(list_documents)))
        .service(web::resource("/documents/shared").route(web::get().to(list_shared_documents)))
        .service(web::resource("/document").route(web::get().to(get_document)))
        .service(web::resource("/share").route(web::post().to(share)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;
    use crate::test_utils::TestContext;
    use actix_web::{test, App};

    fn basic(username: &str, password: &str) -> (header::HeaderName, String) {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", username, password));
        (header::AUTHORIZATION, format!("Basic {}", encoded))
    }

    fn state(ctx: &TestContext) -> web::Data<AppState> {
        web::Data::new(AppState {
            engine: ctx.engine(),
            authenticator: PasswordAuthenticator::new(ctx.pool.clone()),
            request_timeout: Duration::from_secs(10),
        })
    }

    #[sqlx::test]
    async fn share_grants_read_over_http(pool: PgPool) {
        let ctx = TestContext::new(pool).await;
        let app = test::init_service(App::new().app_data(state(&ctx)).configure(configure)).await;

        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let req = test::TestRequest::post()
                .uri("/register")
                .insert_header(basic(name, "pw"))
                .to_request();
            let registered: RegisterResponse = test::call_and_read_body_json(&app, req).await;
            ids.push(registered.user_id);
        }
        let bob_id = ids[1].clone();

        let content = vec![42u8; 1024];
        let req = test::TestRequest::post()
            .uri("/upload?file_name=a.png")
            .insert_header(basic("alice", "pw"))
            .insert_header((header::CONTENT_TYPE, "image/png"))
            .set_payload(content.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let uploaded: DocumentView = test::read_body_json(resp).await;
        assert_eq!(uploaded.version, 1);
        assert_eq!(uploaded.size, 1024);
        assert_eq!(uploaded.media_type, "image/png");

        let open = |user: &str| {
            test::TestRequest::get()
                .uri(&format!("/document?document_id={}", uploaded.id))
                .insert_header(basic(user, "pw"))
                .to_request()
        };
        let resp = test::call_service(&app, open("bob")).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let alice_docs: Vec<DocumentView> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/documents")
                .insert_header(basic("alice", "pw"))
                .to_request(),
        )
        .await;
        assert_eq!(alice_docs.len(), 1);
        assert_eq!(alice_docs[0].id, uploaded.id);
        assert_eq!(alice_docs[0].owner, ids[0]);

        let req = test::TestRequest::post()
            .uri("/share")
            .insert_header(basic("alice", "pw"))
            .set_json(serde_json::json!({
                "document_id": uploaded.id,
                "grantee": bob_id,
                "permissions": ["READ"],
            }))
            .to_request();
        let granted: ShareResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(granted.permissions, vec!["READ"]);

        let resp = test::call_service(&app, open("bob")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        let body = test::read_body(resp).await;
        assert_eq!(body.as_ref(), content.as_slice());

        let shared: Vec<DocumentView> = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/documents/shared")
                .insert_header(basic("bob", "pw"))
                .to_request(),
        )
        .await;
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].id, uploaded.id);
    }

    #[sqlx::test]
    async fn update_over_http_bumps_the_version(pool: PgPool) {
        let ctx = TestContext::new(pool).await;
        let app = test::init_service(App::new().app_data(state(&ctx)).configure(configure)).await;
        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .insert_header(basic("alice", "pw"))
                .to_request(),
        )
        .await;

        let uploaded: DocumentView = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/upload?file_name=notes.txt")
                .insert_header(basic("alice", "pw"))
                .insert_header((header::CONTENT_TYPE, "text/plain"))
                .set_payload("first")
                .to_request(),
        )
        .await;

        let updated: DocumentView = test::call_and_read_body_json(
            &app,
            test::TestRequest::patch()
                .uri(&format!(
                    "/update?document_id={}&file_name=notes.txt",
                    uploaded.id
                ))
                .insert_header(basic("alice", "pw"))
                .insert_header((header::CONTENT_TYPE, "text/plain"))
                .set_payload("second")
                .to_request(),
        )
        .await;
        assert_eq!(updated.id, uploaded.id);
        assert_eq!(updated.version, 2);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/document?document_id={}", uploaded.id))
                .insert_header(basic("alice", "pw"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.headers().get("X-Document-Version").unwrap(), "2");
        assert_eq!(test::read_body(resp).await.as_ref(), b"second");
    }

    #[sqlx::test]
    async fn rejects_bad_requests(pool: PgPool) {
        let ctx = TestContext::new(pool).await;
        let app = test::init_service(App::new().app_data(state(&ctx)).configure(configure)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/documents").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/documents")
                .insert_header(basic("ghost", "pw"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .insert_header(basic("alice", "pw"))
                .to_request(),
        )
        .await;
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/document?document_id=not-a-ulid")
                .insert_header(basic("alice", "pw"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/document?document_id={}", DocumentId::generate()))
                .insert_header(basic("alice", "pw"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/share")
                .insert_header(basic("alice", "pw"))
                .set_json(serde_json::json!({
                    "document_id": DocumentId::generate().to_string(),
                    "grantee": "bob",
                    "permissions": ["READ", "DELETE"],
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
