use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use restgate::dispatch::codec::Model;
use restgate::dispatch::controller::{
    Controller, CreateInput, DeleteInput, ListInput, Page, ReadInput, UpdateInput,
};
use restgate::dispatch::error::{DomainError, DomainResult};
use restgate::dispatch::{AccessLevel, OperationKind, ParsedRequest, Pipeline, PipelineConfig, PipelineOutcome};
use restgate::http::response::StatusCode;
use restgate::inspect::{Normalizer, PrevalidationFormat, Prevalidator, Validator};
use restgate::routing::Identifiers;

fn model(value: Value) -> Model {
    value.as_object().unwrap().clone()
}

/// Records every call and answers with canned results.
#[derive(Default)]
struct FakeController {
    calls: Mutex<Vec<&'static str>>,
    stored: Mutex<Model>,
    updated: Mutex<Option<UpdateInput>>,
    listed: Mutex<Option<ListInput>>,
    created: Mutex<Option<CreateInput>>,
    fail_with: Mutex<Option<fn() -> DomainError>>,
    page: Page,
    delay: Option<Duration>,
}

impl FakeController {
    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn failing(error: fn() -> DomainError) -> Self {
        let controller = Self::default();
        *controller.fail_with.lock().unwrap() = Some(error);
        controller
    }

    async fn enter(&self, name: &'static str) -> DomainResult<()> {
        self.calls.lock().unwrap().push(name);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match *self.fail_with.lock().unwrap() {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Controller for FakeController {
    async fn create(&self, input: CreateInput) -> DomainResult<Model> {
        self.enter("create").await?;
        let mut created = input.model.clone();
        created.insert("id".to_string(), json!(1));
        *self.created.lock().unwrap() = Some(input);
        Ok(created)
    }

    async fn read(&self, _input: ReadInput) -> DomainResult<Model> {
        self.enter("read").await?;
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn update(&self, input: UpdateInput) -> DomainResult<Model> {
        self.enter("update").await?;
        let model = input.model.clone();
        *self.updated.lock().unwrap() = Some(input);
        Ok(model)
    }

    async fn delete(&self, _input: DeleteInput) -> DomainResult<()> {
        self.enter("delete").await
    }

    async fn list(&self, input: ListInput) -> DomainResult<Page> {
        self.enter("list").await?;
        *self.listed.lock().unwrap() = Some(input);
        Ok(self.page.clone())
    }
}

fn pipeline(controller: &Arc<FakeController>) -> Pipeline {
    Pipeline::with_config(controller.clone(), PipelineConfig::default())
}

fn request(identifiers: &[(&str, &str)], body: &str) -> ParsedRequest {
    request_with(identifiers, None, &[("authorization", "token")], body)
}

fn request_with(
    identifiers: &[(&str, &str)],
    query: Option<&str>,
    headers: &[(&str, &str)],
    body: &str,
) -> ParsedRequest {
    ParsedRequest::from_parts(
        identifiers.iter().copied().collect::<Identifiers>(),
        query,
        headers.iter().copied(),
        body,
    )
}

fn token_auth(authorization: Option<&str>, _level: AccessLevel) -> Option<String> {
    authorization.map(|token| format!("user-{}", token))
}

#[tokio::test]
async fn test_create_validation_failure_skips_controller() {
    let controller = Arc::new(FakeController::default());
    let pipeline = pipeline(&controller).validate(Validator::new().not_empty("cat", "empty cat"));

    let outcome = pipeline
        .run(OperationKind::Create, &request(&[], r#"{"dog": 1}"#))
        .await;

    assert_eq!(outcome.status(), StatusCode::BadRequest);
    assert_eq!(outcome.messages(), vec!["empty cat"]);
    assert!(controller.calls().is_empty());
}

#[tokio::test]
async fn test_create_success_returns_created_model() {
    let controller = Arc::new(FakeController::default());
    let pipeline = pipeline(&controller).authorize(token_auth);

    let outcome = pipeline
        .run(
            OperationKind::Create,
            &request_with(
                &[],
                None,
                &[("Authorization", "abc"), ("Accept-Language", "fr")],
                r#"{"cat": "tom"}"#,
            ),
        )
        .await;

    assert_eq!(outcome, PipelineOutcome::created(json!({ "cat": "tom", "id": 1 })));

    let input = controller.created.lock().unwrap().clone().unwrap();
    assert_eq!(input.user_id.as_deref(), Some("user-abc"));
    assert_eq!(input.language.as_deref(), Some("fr"));
}

#[tokio::test]
async fn test_partial_update_merges_before_update() {
    let controller = Arc::new(FakeController::default());
    *controller.stored.lock().unwrap() = model(json!({ "cat": "x", "dog": 1, "tiger": "y" }));
    let pipeline = pipeline(&controller);

    let outcome = pipeline
        .run(
            OperationKind::PartialUpdate,
            &request(&[("id", "5")], r#"{"tiger": "z"}"#),
        )
        .await;

    assert_eq!(outcome.status(), StatusCode::Ok);
    assert_eq!(controller.calls(), vec!["read", "update"]);

    let input = controller.updated.lock().unwrap().clone().unwrap();
    assert_eq!(input.model, model(json!({ "cat": "x", "dog": 1, "tiger": "z" })));
    assert_eq!(input.identifiers.get("id"), Some("5"));
}

#[tokio::test]
async fn test_partial_update_explicit_null_overwrites() {
    let controller = Arc::new(FakeController::default());
    *controller.stored.lock().unwrap() = model(json!({ "cat": "x", "dog": 1 }));
    let pipeline = pipeline(&controller);

    let outcome = pipeline
        .run(
            OperationKind::PartialUpdate,
            &request(&[("id", "5")], r#"{"dog": null}"#),
        )
        .await;

    assert_eq!(outcome.status(), StatusCode::Ok);

    let input = controller.updated.lock().unwrap().clone().unwrap();
    assert_eq!(input.model, model(json!({ "cat": "x", "dog": null })));
}

#[tokio::test]
async fn test_partial_update_validates_merged_model() {
    let controller = Arc::new(FakeController::default());
    *controller.stored.lock().unwrap() = model(json!({ "cat": "x" }));
    let pipeline = pipeline(&controller).validate(Validator::new().is_string("cat", "cat must be a string"));

    let outcome = pipeline
        .run(
            OperationKind::PartialUpdate,
            &request(&[("id", "5")], r#"{"cat": 3}"#),
        )
        .await;

    assert_eq!(outcome.status(), StatusCode::BadRequest);
    assert_eq!(outcome.messages(), vec!["cat must be a string"]);
    assert_eq!(controller.calls(), vec!["read"]);
}

#[tokio::test]
async fn test_unauthorized_preempts_invalid_body() {
    let controller = Arc::new(FakeController::default());
    let pipeline = pipeline(&controller)
        .authorize(|_auth: Option<&str>, _level: AccessLevel| -> Option<String> { None })
        .validate(Validator::new().not_empty("cat", "empty cat"));

    let outcome = pipeline
        .run(OperationKind::Create, &request(&[], "not json"))
        .await;

    assert_eq!(outcome.status(), StatusCode::Unauthorized);
    assert_eq!(outcome.messages(), vec!["unauthorized"]);
    assert!(controller.calls().is_empty());
}

#[tokio::test]
async fn test_empty_user_id_is_unauthorized() {
    let controller = Arc::new(FakeController::default());
    let pipeline = pipeline(&controller)
        .authorize(|_auth: Option<&str>, _level: AccessLevel| Some(String::new()));

    let outcome = pipeline
        .run(OperationKind::Read, &request(&[("id", "1")], ""))
        .await;

    assert_eq!(outcome.status(), StatusCode::Unauthorized);
}

#[tokio::test]
async fn test_authorization_receives_access_level() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let controller = Arc::new(FakeController::default());
    let pipeline = pipeline(&controller).authorize(move |_auth: Option<&str>, level: AccessLevel| {
        recorder.lock().unwrap().push(level);
        Some("me".to_string())
    });

    pipeline.run(OperationKind::List, &request(&[], "")).await;
    pipeline.run(OperationKind::Update, &request(&[("id", "1")], "{}")).await;
    pipeline.run(OperationKind::Delete, &request(&[("id", "1")], "")).await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![AccessLevel::Read, AccessLevel::Write, AccessLevel::Delete]
    );
}

#[tokio::test]
async fn test_delete_not_found_maps_to_404() {
    let controller = Arc::new(FakeController::failing(|| DomainError::not_found("missing")));
    let pipeline = pipeline(&controller);

    let outcome = pipeline
        .run(OperationKind::Delete, &request(&[("id", "9")], ""))
        .await;

    assert_eq!(outcome.status(), StatusCode::NotFound);
    assert_eq!(outcome.messages(), vec!["missing"]);
}

#[tokio::test]
async fn test_delete_success_is_no_content() {
    let controller = Arc::new(FakeController::default());
    let pipeline = pipeline(&controller);

    let outcome = pipeline
        .run(OperationKind::Delete, &request(&[("id", "9")], ""))
        .await;
    let response = outcome.into_response();

    assert_eq!(response.status, StatusCode::NoContent);
    assert!(response.body.is_empty());
    assert_eq!(controller.calls(), vec!["delete"]);
}

#[tokio::test]
async fn test_list_method_not_allowed_from_controller() {
    let controller = Arc::new(FakeController::failing(|| {
        DomainError::method_not_allowed("listing is disabled")
    }));
    let pipeline = pipeline(&controller);

    let outcome = pipeline.run(OperationKind::List, &request(&[], "")).await;

    assert_eq!(outcome.status(), StatusCode::MethodNotAllowed);
}

#[tokio::test]
async fn test_forbidden_after_validation_carries_code() {
    let controller = Arc::new(FakeController::failing(|| {
        DomainError::forbidden_with_code("too many cats", "CAT_LIMIT")
    }));
    let pipeline = pipeline(&controller).validate(Validator::new().not_empty("cat", "empty cat"));

    let outcome = pipeline
        .run(OperationKind::Create, &request(&[], r#"{"cat": "tom"}"#))
        .await;

    assert_eq!(outcome.status(), StatusCode::Forbidden);
    assert_eq!(
        outcome.into_response().json_body(),
        json!({ "message": "too many cats", "code": "CAT_LIMIT" })
    );
}

#[tokio::test]
async fn test_internal_error_maps_to_500() {
    let controller = Arc::new(FakeController::failing(|| DomainError::internal("disk on fire")));
    let pipeline = pipeline(&controller);

    let outcome = pipeline
        .run(OperationKind::Read, &request(&[("id", "1")], ""))
        .await;

    assert!(matches!(outcome, PipelineOutcome::ServerError { .. }));
    assert_eq!(outcome.status(), StatusCode::InternalServerError);
}

#[tokio::test]
async fn test_prevalidation_message_follows_validation_messages() {
    let controller = Arc::new(FakeController::default());
    let pipeline = pipeline(&controller)
        .prevalidate(Prevalidator::new(PrevalidationFormat::Ncode))
        .validate(Validator::new().not_empty("cat", "empty cat"));

    let outcome = pipeline
        .run(
            OperationKind::Update,
            &request(&[("ownerId", "x1"), ("id", "2b")], "{}"),
        )
        .await;

    assert_eq!(outcome.status(), StatusCode::BadRequest);
    assert_eq!(outcome.messages(), vec!["empty cat", "invalid url for ownerId,id"]);
    assert!(controller.calls().is_empty());
}

#[tokio::test]
async fn test_prevalidation_failure_alone_on_read() {
    let controller = Arc::new(FakeController::default());
    let pipeline = pipeline(&controller).prevalidate(Prevalidator::new(PrevalidationFormat::Uuid));

    let outcome = pipeline
        .run(OperationKind::Read, &request(&[("id", "42")], ""))
        .await;

    assert_eq!(outcome.status(), StatusCode::BadRequest);
    assert_eq!(outcome.messages(), vec!["invalid url for id"]);
    assert!(controller.calls().is_empty());
}

#[tokio::test]
async fn test_unsupported_is_405_before_authorization() {
    let controller = Arc::new(FakeController::default());
    let pipeline = pipeline(&controller).authorize(|_auth: Option<&str>, _level: AccessLevel| -> Option<String> { None });

    let outcome = pipeline
        .run(OperationKind::Unsupported, &request(&[], ""))
        .await;

    assert_eq!(outcome.status(), StatusCode::MethodNotAllowed);
}

#[tokio::test]
async fn test_list_normalizes_filter_and_sets_page_headers() {
    let controller = Arc::new(FakeController {
        page: Page {
            items: vec![model(json!({ "cat": "tom" }))],
            page_count: 4,
            item_count: 31,
        },
        ..FakeController::default()
    });
    let pipeline = pipeline(&controller).normalize(Normalizer::new().as_int("age").as_boolean("indoor"));

    let outcome = pipeline
        .run(
            OperationKind::List,
            &request_with(
                &[],
                Some("age=7&indoor=maybe&name=tom"),
                &[("Sort-By", "name, age"), ("Page-Index", "2"), ("Page-Size", "10")],
                "",
            ),
        )
        .await;

    let response = outcome.into_response();
    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Page-Count"), Some("4"));
    assert_eq!(response.header("Item-Count"), Some("31"));
    assert_eq!(response.json_body(), json!([{ "cat": "tom" }]));

    let input = controller.listed.lock().unwrap().clone().unwrap();
    assert_eq!(input.filter, model(json!({ "age": 7, "name": "tom" })));
    assert_eq!(input.sort_by, vec!["name", "age"]);
    assert_eq!(input.page_index, Some(2));
    assert_eq!(input.page_size, Some(10));
}

#[tokio::test]
async fn test_invoke_timeout_maps_to_500() {
    let controller = Arc::new(FakeController {
        delay: Some(Duration::from_millis(200)),
        ..FakeController::default()
    });
    let pipeline = pipeline(&controller).invoke_timeout(Some(Duration::from_millis(10)));

    let outcome = pipeline
        .run(OperationKind::Read, &request(&[("id", "1")], ""))
        .await;

    assert_eq!(outcome.status(), StatusCode::InternalServerError);
    assert_eq!(outcome.messages(), vec!["operation timed out"]);
}

#[tokio::test]
async fn test_malformed_body_is_empty_model() {
    let controller = Arc::new(FakeController::default());
    let pipeline = pipeline(&controller);

    let outcome = pipeline
        .run(OperationKind::Create, &request(&[], "[1, 2, 3]"))
        .await;

    assert_eq!(outcome, PipelineOutcome::created(json!({ "id": 1 })));
}
