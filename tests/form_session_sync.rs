//! Form submission end to end: submitter, mutation, session store and
//! route map working together.

use std::sync::Arc;

use justfix::forms::{FieldError, FnMutation, FormResponse, FormSubmitter, SubmissionState};
use justfix::graphql::{CsrfSource, FlushStrategy, GraphQlClient, GraphQlError, GraphQlMutation};
use justfix::routes::{site_routes, Navigation, RouteMap, SiteType};
use justfix::session::{Session, SessionStore, SessionUpdate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginInput {
    phone_number: String,
    password: String,
}

fn login_input() -> LoginInput {
    LoginInput {
        phone_number: "1".to_string(),
        password: "2".to_string(),
    }
}

fn route_map() -> Arc<RouteMap> {
    Arc::new(RouteMap::new(&site_routes(SiteType::Justfix, "en")))
}

#[tokio::test]
async fn test_successful_login_updates_session() {
    let store = Arc::new(SessionStore::default());
    let mut submitter: FormSubmitter<LoginInput> =
        FormSubmitter::new(LoginInput::default(), Arc::clone(&store), route_map());

    let mutation = FnMutation(|_input: LoginInput| async {
        Ok::<_, GraphQlError>(FormResponse::<Map<String, Value>>::success(Some(
            SessionUpdate::new().with("csrfToken", "boop"),
        )))
    });

    submitter.run(&mutation, login_input()).await;

    assert_eq!(store.csrf_token(), "boop");
    assert!(!submitter.is_loading());
    assert!(submitter.was_submitted_successfully());
}

#[tokio::test]
async fn test_validation_errors_leave_session_alone() {
    let store = Arc::new(SessionStore::new(Session {
        csrf_token: "original".to_string(),
        ..Default::default()
    }));
    let mut submitter: FormSubmitter<LoginInput> =
        FormSubmitter::new(LoginInput::default(), Arc::clone(&store), route_map());

    let mutation = FnMutation(|_input: LoginInput| async {
        Ok::<_, GraphQlError>(FormResponse::<Map<String, Value>>::failure(vec![
            FieldError::new("phoneNumber", "This field is required."),
        ]))
    });

    let state = submitter.run(&mutation, login_input()).await;
    let SubmissionState::Failed(errors) = &state else {
        panic!("expected failure, got {state:?}");
    };
    assert_eq!(errors.field_errors("phoneNumber"), ["This field is required."]);
    assert_eq!(store.csrf_token(), "original");
}

#[tokio::test]
async fn test_login_over_graphql_redirects_softly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql/batch"))
        .and(header("X-CSRFToken", "initial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "data": {"login": {"errors": [], "session": {"csrfToken": "boop", "userId": 5}}}
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(SessionStore::new(Session {
        csrf_token: "initial".to_string(),
        ..Default::default()
    }));
    let client = GraphQlClient::new(
        format!("{}/graphql/batch", server.uri()),
        CsrfSource::Session(store.subscribe()),
        FlushStrategy::default(),
    );
    let mutation = GraphQlMutation::new(
        client,
        "login",
        "mutation Login($input: LoginInput!) { login(input: $input) { errors { field messages } session { csrfToken userId } } }",
    );

    let mut submitter: FormSubmitter<LoginInput> =
        FormSubmitter::new(LoginInput::default(), Arc::clone(&store), route_map())
            .redirect_to("/en/onboarding/step/1");
    let state = submitter.run(&mutation, login_input()).await;

    assert_eq!(
        state,
        SubmissionState::SucceededRedirecting(Navigation::Soft(
            "/en/onboarding/step/1".to_string()
        ))
    );
    assert_eq!(store.csrf_token(), "boop");
    assert!(store.snapshot().is_logged_in());
}

#[tokio::test]
async fn test_network_failure_reports_page_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = Arc::new(SessionStore::default());
    let client = GraphQlClient::new(
        format!("{}/graphql/batch", server.uri()),
        CsrfSource::Static(String::new()),
        FlushStrategy::default(),
    );
    let mutation = GraphQlMutation::new(client, "login", "mutation { login { errors { field } } }");

    let mut submitter: FormSubmitter<LoginInput> =
        FormSubmitter::new(LoginInput::default(), store, route_map());
    submitter.run(&mutation, login_input()).await;

    let errors = submitter.errors().unwrap();
    assert_eq!(errors.non_field_errors().len(), 1);
    assert!(!submitter.is_loading());
}
