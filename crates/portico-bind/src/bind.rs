//! The binding middleware.

use crate::config::{BindConfig, FailurePolicy};
use crate::error::{BindError, BindFailure};
use bytes::Bytes;
use http::request::Parts;
use http::{header, Method};
use http_body_util::{BodyExt, Full};
use indexmap::IndexMap;
use portico_core::{BoxFuture, Middleware, Next, Request, RequestContext, Response, ResponseExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::marker::PhantomData;
use validator::Validate;

/// Middleware that binds the request's body or query into a fresh `T`.
///
/// The source is chosen per request: GET/HEAD bind from the query string,
/// other methods from the body by content type (`application/json` or
/// `application/x-www-form-urlencoded`). After decoding, the `validator`
/// constraints declared on `T` run. On success the value is stored in the
/// context keyed by its type; handlers retrieve it with
/// `ctx.get_extension::<T>()`.
///
/// The buffered body is re-attached to the request in every case, so
/// downstream handlers read the identical bytes.
///
/// A bodyless non-GET request is the "empty" case: nothing is decoded,
/// nothing is stored, and no failure policy applies.
pub struct Bind<T> {
    config: BindConfig,
    _target: PhantomData<fn() -> T>,
}

impl<T> Bind<T> {
    /// Creates a binder with the default (silent) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BindConfig::default())
    }

    /// Creates a binder with the given configuration.
    #[must_use]
    pub fn with_config(config: BindConfig) -> Self {
        Self {
            config,
            _target: PhantomData,
        }
    }
}

impl<T> Default for Bind<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Middleware for Bind<T>
where
    T: DeserializeOwned + Validate + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "bind"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            run_bind(&self.config, ctx, request, next, decode_fresh::<T>).await
        })
    }
}

/// Middleware that binds the request over a factory-produced base value.
///
/// The factory runs once per request and its result supplies defaults:
/// request fields merge over the base (deep merge for JSON objects, key-wise
/// override for query/form pairs, repeated keys collapsing to the last), so
/// fields absent from the input keep their factory values. The factory's
/// value itself is never mutated - it is consumed into the merge.
///
/// Use [`Bind`] instead unless the target needs pre-populated defaults.
///
/// # Example
///
/// ```
/// use portico_bind::BindWithDefaults;
/// use serde::{Deserialize, Serialize};
/// use validator::Validate;
///
/// #[derive(Debug, Serialize, Deserialize, Validate)]
/// struct ListQuery {
///     page: u32,
///     per_page: u32,
/// }
///
/// let bind = BindWithDefaults::new(|| ListQuery { page: 1, per_page: 20 });
/// ```
pub struct BindWithDefaults<T, F> {
    factory: F,
    config: BindConfig,
    _target: PhantomData<fn() -> T>,
}

impl<T, F: Fn() -> T> BindWithDefaults<T, F> {
    /// Creates a binder around the given factory with the default (silent)
    /// configuration.
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, BindConfig::default())
    }

    /// Creates a binder around the given factory and configuration.
    #[must_use]
    pub fn with_config(factory: F, config: BindConfig) -> Self {
        Self {
            factory,
            config,
            _target: PhantomData,
        }
    }
}

impl<T, F> Middleware for BindWithDefaults<T, F>
where
    T: DeserializeOwned + Serialize + Validate + Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "bind"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let base = (self.factory)();
            run_bind(&self.config, ctx, request, next, move |parts, body| {
                decode_with_defaults(base, parts, body)
            })
            .await
        })
    }
}

/// Shared driver: buffer the body, decode, apply the failure policy.
async fn run_bind<T, D>(
    config: &BindConfig,
    ctx: &mut RequestContext,
    request: Request,
    next: Next<'_>,
    decode: D,
) -> Response
where
    T: Send + Sync + 'static,
    D: FnOnce(&Parts, &Bytes) -> Result<Option<T>, BindError>,
{
    let (parts, body) = request.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    };

    let outcome = decode(&parts, &body);

    // Re-attach the buffered bytes so downstream handlers can read them
    let request = Request::from_parts(parts, Full::new(body));

    match outcome {
        Ok(Some(value)) => {
            ctx.set_extension(value);
            next.run(ctx, request).await
        }
        Ok(None) => next.run(ctx, request).await,
        Err(err) => match config.policy {
            FailurePolicy::Silent => {
                tracing::debug!(error = %err, "bind failed, continuing chain");
                next.run(ctx, request).await
            }
            FailurePolicy::Abort => {
                ctx.set_extension(BindFailure(err));
                Response::empty(config.status)
            }
            FailurePolicy::Respond => failure_response(config, &err),
        },
    }
}

/// Where the bound value is decoded from.
enum Source<'a> {
    Query(&'a str),
    Json,
    Form,
}

impl<'a> Source<'a> {
    /// Selects the binding source, or `None` for the bodyless "empty" case.
    fn of(parts: &'a Parts, body: &Bytes) -> Result<Option<Self>, BindError> {
        if parts.method == Method::GET || parts.method == Method::HEAD {
            return Ok(Some(Self::Query(parts.uri.query().unwrap_or(""))));
        }
        if body.is_empty() {
            return Ok(None);
        }

        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let mime = content_type.split(';').next().unwrap_or("").trim();

        match mime {
            "application/json" => Ok(Some(Self::Json)),
            "application/x-www-form-urlencoded" => Ok(Some(Self::Form)),
            other => Err(BindError::UnsupportedMediaType(other.to_string())),
        }
    }
}

/// Decodes a fresh `T` from the selected source and validates it.
fn decode_fresh<T>(parts: &Parts, body: &Bytes) -> Result<Option<T>, BindError>
where
    T: DeserializeOwned + Validate,
{
    let source = match Source::of(parts, body)? {
        Some(source) => source,
        None => return Ok(None),
    };

    let value: T = match source {
        Source::Query(query) => serde_urlencoded::from_str(query)?,
        Source::Json => serde_json::from_slice(body)?,
        Source::Form => serde_urlencoded::from_bytes(body)?,
    };

    value.validate()?;
    Ok(Some(value))
}

/// Decodes `T` by merging the request data over the factory-produced base.
fn decode_with_defaults<T>(base: T, parts: &Parts, body: &Bytes) -> Result<Option<T>, BindError>
where
    T: DeserializeOwned + Serialize + Validate,
{
    let source = match Source::of(parts, body)? {
        Some(source) => source,
        None => return Ok(None),
    };

    let value: T = match source {
        Source::Query(query) => merge_pairs(&base, query.as_bytes())?,
        Source::Form => merge_pairs(&base, body)?,
        Source::Json => {
            let mut merged =
                serde_json::to_value(&base).map_err(|e| BindError::Defaults(e.to_string()))?;
            let patch: Value = serde_json::from_slice(body)?;
            merge_json(&mut merged, patch);
            serde_json::from_value(merged)?
        }
    };

    value.validate()?;
    Ok(Some(value))
}

/// Recursively merges `patch` into `base`; objects merge key-wise, everything
/// else is replaced.
fn merge_json(base: &mut Value, patch: Value) {
    if let Value::Object(patch_map) = patch {
        if let Value::Object(base_map) = base {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
            return;
        }
        *base = Value::Object(patch_map);
    } else {
        *base = patch;
    }
}

/// Decodes `T` from urlencoded `input` with the base's own encoding supplying
/// defaults for absent keys. Repeated keys collapse to the last occurrence.
fn merge_pairs<T>(base: &T, input: &[u8]) -> Result<T, BindError>
where
    T: Serialize + DeserializeOwned,
{
    let base_encoded =
        serde_urlencoded::to_string(base).map_err(|e| BindError::Defaults(e.to_string()))?;

    let mut pairs: IndexMap<String, String> = IndexMap::new();
    for (key, value) in serde_urlencoded::from_str::<Vec<(String, String)>>(&base_encoded)? {
        pairs.insert(key, value);
    }
    for (key, value) in serde_urlencoded::from_bytes::<Vec<(String, String)>>(input)? {
        pairs.insert(key, value);
    }

    let merged =
        serde_urlencoded::to_string(&pairs).map_err(|e| BindError::Defaults(e.to_string()))?;
    Ok(serde_urlencoded::from_str(&merged)?)
}

/// Builds the Respond-policy response body.
fn failure_response(config: &BindConfig, err: &BindError) -> Response {
    if !config.detail {
        return Response::empty(config.status);
    }

    match err {
        BindError::Validation(errors) => {
            let mut failures: Vec<(String, String)> = errors
                .field_errors()
                .iter()
                .flat_map(|(field, errs)| {
                    errs.iter().map(move |e| (field.to_string(), e.code.to_string()))
                })
                .collect();
            // HashMap iteration order is arbitrary; keep the body deterministic
            failures.sort();

            let failures: Vec<Value> = failures
                .into_iter()
                .map(|(field, rule)| json!({ "field": field, "rule": rule }))
                .collect();

            Response::json(
                config.status,
                &json!({ "code": "validation_error", "errors": failures }),
            )
        }
        other => Response::json(
            config.status,
            &json!({ "code": "binding_error", "error": other.to_string() }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Serialize, Validate, PartialEq)]
    struct CreateUser {
        #[validate(length(min = 3))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[derive(Debug, Deserialize, Serialize, Validate, PartialEq)]
    struct ListQuery {
        page: u32,
        per_page: u32,
    }

    fn json_request(body: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    fn query_request(path_and_query: &str) -> Request {
        HttpRequest::builder()
            .method("GET")
            .uri(path_and_query)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn ok_handler() -> Next<'static> {
        Next::handler(|_ctx, _req| {
            Box::pin(async {
                HttpResponse::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(Bytes::new()))
                    .unwrap()
            })
        })
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_bind_stores_value() {
        let bind = Bind::<CreateUser>::new();
        let mut ctx = RequestContext::new();

        let response = bind
            .process(
                &mut ctx,
                json_request(r#"{"name":"alice","email":"alice@example.com"}"#),
                ok_handler(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            ctx.get_extension::<CreateUser>(),
            Some(&CreateUser {
                name: "alice".to_string(),
                email: "alice@example.com".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_value_is_stored_before_handler_runs() {
        let bind = Bind::<CreateUser>::new();
        let mut ctx = RequestContext::new();

        let handler = Next::handler(|ctx: &mut RequestContext, _req| {
            let bound = ctx.has_extension::<CreateUser>();
            Box::pin(async move {
                let status = if bound {
                    StatusCode::OK
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                HttpResponse::builder()
                    .status(status)
                    .body(Full::new(Bytes::new()))
                    .unwrap()
            })
        });

        let response = bind
            .process(
                &mut ctx,
                json_request(r#"{"name":"alice","email":"alice@example.com"}"#),
                handler,
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_body_is_rereadable_downstream() {
        let bind = Bind::<CreateUser>::new();
        let mut ctx = RequestContext::new();
        let payload = r#"{"name":"alice","email":"alice@example.com"}"#;

        // Handler echoes the body it sees back in the response
        let handler = Next::handler(|_ctx: &mut RequestContext, req: Request| {
            Box::pin(async move {
                let bytes = req.into_body().collect().await.unwrap().to_bytes();
                HttpResponse::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(bytes))
                    .unwrap()
            })
        });

        let response = bind.process(&mut ctx, json_request(payload), handler).await;
        assert_eq!(body_string(response).await, payload);
    }

    #[tokio::test]
    async fn test_body_is_rereadable_after_failure() {
        let bind = Bind::<CreateUser>::new();
        let mut ctx = RequestContext::new();
        let payload = r#"{"name":1}"#;

        let handler = Next::handler(|_ctx: &mut RequestContext, req: Request| {
            Box::pin(async move {
                let bytes = req.into_body().collect().await.unwrap().to_bytes();
                HttpResponse::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(bytes))
                    .unwrap()
            })
        });

        let response = bind.process(&mut ctx, json_request(payload), handler).await;
        assert_eq!(body_string(response).await, payload);
    }

    #[tokio::test]
    async fn test_query_bind_on_get() {
        let bind = Bind::<ListQuery>::new();
        let mut ctx = RequestContext::new();

        let response = bind
            .process(&mut ctx, query_request("/items?page=2&per_page=50"), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            ctx.get_extension::<ListQuery>(),
            Some(&ListQuery { page: 2, per_page: 50 })
        );
    }

    #[tokio::test]
    async fn test_form_bind_on_post() {
        let bind = Bind::<ListQuery>::new();
        let mut ctx = RequestContext::new();

        let request = HttpRequest::builder()
            .method("POST")
            .uri("/items")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from("page=3&per_page=10")))
            .unwrap();

        let _response = bind.process(&mut ctx, request, ok_handler()).await;
        assert_eq!(
            ctx.get_extension::<ListQuery>(),
            Some(&ListQuery { page: 3, per_page: 10 })
        );
    }

    #[tokio::test]
    async fn test_empty_body_stores_nothing_and_continues() {
        let bind = Bind::<CreateUser>::with_config(BindConfig::respond(StatusCode::BAD_REQUEST));
        let mut ctx = RequestContext::new();

        let request = HttpRequest::builder()
            .method("POST")
            .uri("/users")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let response = bind.process(&mut ctx, request, ok_handler()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!ctx.has_extension::<CreateUser>());
    }

    #[tokio::test]
    async fn test_silent_policy_continues_on_failure() {
        let bind = Bind::<CreateUser>::new();
        let mut ctx = RequestContext::new();

        let response = bind
            .process(&mut ctx, json_request("{not json"), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!ctx.has_extension::<CreateUser>());
        assert!(!ctx.has_extension::<BindFailure>());
    }

    #[tokio::test]
    async fn test_abort_policy_stores_failure_and_short_circuits() {
        let bind = Bind::<CreateUser>::with_config(BindConfig::abort(StatusCode::BAD_REQUEST));
        let mut ctx = RequestContext::new();

        let handler = Next::handler(|_ctx, _req| {
            Box::pin(async {
                // must not run
                HttpResponse::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(Bytes::from("handler ran")))
                    .unwrap()
            })
        });

        let response = bind.process(&mut ctx, json_request("{not json"), handler).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "");
        assert!(matches!(
            ctx.get_extension::<BindFailure>(),
            Some(BindFailure(BindError::Json(_)))
        ));
    }

    #[tokio::test]
    async fn test_respond_without_detail_is_empty() {
        let bind = Bind::<CreateUser>::with_config(BindConfig::respond(StatusCode::FORBIDDEN));
        let mut ctx = RequestContext::new();

        let response = bind
            .process(
                &mut ctx,
                json_request(r#"{"name":"ab","email":"nope"}"#),
                ok_handler(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_respond_with_validation_detail() {
        let bind = Bind::<CreateUser>::with_config(
            BindConfig::respond(StatusCode::BAD_REQUEST).with_detail(),
        );
        let mut ctx = RequestContext::new();

        let response = bind
            .process(
                &mut ctx,
                json_request(r#"{"name":"alice","email":"not-an-email"}"#),
                ok_handler(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(response).await,
            r#"{"code":"validation_error","errors":[{"field":"email","rule":"email"}]}"#
        );
    }

    #[tokio::test]
    async fn test_respond_with_multiple_validation_failures() {
        let bind = Bind::<CreateUser>::with_config(
            BindConfig::respond(StatusCode::BAD_REQUEST).with_detail(),
        );
        let mut ctx = RequestContext::new();

        let response = bind
            .process(
                &mut ctx,
                json_request(r#"{"name":"ab","email":"nope"}"#),
                ok_handler(),
            )
            .await;

        assert_eq!(
            body_string(response).await,
            r#"{"code":"validation_error","errors":[{"field":"email","rule":"email"},{"field":"name","rule":"length"}]}"#
        );
    }

    #[tokio::test]
    async fn test_respond_with_decoder_detail() {
        let bind = Bind::<CreateUser>::with_config(
            BindConfig::respond(StatusCode::BAD_REQUEST).with_detail(),
        );
        let mut ctx = RequestContext::new();
        let payload = "{not json";

        let response = bind.process(&mut ctx, json_request(payload), ok_handler()).await;

        let expected_text = serde_json::from_str::<CreateUser>(payload)
            .unwrap_err()
            .to_string();
        let expected = format!(
            r#"{{"code":"binding_error","error":"failed to decode json body: {expected_text}"}}"#
        );
        assert_eq!(body_string(response).await, expected);
    }

    #[tokio::test]
    async fn test_unsupported_content_type_is_a_failure() {
        let bind = Bind::<CreateUser>::with_config(
            BindConfig::respond(StatusCode::UNSUPPORTED_MEDIA_TYPE).with_detail(),
        );
        let mut ctx = RequestContext::new();

        let request = HttpRequest::builder()
            .method("POST")
            .uri("/users")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Full::new(Bytes::from("hello")))
            .unwrap();

        let response = bind.process(&mut ctx, request, ok_handler()).await;
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(
            body_string(response).await,
            r#"{"code":"binding_error","error":"unsupported content type: text/plain"}"#
        );
    }

    #[tokio::test]
    async fn test_content_type_parameters_are_ignored() {
        let bind = Bind::<CreateUser>::new();
        let mut ctx = RequestContext::new();

        let request = HttpRequest::builder()
            .method("POST")
            .uri("/users")
            .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
            .body(Full::new(Bytes::from(
                r#"{"name":"alice","email":"alice@example.com"}"#,
            )))
            .unwrap();

        let _response = bind.process(&mut ctx, request, ok_handler()).await;
        assert!(ctx.has_extension::<CreateUser>());
    }

    #[tokio::test]
    async fn test_defaults_survive_for_absent_json_fields() {
        #[derive(Debug, Deserialize, Serialize, Validate, PartialEq)]
        struct Settings {
            #[validate(range(min = 1))]
            retries: u32,
            label: String,
        }

        let bind = BindWithDefaults::new(|| Settings {
            retries: 3,
            label: "default".to_string(),
        });
        let mut ctx = RequestContext::new();

        let response = bind
            .process(&mut ctx, json_request(r#"{"label":"custom"}"#), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            ctx.get_extension::<Settings>(),
            Some(&Settings {
                retries: 3,
                label: "custom".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_defaults_survive_for_absent_query_fields() {
        let bind = BindWithDefaults::new(|| ListQuery { page: 1, per_page: 20 });
        let mut ctx = RequestContext::new();

        let _response = bind
            .process(&mut ctx, query_request("/items?page=4"), ok_handler())
            .await;

        assert_eq!(
            ctx.get_extension::<ListQuery>(),
            Some(&ListQuery { page: 4, per_page: 20 })
        );
    }

    #[tokio::test]
    async fn test_defaults_are_validated_after_merge() {
        #[derive(Debug, Deserialize, Serialize, Validate, PartialEq)]
        struct Settings {
            #[validate(range(min = 1))]
            retries: u32,
        }

        let bind = BindWithDefaults::with_config(
            || Settings { retries: 3 },
            BindConfig::respond(StatusCode::BAD_REQUEST).with_detail(),
        );
        let mut ctx = RequestContext::new();

        let response = bind
            .process(&mut ctx, json_request(r#"{"retries":0}"#), ok_handler())
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(response).await,
            r#"{"code":"validation_error","errors":[{"field":"retries","rule":"range"}]}"#
        );
    }

    #[test]
    fn test_merge_json_is_deep() {
        let mut base = json!({"a": {"x": 1, "y": 2}, "b": 1});
        merge_json(&mut base, json!({"a": {"y": 9}, "c": 3}));
        assert_eq!(base, json!({"a": {"x": 1, "y": 9}, "b": 1, "c": 3}));
    }

    #[test]
    fn test_merge_json_replaces_non_objects() {
        let mut base = json!({"a": [1, 2, 3]});
        merge_json(&mut base, json!({"a": [9]}));
        assert_eq!(base, json!({"a": [9]}));
    }
}
