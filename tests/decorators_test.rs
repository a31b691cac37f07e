//! Integration tests for the request decorators.
//!
//! Each test wraps a trivial handler the way a plugin would and drives it
//! through a recording response starter.

use std::sync::Arc;

use parking_lot::Mutex;
use tiddlyweb_utils::{
    do_html, entitle, handler_fn, require_any_user, require_role, Body, Environ, Error, Method,
    Middleware, Phase, Pipeline, ResponseHead, Usersign, HTML_CONTENT_TYPE,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn environ() -> Environ {
    Environ::new(Method::Get, "/")
}

fn returns_one() -> tiddlyweb_utils::BoxHandler {
    handler_fn(|_, _| Ok(Body::from("1")))
}

#[test]
fn entitle_sets_title() {
    init_tracing();
    let app = entitle("monkey").wrap(handler_fn(|_, _| Ok(Body::Empty)));
    let mut environ = environ();

    assert!(environ.title().is_none());

    app.call(&mut environ, &mut ResponseHead::default()).unwrap();

    assert_eq!(environ.title(), Some("monkey"));
}

#[test]
fn do_html_starts_ok_html_response() {
    init_tracing();
    let app = do_html().wrap(handler_fn(|_, _| Ok(Body::Empty)));
    let mut head = ResponseHead::default();

    assert!(head.status().is_none());

    app.call(&mut environ(), &mut head).unwrap();

    assert_eq!(head.status(), Some("200 OK"));
    assert!(head.contains("Content-Type", HTML_CONTENT_TYPE));
}

#[test]
fn do_html_works_with_a_closure_starter() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = do_html().wrap(handler_fn(|_, start_response| {
        start_response.start(
            "404 Not Found",
            vec![
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("Cache-Control".to_string(), "no-cache".to_string()),
            ],
        );
        Ok(Body::from("<p>missing</p>"))
    }));

    let log = Arc::clone(&seen);
    let mut starter = move |status: &str, headers: Vec<(String, String)>| {
        log.lock().push((status.to_string(), headers));
    };
    let body = app.call(&mut environ(), &mut starter).unwrap();

    assert_eq!(body.into_string(), "<p>missing</p>");
    let calls = seen.lock();
    assert_eq!(calls.len(), 1);
    let (status, headers) = &calls[0];
    assert_eq!(status, "200 OK");
    assert_eq!(
        headers,
        &vec![
            ("Cache-Control".to_string(), "no-cache".to_string()),
            ("Content-Type".to_string(), HTML_CONTENT_TYPE.to_string()),
        ]
    );
}

#[test]
fn require_role_checks_roles() {
    init_tracing();
    let app = require_role("ADMIN").wrap(returns_one());
    let mut environ = environ();
    let mut head = ResponseHead::default();

    let err = app.call(&mut environ, &mut head).unwrap_err();
    assert_eq!(err.to_string(), "insufficient permissions");

    environ.set_usersign(Some(Usersign {
        name: None,
        roles: Some(Vec::new()),
    }));
    assert!(matches!(
        app.call(&mut environ, &mut head),
        Err(Error::UserRequired(_))
    ));

    environ.set_usersign(Some(Usersign::default().with_roles(["fan"])));
    assert!(matches!(
        app.call(&mut environ, &mut head),
        Err(Error::UserRequired(_))
    ));

    environ.set_usersign(Some(Usersign::default().with_roles(["ADMIN"])));
    let output = app.call(&mut environ, &mut head).unwrap();
    assert_eq!(output.into_string(), "1");
}

#[test]
fn require_any_user_rejects_guest() {
    init_tracing();
    let app = require_any_user().wrap(returns_one());
    let mut environ = environ();
    let mut head = ResponseHead::default();

    let err = app.call(&mut environ, &mut head).unwrap_err();
    assert_eq!(err.to_string(), "user must be logged in");

    environ.set_usersign(Some(Usersign::guest()));
    assert!(matches!(
        app.call(&mut environ, &mut head),
        Err(Error::UserRequired(_))
    ));

    environ.set_usersign(Some(Usersign::named("monkey!")));
    let output = app.call(&mut environ, &mut head).unwrap();
    assert_eq!(output.into_string(), "1");
}

#[test]
fn guard_failure_skips_title_and_handler() {
    init_tracing();
    let ran = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&ran);
    let app = Pipeline::new()
        .layer(entitle("Admin"))
        .layer(require_role("ADMIN"))
        .build(handler_fn(move |_, _| {
            *flag.lock() = true;
            Ok(Body::Empty)
        }));
    let mut environ = environ().with_usersign(Usersign::named("fan"));

    assert!(app.call(&mut environ, &mut ResponseHead::default()).is_err());

    assert!(!*ran.lock());
    assert!(environ.title().is_none());
}

#[test]
fn lazy_output_is_forced_before_title_and_kept_whole() {
    init_tracing();
    let produced = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&produced);
    let app = entitle("Stream").wrap(handler_fn(move |_, _| {
        let counter = Arc::clone(&counter);
        Ok(Body::lazy(["a", "b", "c"].into_iter().map(move |chunk| {
            *counter.lock() += 1;
            chunk.to_string()
        })))
    }));
    let mut environ = environ();

    let body = app.call(&mut environ, &mut ResponseHead::default()).unwrap();

    assert_eq!(*produced.lock(), 1);
    assert_eq!(environ.title(), Some("Stream"));
    assert_eq!(body.into_chunks(), vec!["a", "b", "c"]);
    assert_eq!(*produced.lock(), 3);
}

#[test]
fn pipeline_reports_phases_outermost_first() {
    let pipeline = Pipeline::new()
        .layer(do_html())
        .layer(entitle("Home"))
        .layer(require_any_user());

    assert_eq!(
        pipeline.phases(),
        vec![Phase::After, Phase::After, Phase::Before]
    );
}
