mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{counter, echo_consumer, PersistSpy};
use serde_json::json;
use statehost::{
    consumer, Action, ActionTableDraft, Completion, DispatchError, Factory, FactoryOptions,
    HandlerError, Mapping, Payload, Value,
};

#[tokio::test]
async fn incr_then_read_back() {
    let component = counter(FactoryOptions::default());
    let mounted = component.mount(Mapping::new()).unwrap();

    let result = mounted
        .dispatch("INCR", json!({ "amount": 5 }))
        .await
        .unwrap();
    assert_eq!(result, Value::from(5));
    assert_eq!(mounted.state().get("count"), Some(&Value::from(5)));
    // Mount render plus the one triggered by set_state.
    assert_eq!(mounted.render_count(), 2);
}

/// Walks one handler through every accessor, then unmounts from inside it.
async fn full_walkthrough(options: FactoryOptions) {
    let spy = PersistSpy::new();
    let observed_persists = Arc::new(AtomicUsize::new(usize::MAX));
    let handler_spy = spy.clone();
    let observed = observed_persists.clone();

    let test_action = Action::from_async(move |ctx| {
        let spy = handler_spy.clone();
        let observed = observed.clone();
        async move {
            observed.store(spy.calls(), Ordering::SeqCst);

            let value = ctx.props("value").await?;
            assert_eq!(value, Value::from(5));

            let count = ctx.state("count").await?.as_i64().unwrap_or(0);
            let step = ctx.arg("value").as_i64().unwrap_or(0);
            ctx.set_state(Mapping::new().with("count", count + step))
                .await?;
            assert_eq!(ctx.state("count").await?, Value::from(5));

            ctx.force_update().await?;

            let nested = ctx.dispatch.dispatch("INVALID_NAME", ()).await;
            assert!(matches!(nested, Err(DispatchError::UnknownAction { .. })));
            Ok::<_, DispatchError>(Value::from("finished"))
        }
    });

    let view = consumer(|props| {
        Value::from(json!({
            "h1": props.state("count").to_json(),
            "value": props.prop("value").to_json(),
        }))
    });
    let component = Factory::build(
        Mapping::new().with("count", 0),
        ActionTableDraft::new().on("TEST", test_action),
        Some(view),
        options.clone(),
    )
    .unwrap();
    assert_eq!(component.dispatch().is_some(), options.singleton);

    let mounted = component.mount(Mapping::new().with("value", 5)).unwrap();
    let payload = Payload::new(json!({ "value": 5 })).with_persist(spy.clone());
    let result = mounted.dispatch("TEST", payload).await.unwrap();

    assert_eq!(result, Value::from("finished"));
    assert_eq!(spy.calls(), 1);
    assert_eq!(observed_persists.load(Ordering::SeqCst), 1);
    assert_eq!(mounted.rendered().get("h1"), Some(Value::from(5)));

    // Accessors obtained before unmount stop working afterwards.
    let handle = mounted.dispatch_handle();
    mounted.unmount();
    let err = handle
        .dispatch("TEST", json!({ "value": 5 }))
        .await
        .unwrap_err();
    assert!(err.is_unmounted());
}

#[tokio::test]
async fn walkthrough_per_instance() {
    full_walkthrough(FactoryOptions::default()).await;
}

#[tokio::test]
async fn walkthrough_singleton() {
    full_walkthrough(FactoryOptions::singleton()).await;
}

#[tokio::test]
async fn persist_runs_once_even_when_handler_fails() {
    let spy = PersistSpy::new();
    let component = Factory::build(
        Mapping::new(),
        ActionTableDraft::new().on(
            "FAIL",
            Action::new(|_| Err(HandlerError::new("rejected by handler"))),
        ),
        Some(echo_consumer()),
        FactoryOptions::default(),
    )
    .unwrap();
    let mounted = component.mount(Mapping::new()).unwrap();

    let err = mounted
        .dispatch("FAIL", Payload::new(Value::Null).with_persist(spy.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Handler(_)));
    assert_eq!(err.to_string(), "rejected by handler");
    assert_eq!(spy.calls(), 1);
}

#[tokio::test]
async fn handler_can_chain_into_another_action() {
    let component = Factory::build(
        Mapping::new().with("count", 0),
        ActionTableDraft::new()
            .on("INCR", common::incr_action())
            .on(
                "DOUBLE_INCR",
                Action::from_async(|ctx| async move {
                    ctx.dispatch.dispatch("INCR", ctx.payload.clone()).await?;
                    ctx.dispatch.dispatch("INCR", ctx.payload.clone()).await
                }),
            ),
        Some(echo_consumer()),
        FactoryOptions::default(),
    )
    .unwrap();
    let mounted = component.mount(Mapping::new()).unwrap();

    let result = mounted
        .dispatch("DOUBLE_INCR", json!({ "amount": 3 }))
        .await
        .unwrap();
    assert_eq!(result, Value::from(6));
}

#[tokio::test]
async fn sync_handler_value_resolves_immediately() {
    let component = Factory::build(
        Mapping::new(),
        ActionTableDraft::new().on(
            "PING",
            Action::new(|ctx| Ok(Completion::Value(ctx.arg("msg")))),
        ),
        Some(echo_consumer()),
        FactoryOptions::default(),
    )
    .unwrap();
    let mounted = component.mount(Mapping::new()).unwrap();
    let result = mounted
        .dispatch("PING", json!({ "msg": "pong" }))
        .await
        .unwrap();
    assert_eq!(result, Value::from("pong"));
}

#[tokio::test]
async fn cloned_reads_are_mutation_safe() {
    let component = Factory::build(
        json!({ "todos": [{ "done": false }] }),
        ActionTableDraft::new()
            .on(
                "PEEK_CLONED",
                Action::from_async(|ctx| async move {
                    let todos = ctx.state_cloned("todos").await?;
                    todos.at(0).unwrap().set("done", true);
                    ctx.state("todos").await
                }),
            )
            .on(
                "PEEK_ALIAS",
                Action::from_async(|ctx| async move {
                    let todos = ctx.state("todos").await?;
                    todos.at(0).unwrap().set("done", true);
                    ctx.state("todos").await
                }),
            ),
        Some(echo_consumer()),
        FactoryOptions::default(),
    )
    .unwrap();
    let mounted = component.mount(Mapping::new()).unwrap();

    let todos = mounted.dispatch("PEEK_CLONED", ()).await.unwrap();
    assert_eq!(todos.at(0).unwrap().get("done"), Some(Value::from(false)));

    let todos = mounted.dispatch("PEEK_ALIAS", ()).await.unwrap();
    assert_eq!(todos.at(0).unwrap().get("done"), Some(Value::from(true)));
}

#[tokio::test]
async fn updater_function_merges_from_current_state() {
    let component = Factory::build(
        Mapping::new().with("count", 1),
        ActionTableDraft::new().on(
            "BUMP",
            Action::from_async(|ctx| async move {
                ctx.set_state(statehost::StateUpdate::updater(|state, props| {
                    let count = state.get("count")?.as_i64()?;
                    let step = props.get("step")?.as_i64()?;
                    Some(Mapping::new().with("count", count + step))
                }))
                .await?;
                ctx.state("count").await
            }),
        ),
        Some(echo_consumer()),
        FactoryOptions::default(),
    )
    .unwrap();
    let mounted = component.mount(Mapping::new().with("step", 10)).unwrap();
    assert_eq!(
        mounted.dispatch("BUMP", ()).await.unwrap(),
        Value::from(11)
    );
}

/// Yields until `done` holds or the scheduler has had plenty of turns.
async fn yield_until(done: impl Fn() -> bool) {
    for _ in 0..100 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn fire_and_forget_dispatch_completes() {
    let spy = PersistSpy::new();
    let component = counter(FactoryOptions::singleton());
    let mounted = component.mount(Mapping::new()).unwrap();

    let payload = Payload::new(json!({ "amount": 5 })).with_persist(spy.clone());
    drop(component.dispatch().unwrap().dispatch("INCR", payload));

    yield_until(|| mounted.state().get("count") == Some(&Value::from(5))).await;
    assert_eq!(mounted.state().get("count"), Some(&Value::from(5)));
    assert_eq!(spy.calls(), 1);
}

#[tokio::test]
async fn consumer_dispatches_while_rendering() {
    let view = consumer(|props| {
        if props.state("count") == Value::from(0) {
            drop(props.provided.dispatch.dispatch("INCR", json!({ "amount": 2 })));
        }
        props.to_value()
    });
    let component = Factory::build(
        Mapping::new().with("count", 0),
        ActionTableDraft::new().on("INCR", common::incr_action()),
        Some(view),
        FactoryOptions::default(),
    )
    .unwrap();
    let mounted = component.mount(Mapping::new()).unwrap();

    yield_until(|| mounted.state().get("count") == Some(&Value::from(2))).await;
    assert_eq!(mounted.state().get("count"), Some(&Value::from(2)));
    assert_eq!(mounted.render_count(), 2);
}
