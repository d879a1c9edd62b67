use super::*;

#[test]
fn thread_runner_delivers_value() {
    let (done, result) = completion::<u32>();
    let caller = std::thread::current().id();
    ThreadRunner
        .spawn(
            "test-job",
            Box::new(move || {
                assert_ne!(std::thread::current().id(), caller);
                assert_eq!(std::thread::current().name(), Some("test-job"));
                done.complete(7);
            }),
        )
        .unwrap();

    assert!(matches!(
        result.wait(Duration::from_secs(5)),
        TaskStatus::Ready(7)
    ));
    assert!(matches!(result.try_take(), TaskStatus::Abandoned));
}

#[test]
fn pending_until_completed() {
    let (done, result) = completion::<&'static str>();
    assert!(matches!(result.try_take(), TaskStatus::Pending));
    assert!(matches!(
        result.wait(Duration::from_millis(10)),
        TaskStatus::Pending
    ));
    done.complete("ok");
    assert!(matches!(result.try_take(), TaskStatus::Ready("ok")));
}

#[test]
fn dropped_completer_is_abandoned() {
    let (done, result) = completion::<()>();
    drop(done);
    assert!(matches!(result.try_take(), TaskStatus::Abandoned));
}
