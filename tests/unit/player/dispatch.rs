use std::sync::Mutex;

use super::*;

#[test]
fn tasks_run_on_owner_in_order() {
    let queue = UiQueue::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let owner = std::thread::current().id();

    let d = queue.dispatcher();
    let worker_seen = seen.clone();
    std::thread::spawn(move || {
        for i in 0..5 {
            let s = worker_seen.clone();
            d.dispatch(Box::new(move || {
                assert_eq!(std::thread::current().id(), owner);
                s.lock().unwrap().push(i);
            }));
        }
    })
    .join()
    .unwrap();

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(queue.run_pending(), 5);
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    assert_eq!(queue.run_pending(), 0);
}

#[test]
fn run_for_waits_for_late_tasks() {
    let queue = UiQueue::new();
    let d = queue.dispatcher();
    let hit = Arc::new(Mutex::new(false));
    let h = hit.clone();
    let worker = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        d.dispatch(Box::new(move || *h.lock().unwrap() = true));
    });

    let n = queue.run_for(Duration::from_millis(500));
    worker.join().unwrap();
    assert_eq!(n, 1);
    assert!(*hit.lock().unwrap());
}

#[test]
fn dispatch_after_queue_dropped_is_ignored() {
    let queue = UiQueue::new();
    let d = queue.dispatcher();
    drop(queue);
    d.dispatch(Box::new(|| panic!("must not run")));
}
