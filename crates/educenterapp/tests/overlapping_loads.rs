//! Two list loads in flight at once, answered in reverse order.

use async_trait::async_trait;
use educenterapp::error::{EduError, Result};
use educenterapp::model::{EntityId, Student};
use educenterapp::predicate::Predicate;
use educenterapp::resource::Resource;
use educenterapp::sync::{ListSynchronizer, LoadOutcome, ResponseOrdering};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tokio::sync::oneshot;
use tokio::task::{spawn_local, yield_now, LocalSet};

/// Holds every query open until the test releases it, keyed by the `lastName` term.
#[derive(Default)]
struct GatedResource {
    gates: RefCell<HashMap<String, oneshot::Receiver<Vec<Student>>>>,
    waiting: RefCell<Vec<String>>,
}

impl GatedResource {
    fn gate(&self, term: &str) -> oneshot::Sender<Vec<Student>> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(term.to_string(), rx);
        tx
    }

    fn waiting(&self) -> usize {
        self.waiting.borrow().len()
    }
}

#[async_trait(?Send)]
impl Resource<Student> for GatedResource {
    async fn query(&self, predicate: Option<&Predicate>) -> Result<Vec<Student>> {
        let term = predicate
            .and_then(|p| p.get("lastName"))
            .unwrap_or_default()
            .to_string();
        let gate = self
            .gates
            .borrow_mut()
            .remove(&term)
            .ok_or_else(|| EduError::Store(format!("no gate for {term:?}")))?;
        self.waiting.borrow_mut().push(term);
        gate.await
            .map_err(|_| EduError::Store("gate dropped".to_string()))
    }

    async fn get(&self, id: EntityId) -> Result<Student> {
        Err(EduError::NotFound {
            entity: "student",
            id,
        })
    }

    async fn update(&self, record: &Student) -> Result<Student> {
        Ok(record.clone())
    }

    async fn delete(&self, _id: EntityId) -> Result<()> {
        Ok(())
    }
}

fn named(last: &str) -> Student {
    Student::new("X", last, "x@example.com")
}

async fn wait_for(resource: &GatedResource, count: usize) {
    while resource.waiting() < count {
        yield_now().await;
    }
}

/// Issues A then B, answers B then A, and returns both outcomes plus the final rows.
async fn race(ordering: ResponseOrdering) -> (LoadOutcome, LoadOutcome, Vec<String>) {
    let resource = GatedResource::default();
    let release_a = resource.gate("Iv");
    let release_b = resource.gate("Pe");
    let sync = Rc::new(ListSynchronizer::new(resource, ordering));

    let first = spawn_local({
        let sync = Rc::clone(&sync);
        async move {
            sync.load_all(Some(Predicate::new().with("lastName", "Iv")))
                .await
        }
    });
    wait_for(sync.resource(), 1).await;

    let second = spawn_local({
        let sync = Rc::clone(&sync);
        async move {
            sync.load_all(Some(Predicate::new().with("lastName", "Pe")))
                .await
        }
    });
    wait_for(sync.resource(), 2).await;

    release_b.send(vec![named("Petrov")]).unwrap();
    let b = second.await.unwrap().unwrap();
    release_a.send(vec![named("Ivanov"), named("Ivanova")]).unwrap();
    let a = first.await.unwrap().unwrap();

    let rows = sync
        .rows()
        .iter()
        .filter_map(|s| s.last_name.clone())
        .collect();
    (a, b, rows)
}

#[tokio::test]
async fn test_latest_applied_discards_stale_response() {
    let local = LocalSet::new();
    let (a, b, rows) = local.run_until(race(ResponseOrdering::LatestApplied)).await;

    assert_eq!(b, LoadOutcome::Applied { rows: 1 });
    assert_eq!(a, LoadOutcome::Discarded);
    assert_eq!(rows, vec!["Petrov"]);
}

#[tokio::test]
async fn test_arrival_order_lets_stale_response_win() {
    let local = LocalSet::new();
    let (a, b, rows) = local.run_until(race(ResponseOrdering::ArrivalOrder)).await;

    assert_eq!(b, LoadOutcome::Applied { rows: 1 });
    assert_eq!(a, LoadOutcome::Applied { rows: 2 });
    assert_eq!(rows, vec!["Ivanov", "Ivanova"]);
}

#[tokio::test]
async fn test_active_predicate_is_latest_issued() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let resource = GatedResource::default();
            let release = resource.gate("Pe");
            let sync = Rc::new(ListSynchronizer::new(resource, ResponseOrdering::default()));

            let pending = spawn_local({
                let sync = Rc::clone(&sync);
                async move {
                    sync.load_all(Some(Predicate::new().with("lastName", "Pe")))
                        .await
                }
            });
            wait_for(sync.resource(), 1).await;
            assert_eq!(
                sync.active_predicate(),
                Some(Predicate::new().with("lastName", "Pe"))
            );

            release.send(vec![]).unwrap();
            assert_eq!(
                pending.await.unwrap().unwrap(),
                LoadOutcome::Applied { rows: 0 }
            );
            assert!(sync.rows().is_empty());
        })
        .await;
}
