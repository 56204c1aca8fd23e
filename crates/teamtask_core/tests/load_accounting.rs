mod common;

use common::{done_task, forced_task, member, service, setup, team_with_project, OWNER};
use teamtask_core::service::load::count_member_load;
use teamtask_core::{SqliteStore, TaskPriority, TaskStatus, WorkloadError};
use uuid::Uuid;

#[test]
fn count_ignores_done_tasks_and_other_members() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let ana = member(&service, &team, "Ana", 5);
    let bo = member(&service, &team, "Bo", 5);

    forced_task(&service, &project, &ana, "open one", TaskPriority::Low);
    let in_progress = forced_task(&service, &project, &ana, "open two", TaskPriority::High);
    service
        .update_task_status(OWNER, in_progress.id, TaskStatus::InProgress)
        .unwrap();
    done_task(&service, &project, &ana, "shipped");
    forced_task(&service, &project, &bo, "not ana's", TaskPriority::Medium);

    let store = SqliteStore::new(&conn);
    assert_eq!(count_member_load(&store, ana.id).unwrap(), 2);
    assert_eq!(count_member_load(&store, bo.id).unwrap(), 1);
}

#[test]
fn completing_a_task_frees_capacity() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let ana = member(&service, &team, "Ana", 1);
    let task = forced_task(&service, &project, &ana, "only", TaskPriority::Medium);
    assert!(service.member_load(ana.id).unwrap().is_at_capacity());

    service
        .update_task_status(OWNER, task.id, TaskStatus::Done)
        .unwrap();

    let load = service.member_load(ana.id).unwrap();
    assert_eq!(load.current_tasks, 0);
    assert!(!load.is_at_capacity());
}

#[test]
fn snapshot_orders_by_load_and_keeps_insertion_order_on_ties() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let busy = member(&service, &team, "Busy", 3);
    let idle_first = member(&service, &team, "IdleFirst", 3);
    let idle_second = member(&service, &team, "IdleSecond", 3);
    let one = member(&service, &team, "One", 3);

    forced_task(&service, &project, &busy, "b1", TaskPriority::Low);
    forced_task(&service, &project, &busy, "b2", TaskPriority::Low);
    forced_task(&service, &project, &one, "o1", TaskPriority::Low);

    let snapshot = service.team_load(team.id).unwrap();
    let order: Vec<_> = snapshot.iter().map(|load| load.member_id).collect();
    assert_eq!(order, vec![idle_first.id, idle_second.id, one.id, busy.id]);
    let counts: Vec<_> = snapshot.iter().map(|load| load.current_tasks).collect();
    assert_eq!(counts, vec![0, 0, 1, 2]);
}

#[test]
fn overloaded_flag_means_strictly_over_capacity() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let full = member(&service, &team, "Full", 2);
    let over = member(&service, &team, "Over", 1);

    forced_task(&service, &project, &full, "f1", TaskPriority::Low);
    forced_task(&service, &project, &full, "f2", TaskPriority::Low);
    forced_task(&service, &project, &over, "o1", TaskPriority::Low);
    forced_task(&service, &project, &over, "o2", TaskPriority::Low);

    for load in service.team_load(team.id).unwrap() {
        assert_eq!(load.is_overloaded, load.current_tasks > load.capacity);
        assert!(load.is_at_capacity());
    }
    let over_load = service.member_load(over.id).unwrap();
    assert!(over_load.is_overloaded);
    let full_load = service.member_load(full.id).unwrap();
    assert!(!full_load.is_overloaded);
}

#[test]
fn snapshot_of_missing_team_is_not_found() {
    let conn = setup();
    let service = service(&conn);

    let err = service.team_load(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, WorkloadError::NotFound { entity: "team", .. }));
    assert!(err.is_client_error());
}

#[test]
fn snapshot_serializes_with_camel_case_fields() {
    let conn = setup();
    let service = service(&conn);
    let (team, _) = team_with_project(&service);
    member(&service, &team, "Ana", 4);

    let json = serde_json::to_value(service.team_load(team.id).unwrap()).unwrap();
    assert_eq!(json[0]["name"], "Ana");
    assert_eq!(json[0]["currentTasks"], 0);
    assert_eq!(json[0]["capacity"], 4);
    assert_eq!(json[0]["isOverloaded"], false);
}
