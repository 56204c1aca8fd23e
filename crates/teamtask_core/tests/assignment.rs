mod common;

use common::{
    committed, done_task, forced_task, load_of, member, service, service_with, setup,
    team_with_project, OWNER,
};
use teamtask_core::{
    AssigneeChoice, AssigneeFilter, AssignmentOutcome, CreateTaskRequest, EngineConfig,
    TaskListQuery, TaskPriority, TaskStatus, WorkloadError,
};
use uuid::Uuid;

#[test]
fn suggestion_prefers_lowest_load() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let ana = member(&service, &team, "Ana", 5);
    let bo = member(&service, &team, "Bo", 5);
    forced_task(&service, &project, &ana, "a1", TaskPriority::Medium);

    let suggestion = service.suggest_assignee(team.id).unwrap();
    assert_eq!(suggestion.member_id, bo.id);
    assert_eq!(suggestion.current_tasks, 0);
}

#[test]
fn suggestion_breaks_load_ties_by_capacity() {
    let conn = setup();
    let service = service(&conn);
    let (team, _) = team_with_project(&service);
    member(&service, &team, "Small", 2);
    let large = member(&service, &team, "Large", 6);

    assert_eq!(service.suggest_assignee(team.id).unwrap().member_id, large.id);
}

#[test]
fn suggestion_skips_members_exactly_at_capacity() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let full = member(&service, &team, "Full", 1);
    let roomy = member(&service, &team, "Roomy", 4);
    forced_task(&service, &project, &full, "f1", TaskPriority::Low);
    for title in ["r1", "r2", "r3"] {
        forced_task(&service, &project, &roomy, title, TaskPriority::Low);
    }

    assert_eq!(service.suggest_assignee(team.id).unwrap().member_id, roomy.id);
}

#[test]
fn suggestion_fails_when_nobody_has_room() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);

    let empty = service.suggest_assignee(team.id).unwrap_err();
    assert!(matches!(empty, WorkloadError::NoAvailableMember(id) if id == team.id));

    let ana = member(&service, &team, "Ana", 1);
    forced_task(&service, &project, &ana, "a1", TaskPriority::High);
    let full = service.suggest_assignee(team.id).unwrap_err();
    assert!(matches!(full, WorkloadError::NoAvailableMember(_)));
}

#[test]
fn overcapacity_assignment_returns_warning_and_writes_nothing() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let ana = member(&service, &team, "Ana", 2);
    forced_task(&service, &project, &ana, "a1", TaskPriority::Low);
    forced_task(&service, &project, &ana, "a2", TaskPriority::Low);

    let request = CreateTaskRequest {
        assigned_to: AssigneeChoice::Member(ana.id),
        ..CreateTaskRequest::new(project.id, "one too many")
    };
    let outcome = service.create_task(OWNER, &request).unwrap();

    let AssignmentOutcome::Overcapacity(warning) = outcome else {
        panic!("expected overcapacity outcome");
    };
    assert_eq!(warning.member_id, ana.id);
    assert_eq!(warning.member_name, "Ana");
    assert_eq!(warning.current_tasks, 2);
    assert_eq!(warning.capacity, 2);
    assert_eq!(
        warning.warning,
        "Ana has 2 tasks but capacity is 2. Assign anyway?"
    );

    let all = service.list_tasks(&TaskListQuery::default()).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|task| task.title != "one too many"));
}

#[test]
fn assignment_with_room_commits_and_adds_one_to_load() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let ana = member(&service, &team, "Ana", 3);
    forced_task(&service, &project, &ana, "a1", TaskPriority::Low);
    assert_eq!(load_of(&service, &ana), 1);

    let request = CreateTaskRequest {
        assigned_to: AssigneeChoice::Member(ana.id),
        ..CreateTaskRequest::new(project.id, "a2")
    };
    let task = committed(service.create_task(OWNER, &request).unwrap());

    assert_eq!(task.assigned_to, Some(ana.id));
    assert_eq!(task.assignee_name.as_deref(), Some("Ana"));
    assert_eq!(load_of(&service, &ana), 2);
}

#[test]
fn forced_assignment_commits_past_capacity() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let ana = member(&service, &team, "Ana", 1);
    forced_task(&service, &project, &ana, "a1", TaskPriority::Low);

    let task = forced_task(&service, &project, &ana, "forced", TaskPriority::Medium);
    assert_eq!(task.assigned_to, Some(ana.id));
    assert_eq!(task.assignee_name.as_deref(), Some("Ana"));
    assert_eq!(load_of(&service, &ana), 2);
    assert!(service.member_load(ana.id).unwrap().is_overloaded);
}

#[test]
fn auto_assignment_uses_the_suggestion() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let ana = member(&service, &team, "Ana", 3);
    let bo = member(&service, &team, "Bo", 3);
    forced_task(&service, &project, &ana, "a1", TaskPriority::Low);

    let request = CreateTaskRequest {
        assigned_to: AssigneeChoice::Auto,
        priority: Some(TaskPriority::High),
        ..CreateTaskRequest::new(project.id, "auto")
    };
    let task = committed(service.create_task(OWNER, &request).unwrap());
    assert_eq!(task.assigned_to, Some(bo.id));
    assert_eq!(task.priority, TaskPriority::High);
    assert_eq!(load_of(&service, &bo), 1);
}

#[test]
fn auto_assignment_fails_when_team_is_full() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let ana = member(&service, &team, "Ana", 1);
    forced_task(&service, &project, &ana, "a1", TaskPriority::Low);

    let request = CreateTaskRequest {
        assigned_to: AssigneeChoice::Auto,
        ..CreateTaskRequest::new(project.id, "auto")
    };
    let err = service.create_task(OWNER, &request).unwrap_err();
    assert!(matches!(err, WorkloadError::NoAvailableMember(_)));
}

#[test]
fn unassigned_task_uses_configured_defaults() {
    let conn = setup();
    let config = EngineConfig {
        default_priority: TaskPriority::Low,
        ..EngineConfig::default()
    };
    let service = service_with(&conn, config);
    let (_, project) = team_with_project(&service);

    let request = CreateTaskRequest {
        description: Some("  ".to_string()),
        ..CreateTaskRequest::new(project.id, "  Write docs  ")
    };
    let task = committed(service.create_task(OWNER, &request).unwrap());
    assert_eq!(task.title, "Write docs");
    assert_eq!(task.description, None);
    assert_eq!(task.priority, TaskPriority::Low);
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.assigned_to, None);

    let unassigned = service
        .list_tasks(&TaskListQuery {
            project_id: Some(project.id),
            assignee: AssigneeFilter::Unassigned,
        })
        .unwrap();
    assert_eq!(unassigned.len(), 1);
}

#[test]
fn create_task_rejects_bad_requests() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let (other_team, _) = team_with_project(&service);
    let outsider = member(&service, &other_team, "Outsider", 5);
    member(&service, &team, "Ana", 5);

    let blank = service
        .create_task(OWNER, &CreateTaskRequest::new(project.id, "   "))
        .unwrap_err();
    assert!(matches!(blank, WorkloadError::Validation(_)));

    let missing_project = service
        .create_task(OWNER, &CreateTaskRequest::new(Uuid::new_v4(), "x"))
        .unwrap_err();
    assert!(matches!(
        missing_project,
        WorkloadError::NotFound {
            entity: "project",
            ..
        }
    ));

    let wrong_team = CreateTaskRequest {
        assigned_to: AssigneeChoice::Member(outsider.id),
        ..CreateTaskRequest::new(project.id, "x")
    };
    assert!(matches!(
        service.create_task(OWNER, &wrong_team).unwrap_err(),
        WorkloadError::Validation(_)
    ));

    let missing_member = CreateTaskRequest {
        assigned_to: AssigneeChoice::Member(Uuid::new_v4()),
        ..CreateTaskRequest::new(project.id, "x")
    };
    assert!(matches!(
        service.create_task(OWNER, &missing_member).unwrap_err(),
        WorkloadError::NotFound {
            entity: "member",
            ..
        }
    ));

    let foreign = service
        .create_task("intruder", &CreateTaskRequest::new(project.id, "x"))
        .unwrap_err();
    assert!(matches!(foreign, WorkloadError::NotAuthorized { .. }));

    assert!(service.list_tasks(&TaskListQuery::default()).unwrap().is_empty());
}

#[test]
fn add_member_enforces_capacity_bounds_and_ownership() {
    let conn = setup();
    let service = service(&conn);
    let (team, _) = team_with_project(&service);

    for capacity in [0, 51] {
        let err = service
            .add_member(OWNER, team.id, "Ana", "engineer", capacity)
            .unwrap_err();
        assert!(matches!(err, WorkloadError::Validation(_)));
    }
    assert!(service.add_member(OWNER, team.id, "Ana", "engineer", 50).is_ok());

    let foreign = service
        .add_member("intruder", team.id, "Bo", "engineer", 3)
        .unwrap_err();
    assert!(matches!(foreign, WorkloadError::NotAuthorized { .. }));

    let blank_role = service.add_member(OWNER, team.id, "Bo", " ", 3).unwrap_err();
    assert!(matches!(blank_role, WorkloadError::Validation(_)));
    assert_eq!(service.list_members(team.id).unwrap().len(), 1);
}

#[test]
fn list_teams_is_scoped_to_owner() {
    let conn = setup();
    let service = service(&conn);
    let (team, _) = team_with_project(&service);
    service.create_team("someone-else", "Other").unwrap();

    let teams = service.list_teams(OWNER).unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].id, team.id);
    assert_eq!(teams[0].owner, OWNER);
}

#[test]
fn assign_task_checks_capacity_unless_forced() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let ana = member(&service, &team, "Ana", 1);
    let bo = member(&service, &team, "Bo", 3);
    forced_task(&service, &project, &ana, "a1", TaskPriority::Low);
    let task = forced_task(&service, &project, &bo, "b1", TaskPriority::Low);

    let outcome = service.assign_task(OWNER, task.id, Some(ana.id), false).unwrap();
    assert!(matches!(outcome, AssignmentOutcome::Overcapacity(_)));
    assert_eq!(load_of(&service, &bo), 1);

    let forced = service.assign_task(OWNER, task.id, Some(ana.id), true).unwrap();
    assert_eq!(committed(forced).assigned_to, Some(ana.id));
    assert_eq!(load_of(&service, &ana), 2);
    assert_eq!(load_of(&service, &bo), 0);
}

#[test]
fn assign_task_to_current_assignee_is_a_no_op() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let ana = member(&service, &team, "Ana", 1);
    let task = forced_task(&service, &project, &ana, "a1", TaskPriority::Low);

    let outcome = service.assign_task(OWNER, task.id, Some(ana.id), false).unwrap();
    assert_eq!(committed(outcome).id, task.id);
    assert_eq!(load_of(&service, &ana), 1);
}

#[test]
fn done_tasks_move_without_a_capacity_check() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let ana = member(&service, &team, "Ana", 1);
    let bo = member(&service, &team, "Bo", 1);
    forced_task(&service, &project, &ana, "a1", TaskPriority::Low);
    let done = done_task(&service, &project, &bo, "shipped");

    let outcome = service.assign_task(OWNER, done.id, Some(ana.id), false).unwrap();
    assert_eq!(committed(outcome).assigned_to, Some(ana.id));
    assert_eq!(load_of(&service, &ana), 1);
}

#[test]
fn unassigning_releases_load() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let ana = member(&service, &team, "Ana", 2);
    let task = forced_task(&service, &project, &ana, "a1", TaskPriority::Low);

    let outcome = service.assign_task(OWNER, task.id, None, false).unwrap();
    assert_eq!(committed(outcome).assigned_to, None);
    assert_eq!(load_of(&service, &ana), 0);
}

#[test]
fn deleting_a_task_releases_load() {
    let conn = setup();
    let service = service(&conn);
    let (team, project) = team_with_project(&service);
    let ana = member(&service, &team, "Ana", 2);
    let task = forced_task(&service, &project, &ana, "a1", TaskPriority::Low);

    assert!(matches!(
        service.delete_task("intruder", task.id).unwrap_err(),
        WorkloadError::NotAuthorized { .. }
    ));
    service.delete_task(OWNER, task.id).unwrap();
    assert_eq!(load_of(&service, &ana), 0);
    assert!(matches!(
        service.delete_task(OWNER, task.id).unwrap_err(),
        WorkloadError::NotFound { entity: "task", .. }
    ));
}
