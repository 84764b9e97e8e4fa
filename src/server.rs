use crate::data::{ExamRequest, IlpConfig, RoomAssignment, RoomRecord, ScheduledExam};
use crate::pipeline::RoomAssigner;
use crate::scheduler;
use crate::timetable::{self, RawTimetable};
use axum::{Json, Router, routing::post};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleInput {
    requests: Vec<ExamRequest>,
    timetable: RawTimetable,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignInput {
    exams: Vec<ScheduledExam>,
    rooms: Vec<RoomRecord>,
    #[serde(default = "default_use_ilp")]
    use_ilp: bool,
    #[serde(default)]
    config: IlpConfig,
}

fn default_use_ilp() -> bool {
    true
}

async fn schedule_handler(Json(input): Json<ScheduleInput>) -> Json<Vec<ScheduledExam>> {
    let mut timetable = timetable::load(&input.timetable);
    Json(scheduler::schedule_all(&input.requests, &mut timetable))
}

async fn assign_handler(Json(input): Json<AssignInput>) -> Json<Vec<RoomAssignment>> {
    let assigner = RoomAssigner::new(input.rooms)
        .with_ilp(input.use_ilp)
        .with_config(input.config);
    Json(assigner.assign_rooms(&input.exams))
}

pub async fn run_server() {
    let app = Router::new()
        .route("/v1/exams/schedule", post(schedule_handler))
        .route("/v1/rooms/assign", post(assign_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080")
        .await
        .unwrap();

    println!("Server running at http://{}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
