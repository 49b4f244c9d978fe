//! In-memory student records with a small CRUD API under `/api/students`.

use axum::{extract::{Path, State}, http::StatusCode, routing::{get, put}, Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type StudentId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInput {
    pub name: String,
    pub age: i64,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub age: i64,
    pub grade: String,
}

impl Student {
    fn from_input(id: StudentId, input: StudentInput) -> Self {
        Self { id, name: input.name, age: input.age, grade: input.grade }
    }
}

struct Inner {
    students: Vec<Student>,
    next_id: StudentId,
}

/// Ids start at 1 and are never reused, even after a delete.
pub struct StudentStore {
    inner: RwLock<Inner>,
}

impl Default for StudentStore {
    fn default() -> Self {
        Self { inner: RwLock::new(Inner { students: Vec::new(), next_id: 1 }) }
    }
}

impl StudentStore {
    pub fn new() -> Self { Self::default() }

    pub fn list(&self) -> Vec<Student> {
        self.inner.read().students.clone()
    }

    pub fn create(&self, input: StudentInput) -> Student {
        let mut inner = self.inner.write();
        let student = Student::from_input(inner.next_id, input);
        inner.next_id += 1;
        inner.students.push(student.clone());
        student
    }

    pub fn update(&self, id: StudentId, input: StudentInput) -> Option<Student> {
        let mut inner = self.inner.write();
        let slot = inner.students.iter_mut().find(|s| s.id == id)?;
        *slot = Student::from_input(id, input);
        Some(slot.clone())
    }

    pub fn delete(&self, id: StudentId) -> bool {
        let mut inner = self.inner.write();
        match inner.students.iter().position(|s| s.id == id) {
            Some(pos) => {
                inner.students.remove(pos);
                true
            }
            None => false,
        }
    }
}

pub fn router(store: Arc<StudentStore>) -> Router {
    Router::new()
        .route("/api/students", get(list_students).post(create_student))
        .route("/api/students/:student_id", put(update_student).delete(delete_student))
        .with_state(store)
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Student not found".into())
}

async fn list_students(State(store): State<Arc<StudentStore>>) -> Json<Vec<Student>> {
    Json(store.list())
}

async fn create_student(State(store): State<Arc<StudentStore>>, Json(input): Json<StudentInput>) -> (StatusCode, Json<Student>) {
    let student = store.create(input);
    tracing::debug!(id = student.id, "created student");
    (StatusCode::CREATED, Json(student))
}

async fn update_student(
    State(store): State<Arc<StudentStore>>,
    Path(student_id): Path<StudentId>,
    Json(input): Json<StudentInput>,
) -> Result<Json<Student>, (StatusCode, String)> {
    store.update(student_id, input).map(Json).ok_or_else(not_found)
}

async fn delete_student(State(store): State<Arc<StudentStore>>, Path(student_id): Path<StudentId>) -> Result<StatusCode, (StatusCode, String)> {
    if store.delete(student_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}
