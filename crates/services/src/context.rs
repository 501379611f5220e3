use quiz_core::model::StudentId;

/// Request header carrying the authenticated student id between client and server.
pub const STUDENT_ID_HEADER: &str = "x-student-id";

/// The authenticated caller, resolved by the identity layer and passed
/// explicitly into every service call that reads or writes per-student state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StudentContext {
    student_id: StudentId,
}

impl StudentContext {
    #[must_use]
    pub fn new(student_id: StudentId) -> Self {
        Self { student_id }
    }

    #[must_use]
    pub fn student_id(&self) -> StudentId {
        self.student_id
    }
}
