//! In-memory user roster.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::evaluation::{RosterScope, SquadScope, StudentProfile};
use crate::domain::foundation::{DomainError, StudentId, UserId};
use crate::ports::{IdentityResolver, StudentDirectory};

/// Student roster kept in memory; resolves identities and lists squads.
#[derive(Default)]
pub struct InMemoryStudentDirectory {
    students: RwLock<Vec<(UserId, StudentProfile)>>,
}

impl InMemoryStudentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_student(mut self, user_id: UserId, profile: StudentProfile) -> Self {
        self.students.get_mut().push((user_id, profile));
        self
    }

    pub async fn add_student(&self, user_id: UserId, profile: StudentProfile) {
        self.students.write().await.push((user_id, profile));
    }
}

#[async_trait]
impl IdentityResolver for InMemoryStudentDirectory {
    async fn resolve(&self, student_id: &StudentId) -> Result<Option<UserId>, DomainError> {
        Ok(self
            .students
            .read()
            .await
            .iter()
            .find(|(_, p)| &p.student_id == student_id)
            .map(|(id, _)| *id))
    }
}

#[async_trait]
impl StudentDirectory for InMemoryStudentDirectory {
    async fn find_students(&self, scope: &RosterScope) -> Result<Vec<StudentProfile>, DomainError> {
        Ok(self
            .students
            .read()
            .await
            .iter()
            .filter(|(_, p)| scope.contains(p))
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn squad_members(&self, scope: &SquadScope) -> Result<Vec<UserId>, DomainError> {
        Ok(self
            .students
            .read()
            .await
            .iter()
            .filter(|(_, p)| scope.contains(p))
            .map(|(id, _)| *id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(student_id: &str, squad: &str) -> StudentProfile {
        StudentProfile {
            student_id: StudentId::new(student_id).unwrap(),
            name: format!("学生{}", student_id),
            department: "计算机学院".into(),
            major: "软件工程".into(),
            squad: squad.into(),
            class_id: None,
        }
    }

    fn directory() -> InMemoryStudentDirectory {
        InMemoryStudentDirectory::new()
            .with_student(UserId::new(42).unwrap(), profile("2021001", "一中队"))
            .with_student(UserId::new(43).unwrap(), profile("2021002", "二中队"))
    }

    #[tokio::test]
    async fn resolves_known_student_numbers() {
        let dir = directory();
        let id = dir.resolve(&StudentId::new("2021001").unwrap()).await.unwrap();
        assert_eq!(id, Some(UserId::new(42).unwrap()));

        let unknown = dir.resolve(&StudentId::new("9999").unwrap()).await.unwrap();
        assert_eq!(unknown, None);
    }

    #[tokio::test]
    async fn lists_squad_members() {
        let dir = directory();
        let scope = SquadScope {
            department: "计算机学院".into(),
            squad: "二中队".into(),
        };
        assert_eq!(dir.squad_members(&scope).await.unwrap(), vec![UserId::new(43).unwrap()]);
    }

    #[tokio::test]
    async fn finds_students_by_department() {
        let dir = directory();
        let scope = RosterScope {
            department: "计算机学院".into(),
            squad: None,
            major: None,
        };
        assert_eq!(dir.find_students(&scope).await.unwrap().len(), 2);
    }
}
