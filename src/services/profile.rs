use rand::{Rng, distr::Alphanumeric};
use uuid::Uuid;

use crate::database::models::{
    CreateUserInput, CreateUserResponse, Department, DepartmentInput, UpdateProfileInput, User,
};
use crate::database::repositories::{DepartmentRepository, UserRepository};
use crate::error::AppError;
use crate::services::auth::{MIN_PASSWORD_LENGTH, hash_password};

const TEMPORARY_PASSWORD_LENGTH: usize = 12;

fn generate_temporary_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TEMPORARY_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

/// Users and departments.
#[derive(Clone)]
pub struct ProfileService {
    user_repository: UserRepository,
    department_repository: DepartmentRepository,
}

impl ProfileService {
    pub fn new(user_repository: UserRepository, department_repository: DepartmentRepository) -> Self {
        Self {
            user_repository,
            department_repository,
        }
    }

    pub async fn create_user(&self, input: CreateUserInput) -> Result<CreateUserResponse, AppError> {
        if !input.email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        if input.full_name.trim().is_empty() {
            return Err(AppError::BadRequest("Full name is required".to_string()));
        }
        if self.user_repository.email_exists(&input.email).await? {
            return Err(AppError::BadRequest("Email already exists".to_string()));
        }
        if let Some(department_id) = input.department_id {
            self.get_department(department_id).await?;
        }

        let (password, temporary_password) = match &input.password {
            Some(password) if password.len() < MIN_PASSWORD_LENGTH => {
                return Err(AppError::BadRequest(format!(
                    "Password must be at least {} characters",
                    MIN_PASSWORD_LENGTH
                )));
            }
            Some(password) => (password.clone(), None),
            None => {
                let generated = generate_temporary_password();
                (generated.clone(), Some(generated))
            }
        };

        let user = User::new(&input, hash_password(&password)?);
        let user = self
            .user_repository
            .create_user(&user)
            .await
            .map_err(|e| AppError::unique_violation(e, "Email already exists"))?;

        log::info!("Created user {} with role {}", user.id, user.role);

        Ok(CreateUserResponse {
            user: user.into(),
            temporary_password,
        })
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub async fn list_users(&self, department_id: Option<Uuid>) -> Result<Vec<User>, AppError> {
        Ok(self.user_repository.list_users(department_id).await?)
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<User, AppError> {
        if input.full_name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(AppError::BadRequest("Full name cannot be empty".to_string()));
        }

        self.user_repository
            .update_profile(id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub async fn assign_department(
        &self,
        user_id: Uuid,
        department_id: Option<Uuid>,
    ) -> Result<User, AppError> {
        if let Some(department_id) = department_id {
            self.get_department(department_id).await?;
        }

        let user = self
            .user_repository
            .update_department(user_id, department_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        log::info!("User {} assigned to department {:?}", user_id, department_id);

        Ok(user)
    }

    pub async fn create_department(&self, input: DepartmentInput) -> Result<Department, AppError> {
        if input.name.trim().is_empty() {
            return Err(AppError::BadRequest("Department name is required".to_string()));
        }
        if self.department_repository.name_exists(&input.name).await? {
            return Err(AppError::BadRequest(
                "Department name already exists".to_string(),
            ));
        }
        if let Some(manager_id) = input.manager_id {
            ensure_can_manage(&self.get_user(manager_id).await?)?;
        }

        let department = self
            .department_repository
            .create(&input)
            .await
            .map_err(|e| AppError::unique_violation(e, "Department name already exists"))?;
        Ok(department)
    }

    pub async fn get_department(&self, id: Uuid) -> Result<Department, AppError> {
        self.department_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Department {} not found", id)))
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        Ok(self.department_repository.list().await?)
    }

    pub async fn list_members(&self, department_id: Uuid) -> Result<Vec<User>, AppError> {
        self.get_department(department_id).await?;
        Ok(self.user_repository.list_users(Some(department_id)).await?)
    }

    pub async fn set_manager(
        &self,
        department_id: Uuid,
        manager_id: Option<Uuid>,
    ) -> Result<Department, AppError> {
        if let Some(manager_id) = manager_id {
            ensure_can_manage(&self.get_user(manager_id).await?)?;
        }

        self.department_repository
            .set_manager(department_id, manager_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Department {} not found", department_id)))
    }

    /// Default processor for requests raised by `employee`.
    pub async fn department_manager_of(&self, employee: &User) -> Result<Option<User>, AppError> {
        let Some(department_id) = employee.department_id else {
            return Ok(None);
        };

        let department = self.department_repository.find_by_id(department_id).await?;
        match department.and_then(|d| d.manager_id) {
            Some(manager_id) => Ok(self.user_repository.find_by_id(manager_id).await?),
            None => Ok(None),
        }
    }
}

fn ensure_can_manage(manager: &User) -> Result<(), AppError> {
    if manager.role.can_process_requests() {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "Department manager must be a manager, HR or administrator".to_string(),
        ))
    }
}
