#![allow(dead_code, unused_macros)]

use actix_web::web;
use anyhow::Result;
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use hrms::config::Config;
use hrms::database::init_database;
use hrms::database::models::*;
use hrms::services::NotificationDispatcher;
use hrms::AppState;

pub const TEST_PASSWORD: &str = "password123";

/// Build the full application around a `TestContext`.
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.state.clone())
                .app_data($ctx.config_data())
                .wrap(hrms::middleware::RequestIdMiddleware)
                .configure(hrms::routes::configure_extractors(
                    $ctx.config.max_upload_bytes,
                ))
                .configure(hrms::routes::configure),
        )
        .await
    };
}

// Test database wrapper
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(&database_url).await?;

        Ok(TestDb {
            pool,
            _temp_dir: temp_dir,
        })
    }
}

pub struct TestContext {
    pub db: TestDb,
    pub config: Config,
    pub state: web::Data<AppState>,
    pub dispatcher: NotificationDispatcher,
    _uploads: TempDir,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        setup_test_env();

        let db = TestDb::new().await?;
        let uploads = TempDir::new()?;

        let mut config = Config::test_config();
        config.upload_dir = uploads.path().display().to_string();
        config.max_upload_bytes = 1024;

        let (state, dispatcher) = AppState::build(db.pool.clone(), &config);

        Ok(TestContext {
            db,
            config,
            state: web::Data::new(state),
            dispatcher,
            _uploads: uploads,
        })
    }

    pub fn config_data(&self) -> web::Data<Config> {
        web::Data::new(self.config.clone())
    }

    pub async fn create_user(&self, role: Role) -> Result<User> {
        self.create_user_in(role, None).await
    }

    pub async fn create_user_in(&self, role: Role, department_id: Option<Uuid>) -> Result<User> {
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();

        let response = self
            .state
            .profile_service
            .create_user(CreateUserInput {
                email: format!("{}.{}", Uuid::new_v4().simple(), email),
                full_name: name,
                password: Some(TEST_PASSWORD.to_string()),
                role,
                department_id,
                phone: None,
                position: None,
            })
            .await?;

        Ok(self.state.profile_service.get_user(response.user.id).await?)
    }

    pub async fn rename(&self, user: &User, full_name: &str) -> Result<User> {
        Ok(self
            .state
            .profile_service
            .update_profile(
                user.id,
                UpdateProfileInput {
                    full_name: Some(full_name.to_string()),
                    phone: None,
                    position: None,
                },
            )
            .await?)
    }

    /// Department managed by `manager`, with the manager as a member.
    pub async fn create_department(&self, manager: &User) -> Result<Department> {
        let department = self
            .state
            .profile_service
            .create_department(DepartmentInput {
                name: format!("Department {}", Uuid::new_v4().simple()),
                description: None,
                manager_id: Some(manager.id),
            })
            .await?;

        self.state
            .profile_service
            .assign_department(manager.id, Some(department.id))
            .await?;

        Ok(department)
    }

    /// Manager, department and one employee in it.
    pub async fn team(&self) -> Result<(User, User)> {
        let manager = self.create_user(Role::Manager).await?;
        let department = self.create_department(&manager).await?;
        let employee = self
            .create_user_in(Role::Employee, Some(department.id))
            .await?;
        Ok((manager, employee))
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state
            .auth_service
            .generate_token(user)
            .expect("token generation")
    }

    pub async fn drain_events(&mut self) -> usize {
        self.dispatcher.process_pending().await
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub fn leave_input(start: &str, end: &str) -> CreateRequestInput {
    CreateRequestInput {
        request_type: RequestType::Leave,
        start_date: start.parse().expect("valid date"),
        end_date: Some(end.parse().expect("valid date")),
        leave_period: None,
        requested_time: None,
        reason: Some("Family trip".to_string()),
        processor_id: None,
    }
}

pub fn attendance_input(kind: RequestType, date: &str, time: &str) -> CreateRequestInput {
    CreateRequestInput {
        request_type: kind,
        start_date: date.parse().expect("valid date"),
        end_date: None,
        leave_period: None,
        requested_time: Some(
            chrono::NaiveTime::parse_from_str(time, "%H:%M").expect("valid time"),
        ),
        reason: None,
        processor_id: None,
    }
}

pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}
